//! Drawing a [`Graph`] onto a 2D surface.
//!
//! The traversal only reads the graph. Per group it draws, in order: the
//! boundary, the output anchor, nested sub-groups, interior merges, inputs.

use crate::geom::{Quadratic, Vec2};
use crate::graph::{Graph, GroupId, InputId, MergeId};

/// What a primitive belongs to, so a surface can style it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Group,
    Input,
    Merge,
    Output,
}

impl Role {
    pub fn class_name(self) -> &'static str {
        match self {
            Role::Group => "group",
            Role::Input => "input",
            Role::Merge => "merge",
            Role::Output => "output",
        }
    }
}

/// The primitive operations a renderer must provide.
pub trait Surface {
    fn stroke_circle(&mut self, center: Vec2, radius: f64, role: Role);
    fn fill_circle(&mut self, center: Vec2, radius: f64, role: Role);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, role: Role);
    fn stroke_quadratic(&mut self, curve: Quadratic, role: Role);
    fn label(&mut self, at: Vec2, text: &str, role: Role);
}

/// Half the gap between the two boundary strokes of a group.
const BOUNDARY_HALF_GAP: f64 = 1.5;

impl Graph {
    pub fn display(&self, surface: &mut dyn Surface) {
        self.display_group(self.root(), surface);
    }

    pub fn display_group(&self, id: GroupId, surface: &mut dyn Surface) {
        let group = self.group(id);
        surface.stroke_circle(group.position, group.radius + BOUNDARY_HALF_GAP, Role::Group);
        surface.stroke_circle(group.position, group.radius - BOUNDARY_HALF_GAP, Role::Group);

        self.display_output(id, surface);
        for &sub in &group.groups {
            self.display_group(sub, surface);
        }
        for &m in &group.interior {
            self.display_merge(m, surface);
        }
        for &i in &group.inputs {
            self.display_input(i, surface);
        }
    }

    pub fn display_output(&self, id: GroupId, surface: &mut dyn Surface) {
        let output = &self.group(id).output;
        if let Some(downstream) = output.downstream {
            surface.stroke_line(output.position, self.sink_position(downstream), Role::Output);
        }
        surface.fill_circle(output.position, output.radius, Role::Output);
    }

    /// Curves from the function into the merge and on to the consumer, bowed
    /// to one side so parallel applications stay distinguishable.
    pub fn display_merge(&self, id: MergeId, surface: &mut dyn Surface) {
        let merge = self.merge(id);
        let (Some(function), Some(output)) = (merge.function, merge.output) else {
            // Nothing to join; still mark where the application sits.
            surface.fill_circle(merge.position, merge.radius / 2.0, Role::Merge);
            return;
        };

        let from = self.port_position(function);
        let to = self.sink_position(output);
        let length = from.dist(to);
        let dir = (to - from).unit();
        let bow = dir.perp().lerp(dir, 0.5);

        surface.stroke_quadratic(
            Quadratic::new(from, from + bow * (length / 3.0), merge.position),
            Role::Merge,
        );
        surface.stroke_quadratic(
            Quadratic::new(merge.position, merge.position + dir * (length / 3.0), to),
            Role::Merge,
        );
        if let Some(argument) = merge.argument {
            surface.stroke_line(self.port_position(argument), merge.position, Role::Merge);
        }
    }

    pub fn display_input(&self, id: InputId, surface: &mut dyn Surface) {
        let input = self.input(id);
        surface.fill_circle(input.position, input.radius, Role::Input);
        surface.stroke_circle(input.position, input.radius, Role::Input);
        match input.group {
            Some(hosted) => self.display_group(hosted, surface),
            None => surface.label(input.position, &input.identifier.to_string(), Role::Input),
        }
    }
}
