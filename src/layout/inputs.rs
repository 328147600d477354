//! Angular hill-climbing of a group's inputs.

use std::f64::consts::PI;

use crate::geom::Vec2;
use crate::graph::{Graph, GroupId, InputId};

use super::LayoutEngine;

impl LayoutEngine {
    /// Try each input one angle step either way and keep whichever of the
    /// three positions scores highest. Angles stay inside `[PI, 2PI]`, the
    /// upper half of the boundary.
    pub(super) fn relax_inputs(&self, graph: &mut Graph, id: GroupId) {
        let (center, radius) = {
            let group = graph.group(id);
            (group.position, group.radius)
        };
        let inputs = graph.group(id).inputs.clone();

        for (idx, &input) in inputs.iter().enumerate() {
            let angle = graph.input(input).angle;
            let smaller = angle - self.angle_step;
            let bigger = angle + self.angle_step;

            let score = |a: f64| {
                self.separation_score(graph, &inputs, idx, Vec2::from_polar(radius, a, center))
            };
            let (cur, small, big) = (score(angle), score(smaller), score(bigger));

            let next = if small > cur && angle > PI {
                smaller
            } else if big > cur && angle < 2.0 * PI {
                bigger
            } else {
                angle
            };
            let next = next.clamp(PI, 2.0 * PI);

            graph.input_mut(input).angle = next;
            graph.set_input_position(input, Vec2::from_polar(radius, next, center));
        }
    }

    /// Squared distance from `at` to every consumer of the input plus squared
    /// distance to every sibling input less that sibling's radius.
    fn separation_score(&self, graph: &Graph, siblings: &[InputId], own: usize, at: Vec2) -> f64 {
        let input = graph.input(siblings[own]);
        let usage: f64 = input
            .usages
            .iter()
            .map(|&u| at.dist_sq(graph.sink_position(u)))
            .sum();
        let spread: f64 = siblings
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != own)
            .map(|(_, &s)| {
                let other = graph.input(s);
                at.dist_sq(other.position) - other.radius
            })
            .sum();
        usage + spread
    }
}
