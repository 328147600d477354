//! The drawable node graph.
//!
//! Nodes live in flat arenas owned by [`Graph`] and refer to each other with
//! copyable ids. Containment (a group owning its inputs, merges, sub-groups
//! and output) is the only ownership; every other link is a plain id.

use crate::geom::Vec2;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeId(pub(crate) usize);

/// Something that produces a value: a bound variable, an application, or a
/// nested group's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Input(InputId),
    Merge(MergeId),
    Output(GroupId),
}

/// Something that consumes a value: an application slot or a group's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sink {
    Merge(MergeId),
    Output(GroupId),
}

pub const DEFAULT_GROUP_RADIUS: f64 = 25.0;
pub const DEFAULT_INPUT_RADIUS: f64 = 10.0;
pub const DEFAULT_MERGE_RADIUS: f64 = 10.0;
pub const DEFAULT_OUTPUT_RADIUS: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct Group {
    pub position: Vec2,
    pub radius: f64,
    /// `radius` plus the largest input radius.
    pub outer_radius: f64,
    pub parent: Option<GroupId>,
    pub inputs: Vec<InputId>,
    pub interior: Vec<MergeId>,
    pub groups: Vec<GroupId>,
    pub output: Output,
}

impl Group {
    fn new(parent: Option<GroupId>, position: Vec2) -> Self {
        Self {
            position,
            radius: DEFAULT_GROUP_RADIUS,
            outer_radius: DEFAULT_GROUP_RADIUS,
            parent,
            inputs: Vec::new(),
            interior: Vec::new(),
            groups: Vec::new(),
            output: Output::new(position, DEFAULT_GROUP_RADIUS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Output {
    pub position: Vec2,
    pub radius: f64,
    pub downstream: Option<Sink>,
    pub producer: Option<Port>,
}

impl Output {
    fn new(center: Vec2, group_radius: f64) -> Self {
        Self {
            position: center + Vec2::new(0.0, group_radius),
            radius: DEFAULT_OUTPUT_RADIUS,
            downstream: None,
            producer: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Input {
    pub identifier: char,
    pub angle: f64,
    pub radius: f64,
    pub position: Vec2,
    /// Sub-expression substituted for this variable.
    pub group: Option<GroupId>,
    /// Consumers of this variable, one entry per referencing slot.
    pub usages: Vec<Sink>,
}

#[derive(Debug, Clone)]
pub struct Merge {
    pub function: Option<Port>,
    pub argument: Option<Port>,
    pub output: Option<Sink>,
    pub position: Vec2,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct Graph {
    groups: Vec<Group>,
    inputs: Vec<Input>,
    merges: Vec<Merge>,
    root: GroupId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            groups: vec![Group::new(None, Vec2::ZERO)],
            inputs: Vec::new(),
            merges: Vec::new(),
            root: GroupId(0),
        }
    }

    /// Discard every node and start again from a single empty root group.
    pub fn clean(&mut self) {
        *self = Self::new();
    }

    pub fn root(&self) -> GroupId {
        self.root
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id.0]
    }

    pub fn input(&self, id: InputId) -> &Input {
        &self.inputs[id.0]
    }

    pub fn input_mut(&mut self, id: InputId) -> &mut Input {
        &mut self.inputs[id.0]
    }

    pub fn merge(&self, id: MergeId) -> &Merge {
        &self.merges[id.0]
    }

    pub fn merge_mut(&mut self, id: MergeId) -> &mut Merge {
        &mut self.merges[id.0]
    }

    /// Create a detached group whose scope lookups continue in `parent`.
    pub fn add_group(&mut self, parent: Option<GroupId>) -> GroupId {
        let position = parent.map_or(Vec2::ZERO, |p| self.group(p).position);
        let id = GroupId(self.groups.len());
        self.groups.push(Group::new(parent, position));
        id
    }

    /// Create a group nested inside `parent`'s interior.
    pub fn add_subgroup(&mut self, parent: GroupId) -> GroupId {
        // Spread siblings on a golden-angle spiral so no two start coincident.
        let index = self.group(parent).groups.len() as f64;
        let offset = Vec2::from_polar(1.0 + index, index * 2.399_963, Vec2::ZERO);
        let id = self.add_group(Some(parent));
        self.translate_group(id, offset);
        self.group_mut(parent).groups.push(id);
        id
    }

    pub fn add_input(&mut self, group: GroupId, identifier: char) -> InputId {
        let id = InputId(self.inputs.len());
        let position = self.group(group).position;
        self.inputs.push(Input {
            identifier,
            angle: 3.0 * PI / 2.0,
            radius: DEFAULT_INPUT_RADIUS,
            position,
            group: None,
            usages: Vec::new(),
        });
        self.group_mut(group).inputs.push(id);
        self.spread_inputs(group);
        id
    }

    /// Evenly space a group's inputs across the upper half of its boundary.
    fn spread_inputs(&mut self, group: GroupId) {
        let ids = self.group(group).inputs.clone();
        let step = PI / (ids.len() + 1) as f64;
        for (i, id) in ids.into_iter().enumerate() {
            self.input_mut(id).angle = PI + step * (i + 1) as f64;
        }
    }

    /// Hang `group` off `input` as its substituted sub-expression.
    pub fn attach_group(&mut self, input: InputId, group: GroupId) {
        let outer = self.group(group).outer_radius;
        let inp = self.input_mut(input);
        inp.group = Some(group);
        inp.radius = outer + DEFAULT_INPUT_RADIUS;
    }

    /// Create an application of `function` to `argument` inside `group`.
    pub fn add_merge(
        &mut self,
        group: GroupId,
        function: Option<Port>,
        argument: Option<Port>,
    ) -> MergeId {
        let id = MergeId(self.merges.len());
        self.merges.push(Merge {
            function,
            argument,
            output: None,
            position: self.group(group).position,
            radius: DEFAULT_MERGE_RADIUS,
        });
        for source in [function, argument].into_iter().flatten() {
            self.connect(source, Sink::Merge(id));
        }
        self.group_mut(group).interior.push(id);
        id
    }

    /// Make `source` the value leaving `group` through its output.
    pub fn feed_output(&mut self, group: GroupId, source: Option<Port>) {
        self.group_mut(group).output.producer = source;
        if let Some(source) = source {
            self.connect(source, Sink::Output(group));
        }
    }

    /// Register `sink` as a consumer of `source`.
    pub fn connect(&mut self, source: Port, sink: Sink) {
        match source {
            Port::Input(id) => self.input_mut(id).usages.push(sink),
            Port::Merge(id) => self.merge_mut(id).output = Some(sink),
            Port::Output(id) => self.group_mut(id).output.downstream = Some(sink),
        }
    }

    /// Resolve a variable by searching `group` and then its ancestors.
    ///
    /// The right-most binder wins inside one group, so `\xx.x` refers to the
    /// second `x`. Returns `None` for a free variable.
    pub fn get_input(&self, group: GroupId, identifier: char) -> Option<InputId> {
        let mut scope = Some(group);
        while let Some(id) = scope {
            let g = self.group(id);
            if let Some(&found) = g
                .inputs
                .iter()
                .rev()
                .find(|&&i| self.input(i).identifier == identifier)
            {
                return Some(found);
            }
            scope = g.parent;
        }
        None
    }

    /// Move a group and everything it contains by `delta`.
    pub fn translate_group(&mut self, id: GroupId, delta: Vec2) {
        let group = self.group_mut(id);
        group.position = group.position + delta;
        group.output.position = group.output.position + delta;

        let inputs = group.inputs.clone();
        let interior = group.interior.clone();
        let subgroups = group.groups.clone();

        for m in interior {
            let merge = self.merge_mut(m);
            merge.position = merge.position + delta;
        }
        for i in inputs {
            let target = self.input(i).position + delta;
            self.set_input_position(i, target);
        }
        for g in subgroups {
            self.translate_group(g, delta);
        }
    }

    /// Place an input anchor, dragging its substituted group along.
    pub fn set_input_position(&mut self, id: InputId, position: Vec2) {
        let input = self.input_mut(id);
        let delta = position - input.position;
        input.position = position;
        if let Some(group) = input.group {
            self.translate_group(group, delta);
        }
    }

    pub fn port_position(&self, port: Port) -> Vec2 {
        match port {
            Port::Input(id) => self.input(id).position,
            Port::Merge(id) => self.merge(id).position,
            Port::Output(id) => self.group(id).output.position,
        }
    }

    pub fn port_radius(&self, port: Port) -> f64 {
        match port {
            Port::Input(id) => self.input(id).radius,
            Port::Merge(id) => self.merge(id).radius,
            Port::Output(id) => self.group(id).output.radius,
        }
    }

    pub fn sink_position(&self, sink: Sink) -> Vec2 {
        match sink {
            Sink::Merge(id) => self.merge(id).position,
            Sink::Output(id) => self.group(id).output.position,
        }
    }

    pub fn sink_radius(&self, sink: Sink) -> f64 {
        match sink {
            Sink::Merge(id) => self.merge(id).radius,
            Sink::Output(id) => self.group(id).output.radius,
        }
    }

    /// Splice out every nested group that binds no variables.
    ///
    /// Children are handled before their parent looks at them, so chains of
    /// redundant parentheses collapse completely. The spliced group's
    /// merges and surviving sub-groups move up into the parent and its output
    /// link is replaced by a direct link from its producer to its consumer.
    pub fn remove_empty_subgroups(&mut self) {
        self.remove_empty_below(self.root);
    }

    fn remove_empty_below(&mut self, id: GroupId) {
        let hosted: Vec<GroupId> = self
            .group(id)
            .inputs
            .iter()
            .filter_map(|&i| self.input(i).group)
            .collect();
        for g in hosted {
            self.remove_empty_below(g);
        }

        let subgroups = self.group(id).groups.clone();
        let mut kept = Vec::with_capacity(subgroups.len());
        for sub in subgroups {
            self.remove_empty_below(sub);
            if self.group(sub).inputs.is_empty() {
                kept.extend(self.splice(sub, id));
            } else {
                kept.push(sub);
            }
        }
        self.group_mut(id).groups = kept;
    }

    /// Dissolve `sub` into `parent`, returning the sub-groups it handed over.
    fn splice(&mut self, sub: GroupId, parent: GroupId) -> Vec<GroupId> {
        let producer = self.group(sub).output.producer;
        let downstream = self.group(sub).output.downstream;

        if let Some(p) = producer {
            self.redirect_consumer(p, Sink::Output(sub), downstream);
        }
        if let Some(d) = downstream {
            self.replace_source(d, Port::Output(sub), producer);
        }

        let group = self.group_mut(sub);
        group.output.producer = None;
        group.output.downstream = None;
        let interior = std::mem::take(&mut group.interior);
        let orphans = std::mem::take(&mut group.groups);

        for &g in &orphans {
            self.group_mut(g).parent = Some(parent);
        }
        self.group_mut(parent).interior.extend(interior);

        log::debug!(
            "spliced empty group {:?} into {:?} ({} sub-groups hoisted)",
            sub,
            parent,
            orphans.len()
        );
        orphans
    }

    /// Point `source`'s consumer link at `new` wherever it pointed at `old`.
    fn redirect_consumer(&mut self, source: Port, old: Sink, new: Option<Sink>) {
        match source {
            Port::Input(id) => {
                let usages = &mut self.input_mut(id).usages;
                match new {
                    Some(new) => usages
                        .iter_mut()
                        .filter(|u| **u == old)
                        .for_each(|u| *u = new),
                    None => usages.retain(|u| *u != old),
                }
            }
            Port::Merge(id) => {
                let merge = self.merge_mut(id);
                if merge.output == Some(old) {
                    merge.output = new;
                }
            }
            Port::Output(id) => {
                let output = &mut self.group_mut(id).output;
                if output.downstream == Some(old) {
                    output.downstream = new;
                }
            }
        }
    }

    /// Point `sink`'s input slots at `new` wherever they held `old`.
    fn replace_source(&mut self, sink: Sink, old: Port, new: Option<Port>) {
        match sink {
            Sink::Merge(id) => {
                let merge = self.merge_mut(id);
                if merge.function == Some(old) {
                    merge.function = new;
                }
                if merge.argument == Some(old) {
                    merge.argument = new;
                }
            }
            Sink::Output(id) => {
                let output = &mut self.group_mut(id).output;
                if output.producer == Some(old) {
                    output.producer = new;
                }
            }
        }
    }

    /// Every group reachable from the root, parents before children.
    pub fn live_groups(&self) -> Vec<GroupId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let g = self.group(id);
            stack.extend(g.inputs.iter().filter_map(|&i| self.input(i).group));
            stack.extend(g.groups.iter().copied());
        }
        out
    }

    /// Every merge reachable from the root.
    pub fn live_merges(&self) -> Vec<MergeId> {
        self.live_groups()
            .into_iter()
            .flat_map(|g| self.group(g).interior.clone())
            .collect()
    }
}
