//! Group sizing and sub-group separation.

use std::f64::consts::FRAC_PI_2;

use crate::geom::{Circle, Vec2};
use crate::graph::{Graph, GroupId};

use super::LayoutEngine;

/// Radius at which the given input diameters fit in a quarter of the
/// circumference. Zero when there are no inputs.
pub fn radius_by_separation(diameters: impl Iterator<Item = f64>, margin: f64) -> f64 {
    let total: f64 = diameters.sum();
    if total <= 0.0 {
        return 0.0;
    }
    total / FRAC_PI_2 + margin
}

impl LayoutEngine {
    pub(super) fn group_radius(&self, graph: &Graph, id: GroupId) -> f64 {
        let group = graph.group(id);

        let by_separation = radius_by_separation(
            group.inputs.iter().map(|&i| 2.0 * graph.input(i).radius),
            self.margin,
        );

        let by_containment = if group.groups.is_empty() {
            0.0
        } else {
            group
                .groups
                .iter()
                .map(|&g| {
                    let sub = graph.group(g);
                    group.position.dist(sub.position) + sub.outer_radius
                })
                .fold(0.0, f64::max)
                + self.margin
        };

        let radius = self.default_radius.max(by_separation).max(by_containment);
        if radius.is_finite() {
            radius
        } else {
            self.default_radius
        }
    }

    /// Push overlapping sibling sub-groups apart along their center line.
    pub(super) fn separate_subgroups(&self, graph: &mut Graph, id: GroupId) {
        let subgroups = graph.group(id).groups.clone();
        for (i, &a) in subgroups.iter().enumerate() {
            for (j, &b) in subgroups.iter().enumerate().skip(i + 1) {
                let ca = Circle::new(graph.group(a).position, graph.group(a).outer_radius);
                let cb = Circle::new(graph.group(b).position, graph.group(b).outer_radius);
                let wanted = Circle::new(ca.center, ca.radius + self.margin);
                if !wanted.overlaps(&cb) {
                    continue;
                }

                let mut dir = (cb.center - ca.center).unit();
                if dir == Vec2::ZERO {
                    dir = Vec2::from_polar(1.0, (i + j) as f64, Vec2::ZERO);
                }
                let overlap = wanted.radius + cb.radius - ca.center.dist(cb.center);
                let push = overlap * 0.5 * self.separation_ease;

                graph.translate_group(a, -dir * push);
                graph.translate_group(b, dir * push);
            }
        }
    }

    pub(super) fn place_output(&self, graph: &mut Graph, id: GroupId) {
        let group = graph.group_mut(id);
        group.output.position = group.position + Vec2::new(0.0, group.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_inputs_needs_no_radius() {
        assert_eq!(radius_by_separation(std::iter::empty(), 10.0), 0.0);
    }

    #[test]
    fn test_radius_by_separation() {
        let r = radius_by_separation([20.0, 20.0].into_iter(), 10.0);
        assert!((r - (40.0 / FRAC_PI_2 + 10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_containment_covers_subgroups() {
        let mut graph = Graph::new();
        let root = graph.root();
        let sub = graph.add_subgroup(root);
        graph.translate_group(sub, Vec2::new(40.0, 0.0));
        graph.group_mut(sub).outer_radius = 30.0;

        let engine = LayoutEngine::default();
        let r = engine.group_radius(&graph, root);
        let offset = graph.group(sub).position.dist(graph.group(root).position);
        assert!((r - (offset + 30.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_subgroups_are_pushed_apart() {
        let mut graph = Graph::new();
        let root = graph.root();
        let a = graph.add_subgroup(root);
        let b = graph.add_subgroup(root);
        let pa = graph.group(a).position;
        graph.group_mut(b).position = pa;
        assert_eq!(graph.group(a).position, graph.group(b).position);

        LayoutEngine::default().separate_subgroups(&mut graph, root);

        let d = graph.group(a).position.dist(graph.group(b).position);
        assert!(d > 0.0 && d.is_finite());
    }
}
