//! Easing of merge nodes toward their target position.

use crate::geom::{Line, Vec2};
use crate::graph::{Graph, GroupId, MergeId};

use super::LayoutEngine;

impl LayoutEngine {
    pub(super) fn update_merge(&self, graph: &mut Graph, group: GroupId, id: MergeId) {
        let Some(target) = self.merge_target(graph, group, id) else {
            return;
        };
        if !target.is_finite() {
            return;
        }
        let merge = graph.merge_mut(id);
        merge.position = merge.position.lerp(target, self.ease);
    }

    /// Where a merge wants to be: on the segment from its function to its
    /// consumer, as close as possible to its argument.
    ///
    /// A merge without an argument sits halfway between function and
    /// consumer. A merge without a function treats its argument as the
    /// function. With neither it has no target.
    pub(crate) fn merge_target(&self, graph: &Graph, group: GroupId, id: MergeId) -> Option<Vec2> {
        let merge = graph.merge(id);
        let (start, argument) = match (merge.function, merge.argument) {
            (Some(f), arg) => (f, arg),
            (None, Some(arg)) => (arg, None),
            (None, None) => return None,
        };
        let end = merge.output?;

        let start_pos = graph.port_position(start);
        let end_pos = graph.sink_position(end);

        let Some(argument) = argument else {
            return Some(start_pos.lerp(end_pos, 0.5));
        };

        let dir = Line::new(start_pos, end_pos).direction();
        let start_limit = start_pos + dir * (graph.port_radius(start) + merge.radius);
        let end_limit = end_pos - dir * (graph.sink_radius(end) + merge.radius);
        let center = Line::new(start_limit, end_limit).nearest_point(graph.port_position(argument));

        if !self.disambiguate {
            return Some(center);
        }
        Some(self.disambiguate_target(graph, group, id, center, dir.perp()))
    }

    /// Nudge `center` sideways if that puts it further from the other merges
    /// of the same group. Ties keep `center`.
    fn disambiguate_target(
        &self,
        graph: &Graph,
        group: GroupId,
        id: MergeId,
        center: Vec2,
        side: Vec2,
    ) -> Vec2 {
        let spread = |at: Vec2| -> f64 {
            graph
                .group(group)
                .interior
                .iter()
                .filter(|&&m| m != id)
                .map(|&m| at.dist_sq(graph.merge(m).position))
                .sum()
        };

        let mut best = center;
        let mut best_score = spread(center);
        for candidate in [center + side * self.nudge, center - side * self.nudge] {
            let score = spread(candidate);
            if score > best_score {
                best = candidate;
                best_score = score;
            }
        }
        best
    }
}
