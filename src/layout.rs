//! Per-tick relaxation of a [`Graph`] toward a readable arrangement.
//!
//! Every call to [`LayoutEngine::update`] nudges radii, input angles and
//! merge positions a small fixed step. There is no convergence test: the
//! host keeps ticking and the drawing settles (or gently oscillates) on its
//! own.

mod groups;
mod inputs;
mod merges;

use crate::graph::{Graph, GroupId, InputId};

pub use groups::radius_by_separation;

/// Layout engine configuration.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    pub(crate) default_radius: f64,
    pub(crate) margin: f64,
    pub(crate) input_radius: f64,
    pub(crate) input_padding: f64,
    pub(crate) angle_step: f64,
    pub(crate) ease: f64,
    pub(crate) separation_ease: f64,
    pub(crate) nudge: f64,
    pub(crate) disambiguate: bool,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            default_radius: 25.0,
            margin: 10.0,
            input_radius: 10.0,
            input_padding: 10.0,
            angle_step: 0.01,
            ease: 0.2,
            separation_ease: 0.2,
            nudge: 1.0,
            disambiguate: true,
        }
    }
}

impl LayoutEngine {
    pub fn with_disambiguation(mut self, enabled: bool) -> Self {
        self.disambiguate = enabled;
        self
    }

    pub fn with_ease(mut self, ease: f64) -> Self {
        self.ease = ease.clamp(0.0, 1.0);
        self
    }

    pub fn with_angle_step(mut self, step: f64) -> Self {
        self.angle_step = step.abs();
        self
    }

    /// Advance the whole graph by one tick. Returns the root's outer radius.
    pub fn update(&self, graph: &mut Graph) -> f64 {
        let root = graph.root();
        self.update_group(graph, root)
    }

    /// Update one group after its inputs' groups and its sub-groups, so
    /// sizes propagate outward within a single tick.
    fn update_group(&self, graph: &mut Graph, id: GroupId) -> f64 {
        let inputs = graph.group(id).inputs.clone();
        let max_input_radius = inputs
            .iter()
            .map(|&i| self.update_input(graph, i))
            .fold(0.0, f64::max);

        for sub in graph.group(id).groups.clone() {
            self.update_group(graph, sub);
        }
        self.separate_subgroups(graph, id);

        let radius = self.group_radius(graph, id);
        let group = graph.group_mut(id);
        group.radius = radius;
        group.outer_radius = radius + max_input_radius;

        self.relax_inputs(graph, id);
        self.place_output(graph, id);

        for m in graph.group(id).interior.clone() {
            self.update_merge(graph, id, m);
        }

        graph.group(id).outer_radius
    }

    /// Size an input from the group it hosts. Returns the new radius.
    fn update_input(&self, graph: &mut Graph, id: InputId) -> f64 {
        let radius = match graph.input(id).group {
            Some(hosted) => self.update_group(graph, hosted) + self.input_padding,
            None => self.input_radius,
        };
        graph.input_mut(id).radius = radius;
        radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Token, chain};
    use crate::builder::build;
    use crate::geom::Vec2;
    use crate::parser::parse;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn laid_out(input: &str, ticks: usize) -> Graph {
        let tree = parse(input).unwrap();
        let mut graph = Graph::new();
        build(&mut graph, &tree).unwrap();
        graph.remove_empty_subgroups();
        let engine = LayoutEngine::default();
        for _ in 0..ticks {
            engine.update(&mut graph);
        }
        graph
    }

    fn assert_sane(graph: &Graph, engine: &LayoutEngine) {
        for g in graph.live_groups() {
            let group = graph.group(g);
            assert!(group.position.is_finite());
            assert!(group.output.position.is_finite());
            assert!(group.radius.is_finite());
            assert!(group.radius >= engine.default_radius);
            assert!(group.outer_radius >= group.radius);
            for &i in &group.inputs {
                let input = graph.input(i);
                assert!(input.position.is_finite());
                assert!((PI..=2.0 * PI).contains(&input.angle));
            }
        }
        for m in graph.live_merges() {
            assert!(graph.merge(m).position.is_finite());
        }
    }

    #[test]
    fn test_layout_zero_one_many_inputs() {
        let engine = LayoutEngine::default();
        for input in [r"(x y)", r"(\x.x)", r"(\abcdefg.a b c d e f g)"] {
            let graph = laid_out(input, 400);
            assert_sane(&graph, &engine);
        }
    }

    #[test]
    fn test_setters_keep_values_in_range() {
        let engine = LayoutEngine::default()
            .with_ease(1.5)
            .with_angle_step(-0.05)
            .with_disambiguation(false);
        assert_eq!(engine.ease, 1.0);
        assert_eq!(engine.angle_step, 0.05);
        assert!(!engine.disambiguate);

        let mut graph = laid_out(r"(\xy.y x)", 0);
        for _ in 0..50 {
            engine.update(&mut graph);
        }
        assert_sane(&graph, &engine);
    }

    #[test]
    fn test_small_group_keeps_default_radius() {
        let graph = laid_out(r"(\x.x)", 10);
        assert_eq!(graph.group(graph.root()).radius, 25.0);
    }

    #[test]
    fn test_many_inputs_grow_radius() {
        let graph = laid_out(r"(\abcde.a b c d e)", 1);
        let expected = radius_by_separation([20.0; 5].into_iter(), 10.0);
        assert!((graph.group(graph.root()).radius - expected).abs() < 1e-9);
        assert!(expected > 25.0);
    }

    #[test]
    fn test_output_sits_below_center() {
        let graph = laid_out(r"(\xy.y x)", 50);
        let root = graph.group(graph.root());
        assert_eq!(root.output.position, root.position + Vec2::new(0.0, root.radius));
    }

    #[test]
    fn test_inputs_sit_on_boundary() {
        let graph = laid_out(r"(\xy.y x)", 50);
        let root = graph.group(graph.root());
        for &i in &root.inputs {
            let d = graph.input(i).position.dist(root.position);
            assert!((d - root.radius).abs() < 1e-6);
        }
    }

    #[test]
    fn test_hosted_group_grows_its_input() {
        let graph = laid_out(r"(\x.x) (\abc.a b c)", 5);
        let root = graph.group(graph.root());
        let x = graph.input(root.inputs[0]);
        let hosted = graph.group(x.group.unwrap());
        assert_eq!(x.radius, hosted.outer_radius + 10.0);
        assert!(root.outer_radius >= root.radius + x.radius);
        assert!(hosted.position.dist(x.position) < 1e-6);
    }

    #[test]
    fn test_sibling_subgroups_separate() {
        let graph = laid_out(r"(\f.f (\a.a) (\b.b))", 600);
        let root = graph.group(graph.root());
        assert_eq!(root.groups.len(), 2);
        let a = graph.group(root.groups[0]);
        let b = graph.group(root.groups[1]);
        let gap = a.position.dist(b.position) - a.outer_radius - b.outer_radius;
        assert!(gap > 0.0, "sub-groups still overlap: gap {gap}");
        for sub in [a, b] {
            let reach = root.position.dist(sub.position) + sub.outer_radius;
            assert!(reach < root.radius + 1e-6);
        }
    }

    #[test]
    fn test_update_never_changes_topology() {
        let mut graph = laid_out(r"(\fx.f (f x))", 0);
        let groups = graph.live_groups();
        let merges = graph.live_merges();
        let engine = LayoutEngine::default();
        for _ in 0..100 {
            engine.update(&mut graph);
        }
        assert_eq!(graph.live_groups(), groups);
        assert_eq!(graph.live_merges(), merges);
    }

    #[test]
    fn test_update_is_deterministic() {
        let a = laid_out(r"(\fxy.f (x y) (\z.z f))", 120);
        let b = laid_out(r"(\fxy.f (x y) (\z.z f))", 120);
        for (ga, gb) in a.live_groups().into_iter().zip(b.live_groups()) {
            assert_eq!(a.group(ga).position, b.group(gb).position);
            assert_eq!(a.group(ga).radius, b.group(gb).radius);
        }
    }

    fn arb_expression() -> impl Strategy<Value = Token> {
        let letter = prop::sample::select(vec!['f', 'x', 'y', 'q']);
        let leaf = letter.clone().prop_map(Token::var);
        let term = leaf.prop_recursive(3, 24, 3, move |inner| {
            (
                prop::collection::vec(letter.clone(), 0..3),
                prop::collection::vec(inner, 1..4),
            )
                .prop_map(|(binders, body)| {
                    Token::group(binders, chain(body).expect("non-empty body"))
                })
        });
        (
            prop::collection::vec(prop::sample::select(vec!['f', 'x', 'y']), 0..4),
            prop::collection::vec(term, 1..4),
        )
            .prop_map(|(binders, body)| Token::group(binders, chain(body).expect("non-empty body")))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn layout_stays_finite(tree in arb_expression()) {
            let mut graph = Graph::new();
            build(&mut graph, &tree).expect("root has a body");
            graph.remove_empty_subgroups();
            let engine = LayoutEngine::default();
            for _ in 0..150 {
                let outer = engine.update(&mut graph);
                prop_assert!(outer.is_finite());
            }
            assert_sane(&graph, &engine);
        }
    }
}
