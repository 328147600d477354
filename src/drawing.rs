//! Host-facing drawing instances and the per-frame driver.

use crate::builder::{InvalidTreeError, build};
use crate::graph::Graph;
use crate::layout::LayoutEngine;
use crate::parser::{SyntaxError, parse};
use crate::render::Surface;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawingError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Invalid tree: {0}")]
    InvalidTree(#[from] InvalidTreeError),
}

/// One displayed expression: its source text and the last graph that built.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    source: String,
    graph: Graph,
    invalid: bool,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Result<Self, DrawingError> {
        let mut drawing = Self::new();
        drawing.set_text(text)?;
        Ok(drawing)
    }

    /// Reparse and rebuild from `text`.
    ///
    /// On failure the previous graph and its layout are kept as they were and
    /// the drawing is flagged invalid until a later call succeeds.
    pub fn set_text(&mut self, text: &str) -> Result<(), DrawingError> {
        self.source = text.to_string();
        match Self::rebuild(text) {
            Ok(graph) => {
                self.graph = graph;
                self.invalid = false;
                Ok(())
            }
            Err(err) => {
                log::warn!("rejected {:?}: {}", text, err);
                self.invalid = true;
                Err(err)
            }
        }
    }

    fn rebuild(text: &str) -> Result<Graph, DrawingError> {
        let tree = parse(text)?;
        let mut graph = Graph::new();
        build(&mut graph, &tree)?;
        graph.remove_empty_subgroups();
        Ok(graph)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn tick(&mut self, engine: &LayoutEngine) {
        engine.update(&mut self.graph);
    }

    pub fn display(&self, surface: &mut dyn Surface) {
        self.graph.display(surface);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawingId(usize);

/// The set of live drawings, updated and displayed in insertion order.
#[derive(Debug, Default)]
pub struct Stage {
    engine: LayoutEngine,
    drawings: Vec<(DrawingId, Drawing)>,
    next_id: usize,
}

impl Stage {
    pub fn new(engine: LayoutEngine) -> Self {
        Self {
            engine,
            drawings: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, drawing: Drawing) -> DrawingId {
        let id = DrawingId(self.next_id);
        self.next_id += 1;
        self.drawings.push((id, drawing));
        id
    }

    pub fn remove(&mut self, id: DrawingId) -> Option<Drawing> {
        let idx = self.drawings.iter().position(|(d, _)| *d == id)?;
        Some(self.drawings.remove(idx).1)
    }

    pub fn get(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|(d, _)| *d == id).map(|(_, dr)| dr)
    }

    pub fn get_mut(&mut self, id: DrawingId) -> Option<&mut Drawing> {
        self.drawings
            .iter_mut()
            .find(|(d, _)| *d == id)
            .map(|(_, dr)| dr)
    }

    pub fn ids(&self) -> impl Iterator<Item = DrawingId> + '_ {
        self.drawings.iter().map(|(id, _)| *id)
    }

    /// Advance every drawing by one tick.
    pub fn tick(&mut self) {
        for (_, drawing) in &mut self.drawings {
            drawing.tick(&self.engine);
        }
    }

    /// One animation frame: tick everything, then hand each drawing to
    /// `present` for display.
    pub fn frame<F>(&mut self, mut present: F)
    where
        F: FnMut(DrawingId, &Drawing),
    {
        self.tick();
        for (id, drawing) in &self.drawings {
            present(*id, drawing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxErrorKind;
    use crate::svg::SvgSurface;

    #[test]
    fn test_set_text_builds_graph() {
        let drawing = Drawing::from_text(r"(\x.x)").unwrap();
        assert!(!drawing.is_invalid());
        assert_eq!(drawing.graph().group(drawing.graph().root()).inputs.len(), 1);
    }

    #[test]
    fn test_failed_parse_keeps_previous_graph() {
        let mut drawing = Drawing::from_text(r"(\xy.x y)").unwrap();
        let engine = LayoutEngine::default();
        for _ in 0..10 {
            drawing.tick(&engine);
        }
        let before = format!("{:?}", drawing.graph());

        let err = drawing.set_text(r"(\xy.x y").unwrap_err();
        assert!(matches!(
            err,
            DrawingError::Syntax(SyntaxError {
                kind: SyntaxErrorKind::MismatchedParentheses,
                ..
            })
        ));
        assert!(drawing.is_invalid());
        assert_eq!(format!("{:?}", drawing.graph()), before);
        assert_eq!(drawing.source(), r"(\xy.x y");

        drawing.set_text(r"(\z.z)").unwrap();
        assert!(!drawing.is_invalid());
    }

    #[test]
    fn test_childless_root_marks_invalid() {
        let mut drawing = Drawing::new();
        let err = drawing.set_text("x").unwrap_err();
        assert_eq!(err, DrawingError::InvalidTree(InvalidTreeError::ChildlessRoot('x')));
        assert!(drawing.is_invalid());
    }

    #[test]
    fn test_stage_frames_in_insertion_order() {
        let mut stage = Stage::default();
        let a = stage.add(Drawing::from_text(r"(\x.x)").unwrap());
        let b = stage.add(Drawing::from_text(r"(\fx.f x)").unwrap());

        let mut seen = Vec::new();
        stage.frame(|id, drawing| {
            let mut surface = SvgSurface::default();
            drawing.display(&mut surface);
            assert!(surface.finish().contains("<svg"));
            seen.push(id);
        });
        assert_eq!(seen, vec![a, b]);
    }

    #[test]
    fn test_stage_remove_and_edit_are_independent() {
        let mut stage = Stage::default();
        let a = stage.add(Drawing::from_text(r"(\x.x)").unwrap());
        let b = stage.add(Drawing::from_text(r"(\y.y)").unwrap());
        stage.tick();

        let before_b = format!("{:?}", stage.get(b).unwrap().graph());
        stage.get_mut(a).unwrap().set_text(r"(\pq.q p)").unwrap();
        assert_eq!(format!("{:?}", stage.get(b).unwrap().graph()), before_b);

        assert!(stage.remove(a).is_some());
        assert!(stage.remove(a).is_none());
        assert_eq!(stage.ids().collect::<Vec<_>>(), vec![b]);
    }
}
