pub mod ast;
pub mod builder;
pub mod drawing;
pub mod geom;
pub mod graph;
pub mod layout;
pub mod lexer;
pub mod measure;
pub mod parser;
pub mod render;
pub mod serializer;
pub mod svg;

use wasm_bindgen::prelude::*;

use drawing::Drawing;
use layout::LayoutEngine;
use svg::SvgSurface;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Lay out a lambda term for `ticks` steps and render it to SVG.
#[wasm_bindgen(js_name = "lambdaToSvg")]
pub fn render_lambda(source: &str, ticks: Option<u32>) -> Result<String, String> {
    let mut drawing = Drawing::from_text(source).map_err(|e| e.to_string())?;
    let engine = LayoutEngine::default();
    for _ in 0..ticks.unwrap_or(300) {
        drawing.tick(&engine);
    }
    Ok(SvgSurface::render(drawing.graph()))
}

/// A live drawing driven from JavaScript: feed it text edits and call
/// `tick` once per animation frame.
#[wasm_bindgen]
pub struct LambdaCanvas {
    drawing: Drawing,
    engine: LayoutEngine,
}

#[wasm_bindgen]
impl LambdaCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> LambdaCanvas {
        LambdaCanvas {
            drawing: Drawing::new(),
            engine: LayoutEngine::default(),
        }
    }

    /// Reparse. Returns the error message, or `None` when the text built.
    #[wasm_bindgen(js_name = "setText")]
    pub fn set_text(&mut self, text: &str) -> Option<String> {
        self.drawing.set_text(text).err().map(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "isInvalid")]
    pub fn is_invalid(&self) -> bool {
        self.drawing.is_invalid()
    }

    pub fn tick(&mut self) {
        self.drawing.tick(&self.engine);
    }

    #[wasm_bindgen(js_name = "toSvg")]
    pub fn to_svg(&self) -> String {
        SvgSurface::render(self.drawing.graph())
    }
}

impl Default for LambdaCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lambda() {
        let svg = render_lambda(r"(\x.(x x))", Some(10)).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_lambda_reports_errors() {
        let err = render_lambda("", None).unwrap_err();
        assert!(err.contains("Empty input"));
    }

    #[test]
    fn test_canvas_keeps_last_good_drawing() {
        let mut canvas = LambdaCanvas::new();
        assert!(canvas.set_text(r"(\x.x)").is_none());
        canvas.tick();
        let good = canvas.to_svg();
        assert!(canvas.set_text(r"(\x.").is_some());
        assert!(canvas.is_invalid());
        assert_eq!(canvas.to_svg(), good);
    }
}
