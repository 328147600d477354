use crate::geom::{Quadratic, Vec2};
use crate::graph::Graph;
use crate::measure::TextMetrics;
use crate::render::{Role, Surface};
use std::fmt::Write;

const STYLE: &str = r#"<style>
  .group { fill: none; stroke: #000; stroke-width: 1; }
  .input { fill: #fff; stroke: #000; stroke-width: 1; }
  .input-label { font-family: monospace; font-size: 12px; fill: #000; }
  .merge { fill: none; stroke: #000; stroke-width: 1.5; }
  .merge-dot { fill: #000; }
  .output { fill: #000; stroke: #f00; stroke-width: 1.5; }
</style>"#;

/// Collects primitives into a standalone SVG document.
pub struct SvgSurface {
    metrics: TextMetrics,
    padding: f64,
    body: String,
    min: Vec2,
    max: Vec2,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
            padding: 20.0,
            body: String::new(),
            min: Vec2::new(f64::INFINITY, f64::INFINITY),
            max: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }
}

impl SvgSurface {
    /// Render a whole graph in one go.
    pub fn render(graph: &Graph) -> String {
        let mut surface = Self::default();
        graph.display(&mut surface);
        surface.finish()
    }

    fn include(&mut self, p: Vec2, extent: f64) {
        if !p.is_finite() {
            return;
        }
        self.min = Vec2::new(self.min.x.min(p.x - extent), self.min.y.min(p.y - extent));
        self.max = Vec2::new(self.max.x.max(p.x + extent), self.max.y.max(p.y + extent));
    }

    pub fn finish(self) -> String {
        let (min, max) = if self.min.x <= self.max.x {
            (self.min, self.max)
        } else {
            (Vec2::ZERO, Vec2::ZERO)
        };
        let x = min.x - self.padding;
        let y = min.y - self.padding;
        let w = max.x - min.x + self.padding * 2.0;
        let h = max.y - min.y + self.padding * 2.0;

        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.1}" height="{:.1}" viewBox="{:.1} {:.1} {:.1} {:.1}">"#,
            w, h, x, y, w, h
        )
        .unwrap();
        writeln!(svg, "{}", STYLE).unwrap();
        svg.push_str(&self.body);
        writeln!(svg, "</svg>").unwrap();
        svg
    }
}

impl Surface for SvgSurface {
    fn stroke_circle(&mut self, center: Vec2, radius: f64, role: Role) {
        self.include(center, radius);
        let class = role.class_name();
        writeln!(
            self.body,
            r#"<circle class="{class}" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" />"#,
            center.x,
            center.y,
            radius.max(0.0)
        )
        .unwrap();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, role: Role) {
        self.include(center, radius);
        let class = match role {
            Role::Merge => "merge-dot",
            other => other.class_name(),
        };
        writeln!(
            self.body,
            r#"<circle class="{class}" cx="{:.2}" cy="{:.2}" r="{:.2}" stroke="none" />"#,
            center.x,
            center.y,
            radius.max(0.0)
        )
        .unwrap();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, role: Role) {
        self.include(from, 0.0);
        self.include(to, 0.0);
        writeln!(
            self.body,
            r#"<line class="{}" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" />"#,
            role.class_name(),
            from.x,
            from.y,
            to.x,
            to.y
        )
        .unwrap();
    }

    fn stroke_quadratic(&mut self, curve: Quadratic, role: Role) {
        self.include(curve.from, 0.0);
        self.include(curve.point_at(0.5), 0.0);
        self.include(curve.to, 0.0);
        writeln!(
            self.body,
            r#"<path class="{}" d="M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}" />"#,
            role.class_name(),
            curve.from.x,
            curve.from.y,
            curve.control.x,
            curve.control.y,
            curve.to.x,
            curve.to.y
        )
        .unwrap();
    }

    fn label(&mut self, at: Vec2, text: &str, role: Role) {
        let origin = self.metrics.label_origin(at, text);
        writeln!(
            self.body,
            r#"<text class="{}-label" x="{:.2}" y="{:.2}">{}</text>"#,
            role.class_name(),
            origin.x,
            origin.y,
            escape_xml(text)
        )
        .unwrap();
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
