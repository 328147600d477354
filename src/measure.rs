use crate::geom::Vec2;
use unicode_width::UnicodeWidthStr;

pub struct TextMetrics {
    pub char_width: f64,
    pub font_size: f64,
    /// Distance from the text's vertical center to its baseline.
    pub baseline_offset: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            font_size: 12.0,
            baseline_offset: 4.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Start point of `text` so that it renders centered on `center`.
    pub fn label_origin(&self, center: Vec2, text: &str) -> Vec2 {
        Vec2::new(
            center.x - self.text_width(text) / 2.0,
            center.y + self.baseline_offset,
        )
    }
}
