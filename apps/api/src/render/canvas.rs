//! Drawing capability used by the document builder.
//!
//! [`Surface`] is the backend seam: raw primitives in top-down page
//! coordinates. [`Canvas`] wraps a surface with the page geometry, font
//! metrics and the page decoration, and owns the page-added hook: the only
//! way to start a page is [`Canvas::add_page`], which paints the background
//! and the optional watermark before anything else can be drawn on it.

use crate::layout::{FontFace, FontMetrics, PageConfig};
use crate::render::theme::{self, Color};

/// A rectangle in top-down page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(face: FontFace, size: f32, color: Color) -> Self {
        Self { face, size, color }
    }
}

/// Raw drawing backend. All `y` values grow downwards from the page top.
pub trait Surface {
    fn begin_page(&mut self, width: f32, height: f32);
    fn page_count(&self) -> usize;
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32);
    /// Draws one line of text whose line box starts at `y`.
    fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle);
    /// Draws translucent text starting at baseline `origin`, rotated counter-clockwise.
    fn rotated_text(&mut self, origin: (f32, f32), angle_deg: f32, text: &str, style: TextStyle, opacity: f32);
    fn finish(self) -> Vec<u8>;
}

/// What every page receives before any content is drawn on it.
#[derive(Debug, Clone)]
pub struct PageDecoration {
    pub background: Color,
    pub watermark: Option<String>,
}

pub struct Canvas<S: Surface> {
    surface: S,
    page: PageConfig,
    metrics: FontMetrics,
    decoration: PageDecoration,
}

impl<S: Surface> Canvas<S> {
    pub fn new(surface: S, page: PageConfig, metrics: FontMetrics, decoration: PageDecoration) -> Self {
        Self {
            surface,
            page,
            metrics,
            decoration,
        }
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    pub fn page_count(&self) -> usize {
        self.surface.page_count()
    }

    /// Starts a new page and runs the page-added hook on it.
    pub fn add_page(&mut self) {
        self.surface.begin_page(self.page.width, self.page.height);
        let full = Rect::new(0.0, 0.0, self.page.width, self.page.height);
        self.surface.fill_rect(full, self.decoration.background);

        if let Some(text) = &self.decoration.watermark {
            let style = TextStyle::new(FontFace::Bold, theme::WATERMARK_SIZE, theme::PRIMARY);
            let width = self.measure(text, style);
            let angle = theme::WATERMARK_ANGLE_DEG.to_radians();
            let (cx, cy) = (self.page.width / 2.0, self.page.height / 2.0);
            // Center the baseline on the page, direction (cos, -sin) in top-down space.
            let origin = (cx - width / 2.0 * angle.cos(), cy + width / 2.0 * angle.sin());
            self.surface.rotated_text(
                origin,
                theme::WATERMARK_ANGLE_DEG,
                text,
                style,
                theme::WATERMARK_OPACITY,
            );
        }
    }

    /// Filled box with a border, the card primitive of the theme.
    pub fn bordered_box(&mut self, rect: Rect, fill: Color, border: Color) {
        self.surface.fill_rect(rect, fill);
        self.surface.stroke_rect(rect, border, 1.0);
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.surface.stroke_rect(rect, color, 1.0);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.surface.fill_rounded_rect(rect, radius, color);
    }

    pub fn hline(&mut self, x: f32, y: f32, width: f32, color: Color, line_width: f32) {
        self.surface.line((x, y), (x + width, y), color, line_width);
    }

    pub fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        if !text.is_empty() {
            self.surface.text(x, y, text, style);
        }
    }

    /// Draws `text` horizontally centered on the page.
    pub fn centered_text(&mut self, y: f32, text: &str, style: TextStyle) {
        let x = ((self.page.width - self.measure(text, style)) / 2.0).max(self.page.margin_left);
        self.text(x, y, text, style);
    }

    pub fn measure(&self, text: &str, style: TextStyle) -> f32 {
        self.metrics.table(style.face).measure_str(text, style.size)
    }

    /// Fits `text` on one line of `width` points, cutting it with `...` when it is too wide.
    pub fn ellipsize(&self, text: &str, style: TextStyle, width: f32) -> String {
        if self.measure(text, style) <= width {
            text.to_string()
        } else {
            self.cut_with_ellipsis(text, style, width)
        }
    }

    /// Longest prefix of `text` that fits `width` points together with a trailing `...`.
    pub fn cut_with_ellipsis(&self, text: &str, style: TextStyle, width: f32) -> String {
        let budget = width - self.measure("...", style);
        let mut kept = String::new();
        let mut used = 0.0;
        for c in text.chars() {
            let mut buf = [0u8; 4];
            let advance = self.measure(c.encode_utf8(&mut buf), style);
            if used + advance > budget {
                break;
            }
            used += advance;
            kept.push(c);
        }
        format!("{}...", kept.trim_end())
    }

    pub fn wrap(&self, text: &str, style: TextStyle, width: f32) -> Vec<String> {
        self.metrics.table(style.face).wrap_lines(text, style.size, width)
    }

    pub fn text_height(&self, text: &str, style: TextStyle, width: f32, line_height: f32) -> f32 {
        self.metrics
            .table(style.face)
            .text_height(text, style.size, width, line_height)
    }

    #[cfg(test)]
    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn finish(self) -> Vec<u8> {
        self.surface.finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recording surface (tests)
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::recording::{Op, RecordingSurface};
    use super::*;
    use crate::layout::default_page_config;

    fn canvas(watermark: Option<&str>) -> Canvas<RecordingSurface> {
        Canvas::new(
            RecordingSurface::default(),
            default_page_config(),
            FontMetrics::builtin(),
            PageDecoration {
                background: theme::BACKGROUND,
                watermark: watermark.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_add_page_paints_background_first() {
        let mut canvas = canvas(None);
        canvas.add_page();
        canvas.text(50.0, 50.0, "hello", theme::BODY);
        let surface = canvas.into_surface();
        assert_eq!(surface.pages.len(), 1);
        match &surface.pages[0][0] {
            Op::FillRect(rect) => {
                assert_eq!(rect.y, 0.0);
                assert!((rect.height - 841.89).abs() < 0.01);
            }
            other => panic!("expected background fill, got {other:?}"),
        }
        assert!(!surface.pages[0].iter().any(|op| matches!(op, Op::Watermark { .. })));
    }

    #[test]
    fn test_watermark_on_every_page_before_content() {
        let mut canvas = canvas(Some("FREE"));
        for _ in 0..3 {
            canvas.add_page();
            canvas.text(50.0, 60.0, "content", theme::BODY);
        }
        let surface = canvas.into_surface();
        for page in &surface.pages {
            assert!(matches!(page[0], Op::FillRect(_)));
            assert!(matches!(&page[1], Op::Watermark { text, opacity } if text == "FREE" && *opacity < 1.0));
        }
    }

    #[test]
    fn test_ellipsize_fits_width() {
        let canvas = canvas(None);
        assert_eq!(canvas.ellipsize("Oats", theme::BODY, 200.0), "Oats");

        let long = "cinnamon ".repeat(40);
        let cut = canvas.ellipsize(&long, theme::BODY, 200.0);
        assert!(cut.ends_with("..."));
        assert!(canvas.measure(&cut, theme::BODY) <= 200.0);
        assert!(cut.starts_with("cinnamon cinnamon"));
    }

    #[test]
    fn test_cut_with_ellipsis_always_marks_the_cut() {
        let canvas = canvas(None);
        assert_eq!(canvas.cut_with_ellipsis("a", theme::BODY, 200.0), "a...");
        assert_eq!(canvas.cut_with_ellipsis("trail mix ", theme::BODY, 200.0), "trail mix...");
    }

    #[test]
    fn test_empty_text_is_not_drawn() {
        let mut canvas = canvas(None);
        canvas.add_page();
        canvas.text(50.0, 50.0, "", theme::BODY);
        assert!(canvas.into_surface().texts(0).is_empty());
    }
}
