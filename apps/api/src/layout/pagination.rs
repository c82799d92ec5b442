//! Page geometry and the would-it-fit check that drives manual pagination.
//!
//! The document is laid out top-down with a running cursor `y` (points from
//! the top edge). Before a block is drawn the caller asks whether
//! `required` points still fit above the bottom margin, keeping a small
//! buffer; if not, a new page is started and the cursor returns to the top
//! margin. Height estimates are approximate by construction (fixed points per
//! line), the buffer absorbs the slack.

/// Points per ingredient line used when estimating the ingredients block.
pub const INGREDIENT_LINE_HEIGHT: f32 = 18.0;
/// Height of an `INGREDIENTS:` / `INSTRUCTIONS:` header.
pub const BLOCK_HEADER_HEIGHT: f32 = 20.0;
/// Upper bound on the estimated instructions block height.
pub const MAX_INSTRUCTIONS_BLOCK_HEIGHT: f32 = 300.0;
/// Remaining space a page must have before a footer is drawn on it.
pub const MIN_FOOTER_SPACE: f32 = 80.0;

/// Geometry of a single document page, in PDF points.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Extra room the would-it-fit check insists on beyond the estimate.
    pub break_buffer: f32,
}

/// A4 portrait with 50pt margins on every side.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        width: 595.28,
        height: 841.89,
        margin_top: 50.0,
        margin_bottom: 50.0,
        margin_left: 50.0,
        margin_right: 50.0,
        break_buffer: 20.0,
    }
}

/// Outcome of a would-it-fit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Keep drawing on the current page.
    CurrentPage,
    /// Start a new page and reset the cursor to the top margin.
    NewPage,
}

impl PageConfig {
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Lowest `y` any content may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }

    pub fn available_height(&self, y: f32) -> f32 {
        self.height - y - self.margin_bottom
    }

    /// Decides whether a block of `required` points can start at `y`.
    ///
    /// A cursor already at the top margin always stays put: a fresh page
    /// offers no more room, and breaking would only emit a blank page.
    pub fn place(&self, y: f32, required: f32) -> Placement {
        if y <= self.margin_top {
            return Placement::CurrentPage;
        }
        if self.available_height(y) < required + self.break_buffer {
            Placement::NewPage
        } else {
            Placement::CurrentPage
        }
    }

    /// Whether a single line of `line_height` points still fits above the bottom margin.
    pub fn line_fits(&self, y: f32, line_height: f32) -> bool {
        y <= self.margin_top || y + line_height <= self.content_bottom()
    }

    /// Whether the space left below `y` is enough for a footer.
    pub fn has_footer_room(&self, y: f32) -> bool {
        self.height - y > MIN_FOOTER_SPACE
    }
}

/// Estimated height of an ingredients block with `lines` entries.
pub fn ingredients_block_height(lines: usize) -> f32 {
    BLOCK_HEADER_HEIGHT + INGREDIENT_LINE_HEIGHT * lines as f32
}

/// Estimated height of an instructions block whose text measures `text_height`.
pub fn instructions_block_height(text_height: f32) -> f32 {
    (BLOCK_HEADER_HEIGHT + text_height).min(MAX_INSTRUCTIONS_BLOCK_HEIGHT)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_config_is_a4() {
        let config = default_page_config();
        assert!((config.width - 595.28).abs() < 0.01);
        assert!((config.height - 841.89).abs() < 0.01);
        assert!((config.content_width() - 495.28).abs() < 0.01);
        assert!((config.content_bottom() - 791.89).abs() < 0.01);
    }

    #[test]
    fn test_block_fits_on_current_page() {
        let config = default_page_config();
        assert_eq!(config.place(100.0, 200.0), Placement::CurrentPage);
    }

    #[test]
    fn test_block_near_bottom_needs_new_page() {
        let config = default_page_config();
        // available = 841.89 - 700 - 50 = 91.89; 80 + 20 buffer does not fit
        assert_eq!(config.place(700.0, 80.0), Placement::NewPage);
        // 70 + 20 = 90 fits
        assert_eq!(config.place(700.0, 70.0), Placement::CurrentPage);
    }

    #[test]
    fn test_oversized_block_at_top_does_not_break() {
        let config = default_page_config();
        assert_eq!(config.place(config.margin_top, 5000.0), Placement::CurrentPage);
    }

    #[test]
    fn test_line_fits_up_to_bottom_margin() {
        let config = default_page_config();
        assert!(config.line_fits(770.0, 14.0));
        assert!(!config.line_fits(780.0, 14.0));
    }

    #[test]
    fn test_footer_room_threshold() {
        let config = default_page_config();
        assert!(config.has_footer_room(500.0));
        assert!(!config.has_footer_room(config.height - 70.0));
    }

    #[test]
    fn test_block_height_estimates() {
        assert_eq!(ingredients_block_height(0), BLOCK_HEADER_HEIGHT);
        assert_eq!(ingredients_block_height(3), BLOCK_HEADER_HEIGHT + 54.0);
        assert_eq!(instructions_block_height(40.0), 60.0);
        assert_eq!(instructions_block_height(10_000.0), MAX_INSTRUCTIONS_BLOCK_HEIGHT);
    }
}
