//! Fixed dark palette and type scale of the exported meal plan.

use crate::layout::FontFace;
use crate::render::canvas::TextStyle;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as 0.0..=1.0 floats, the form PDF color operators take.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

pub const BACKGROUND: Color = Color::rgb(0x0A, 0x0A, 0x0A);
pub const PRIMARY: Color = Color::rgb(0xA3, 0xE6, 0x35);
pub const TEXT: Color = Color::rgb(0xFF, 0xFF, 0xFF);
pub const TEXT_MUTED: Color = Color::rgb(0x9C, 0xA3, 0xAF);
pub const CARD: Color = Color::rgb(0x1F, 0x1F, 0x1F);
pub const CARD_BORDER: Color = Color::rgb(0x33, 0x33, 0x33);

pub const BRAND_NAME: &str = "MEALPLAN AI";
pub const WATERMARK_TEXT: &str = "MEALPLAN AI FREE PLAN";
pub const WATERMARK_SIZE: f32 = 44.0;
pub const WATERMARK_ANGLE_DEG: f32 = 45.0;
pub const WATERMARK_OPACITY: f32 = 0.08;

pub const BRAND: TextStyle = TextStyle::new(FontFace::Bold, 14.0, PRIMARY);
pub const BADGE: TextStyle = TextStyle::new(FontFace::Bold, 10.0, BACKGROUND);
pub const TITLE: TextStyle = TextStyle::new(FontFace::Bold, 34.0, TEXT);
pub const TITLE_ACCENT: TextStyle = TextStyle::new(FontFace::Bold, 34.0, PRIMARY);
pub const PAGE_HEADER: TextStyle = TextStyle::new(FontFace::Bold, 26.0, PRIMARY);
pub const SECTION_HEADER: TextStyle = TextStyle::new(FontFace::Bold, 13.0, PRIMARY);
pub const MEAL_LABEL: TextStyle = TextStyle::new(FontFace::Bold, 10.0, PRIMARY);
pub const MEAL_NAME: TextStyle = TextStyle::new(FontFace::Bold, 15.0, TEXT);
pub const BLOCK_HEADER: TextStyle = TextStyle::new(FontFace::Bold, 10.0, TEXT_MUTED);
pub const BODY: TextStyle = TextStyle::new(FontFace::Regular, 10.0, TEXT);
pub const CAPTION: TextStyle = TextStyle::new(FontFace::Regular, 10.0, TEXT_MUTED);
pub const FOOTER: TextStyle = TextStyle::new(FontFace::Regular, 8.0, TEXT_MUTED);
pub const STAT_LABEL: TextStyle = TextStyle::new(FontFace::Bold, 9.0, TEXT_MUTED);
pub const STAT_VALUE: TextStyle = TextStyle::new(FontFace::Bold, 22.0, TEXT);
pub const SNACK_NAME: TextStyle = TextStyle::new(FontFace::Bold, 11.0, TEXT);
pub const CATEGORY: TextStyle = TextStyle::new(FontFace::Bold, 11.0, PRIMARY);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unit() {
        assert_eq!(Color::rgb(255, 0, 0).to_unit(), (1.0, 0.0, 0.0));
        let (r, g, b) = BACKGROUND.to_unit();
        assert!(r < 0.05 && g < 0.05 && b < 0.05, "background must be near-black");
    }
}
