// Layout primitives for the meal-plan document:
// font metrics (text measurement, word-wrap) and page geometry (would-it-fit checks).

pub mod font_metrics;
pub mod pagination;

pub use font_metrics::{FontFace, FontMetrics};
pub use pagination::{default_page_config, PageConfig, Placement};
