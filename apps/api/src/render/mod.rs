// Meal-plan PDF rendering: sanitization, theme, canvas backends, document layout.
// Generation is CPU-bound and synchronous; async callers run it inside tokio::task::spawn_blocking.

pub mod canvas;
pub mod document;
pub mod error;
pub mod font_assets;
pub mod handlers;
pub mod pdf_surface;
pub mod sanitize;
pub mod theme;

use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{info, warn};

use crate::layout::{FontMetrics, PageConfig};
use crate::models::meal_plan::{MealPlanContent, RenderOptions};
use crate::render::canvas::{Canvas, PageDecoration};
use crate::render::document::DocumentBuilder;
use crate::render::pdf_surface::PdfSurface;

pub use error::DocumentGenerationError;
pub use font_assets::FontAssets;

/// Turns meal-plan content into a PDF. Cheap to clone; holds no per-document state.
#[derive(Debug, Clone)]
pub struct MealPlanRenderer {
    fonts: Arc<FontAssets>,
    page: PageConfig,
}

impl MealPlanRenderer {
    pub fn new(fonts: Arc<FontAssets>, page: PageConfig) -> Self {
        Self { fonts, page }
    }

    /// Renders the whole document into a new buffer. All-or-nothing.
    pub fn generate(
        &self,
        content: &MealPlanContent,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, DocumentGenerationError> {
        let mut buffer = Vec::new();
        self.generate_into(content, options, &mut buffer)?;
        Ok(buffer)
    }

    /// Renders the document and writes it to `writer`, returning the byte count.
    ///
    /// Nothing is written unless the document was fully built.
    pub fn generate_into<W: Write>(
        &self,
        content: &MealPlanContent,
        options: &RenderOptions,
        writer: &mut W,
    ) -> Result<usize, DocumentGenerationError> {
        if let Err(e) = self.fonts.ensure_available() {
            warn!(error = %e, "font resources unavailable, continuing with built-in metrics");
        }
        let metrics = FontMetrics::load(self.fonts.runtime_dir())?;

        let (bytes, pages) = panic::catch_unwind(AssertUnwindSafe(|| {
            self.build_pdf(content, options, metrics)
        }))
        .map_err(|payload| DocumentGenerationError::classify(panic_message(payload.as_ref())))?;

        writer.write_all(&bytes)?;
        writer.flush()?;

        info!(
            plan_type = options.plan_type.as_str(),
            free_tier = options.is_free_tier,
            pages,
            bytes = bytes.len(),
            "meal plan PDF generated"
        );
        Ok(bytes.len())
    }

    fn build_pdf(
        &self,
        content: &MealPlanContent,
        options: &RenderOptions,
        metrics: FontMetrics,
    ) -> (Vec<u8>, usize) {
        let decoration = PageDecoration {
            background: theme::BACKGROUND,
            watermark: options
                .is_free_tier
                .then(|| theme::WATERMARK_TEXT.to_string()),
        };
        let surface = PdfSurface::new(format!("Meal Plan ({})", options.plan_type.as_str()));
        let canvas = Canvas::new(surface, self.page.clone(), metrics, decoration);
        let canvas = DocumentBuilder::new(canvas, options).build(content);
        let pages = canvas.page_count();
        (canvas.finish(), pages)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected error while rendering the document".to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
