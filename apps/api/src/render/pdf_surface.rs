//! [`Surface`] backed by `pdf-writer`.
//!
//! Page contents are collected as one [`Content`] stream per page and the
//! object graph (catalog, page tree, fonts, graphics states) is assembled in
//! [`PdfSurface::finish`] once the page count is known. Text uses the
//! built-in Helvetica faces with WinAnsi encoding, so no font program is embedded.

use pdf_writer::{Content, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};

use crate::layout::FontFace;
use crate::render::canvas::{Rect, Surface, TextStyle};
use crate::render::theme::Color;

/// Ascent of Helvetica as a fraction of the font size; places the baseline below the line top.
const ASCENT: f32 = 0.718;
/// Control-point distance for a quarter circle drawn with one cubic Bézier.
const KAPPA: f32 = 0.552_284_8;

struct PdfPage {
    width: f32,
    height: f32,
    content: Content,
}

pub struct PdfSurface {
    title: String,
    pages: Vec<PdfPage>,
    /// Distinct fill/stroke opacities in use; index `i` is graphics state `/GS{i}`.
    opacities: Vec<f32>,
}

impl PdfSurface {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            opacities: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut PdfPage {
        if self.pages.is_empty() {
            self.begin_page(0.0, 0.0);
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn opacity_state(&mut self, opacity: f32) -> String {
        let index = match self.opacities.iter().position(|o| (o - opacity).abs() < f32::EPSILON) {
            Some(index) => index,
            None => {
                self.opacities.push(opacity);
                self.opacities.len() - 1
            }
        };
        format!("GS{index}")
    }
}

fn font_resource(face: FontFace) -> Name<'static> {
    match face {
        FontFace::Regular => Name(b"F1"),
        FontFace::Bold => Name(b"F2"),
    }
}

/// Encodes text for a WinAnsi-encoded simple font.
///
/// Latin-1 maps to itself; the common typographic characters of the
/// 0x80..=0x9F block are mapped explicitly; anything else becomes `?`.
pub fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

impl Surface for PdfSurface {
    fn begin_page(&mut self, width: f32, height: f32) {
        self.pages.push(PdfPage {
            width,
            height,
            content: Content::new(),
        });
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let page = self.current();
        let (r, g, b) = color.to_unit();
        let y = page.height - rect.bottom();
        page.content
            .set_fill_rgb(r, g, b)
            .rect(rect.x, y, rect.width, rect.height)
            .fill_nonzero();
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let page = self.current();
        let (r, g, b) = color.to_unit();
        let y = page.height - rect.bottom();
        page.content
            .set_stroke_rgb(r, g, b)
            .set_line_width(line_width)
            .rect(rect.x, y, rect.width, rect.height)
            .stroke();
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let page = self.current();
        let (r, g, b) = color.to_unit();
        let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0);
        let k = radius * KAPPA;
        let (x0, x1) = (rect.x, rect.x + rect.width);
        let (y0, y1) = (page.height - rect.bottom(), page.height - rect.y);

        page.content
            .set_fill_rgb(r, g, b)
            .move_to(x0 + radius, y0)
            .line_to(x1 - radius, y0)
            .cubic_to(x1 - radius + k, y0, x1, y0 + radius - k, x1, y0 + radius)
            .line_to(x1, y1 - radius)
            .cubic_to(x1, y1 - radius + k, x1 - radius + k, y1, x1 - radius, y1)
            .line_to(x0 + radius, y1)
            .cubic_to(x0 + radius - k, y1, x0, y1 - radius + k, x0, y1 - radius)
            .line_to(x0, y0 + radius)
            .cubic_to(x0, y0 + radius - k, x0 + radius - k, y0, x0 + radius, y0)
            .close_path()
            .fill_nonzero();
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32) {
        let page = self.current();
        let (r, g, b) = color.to_unit();
        let height = page.height;
        page.content
            .set_stroke_rgb(r, g, b)
            .set_line_width(line_width)
            .move_to(from.0, height - from.1)
            .line_to(to.0, height - to.1)
            .stroke();
    }

    fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        let encoded = to_winansi(text);
        let page = self.current();
        let (r, g, b) = style.color.to_unit();
        let baseline = page.height - y - style.size * ASCENT;
        page.content
            .begin_text()
            .set_font(font_resource(style.face), style.size)
            .set_fill_rgb(r, g, b)
            .set_text_matrix([1.0, 0.0, 0.0, 1.0, x, baseline])
            .show(Str(&encoded))
            .end_text();
    }

    fn rotated_text(&mut self, origin: (f32, f32), angle_deg: f32, text: &str, style: TextStyle, opacity: f32) {
        let state = self.opacity_state(opacity);
        let encoded = to_winansi(text);
        let page = self.current();
        let (r, g, b) = style.color.to_unit();
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let baseline = page.height - origin.1;
        page.content
            .save_state()
            .set_parameters(Name(state.as_bytes()))
            .begin_text()
            .set_font(font_resource(style.face), style.size)
            .set_fill_rgb(r, g, b)
            .set_text_matrix([cos, sin, -sin, cos, origin.0, baseline])
            .show(Str(&encoded))
            .end_text()
            .restore_state();
    }

    fn finish(self) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let mut next_id = 0;
        let mut alloc = || {
            next_id += 1;
            Ref::new(next_id)
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();
        let font_ids: Vec<(FontFace, Ref)> = FontFace::ALL.iter().map(|f| (*f, alloc())).collect();
        let state_ids: Vec<Ref> = self.opacities.iter().map(|_| alloc()).collect();
        let page_ids: Vec<Ref> = self.pages.iter().map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = self.pages.iter().map(|_| alloc()).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        pdf.document_info(info_id)
            .title(TextStr(&self.title))
            .creator(TextStr(crate::render::theme::BRAND_NAME))
            .producer(TextStr(concat!("mealplan ", env!("CARGO_PKG_VERSION"))));

        for (face, id) in &font_ids {
            pdf.type1_font(*id)
                .base_font(Name(face.base_font().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        for (opacity, id) in self.opacities.iter().zip(&state_ids) {
            pdf.ext_graphics(*id)
                .non_stroking_alpha(*opacity)
                .stroking_alpha(*opacity);
        }

        let state_names: Vec<String> = (0..state_ids.len()).map(|i| format!("GS{i}")).collect();

        for (i, page) in self.pages.into_iter().enumerate() {
            {
                let mut writer = pdf.page(page_ids[i]);
                writer
                    .media_box(PdfRect::new(0.0, 0.0, page.width, page.height))
                    .parent(pages_id)
                    .contents(content_ids[i]);
                let mut resources = writer.resources();
                {
                    let mut fonts = resources.fonts();
                    for (face, id) in &font_ids {
                        fonts.pair(font_resource(*face), *id);
                    }
                }
                if !state_ids.is_empty() {
                    let mut states = resources.ext_g_states();
                    for (name, id) in state_names.iter().zip(&state_ids) {
                        states.pair(Name(name.as_bytes()), *id);
                    }
                }
            }
            let raw = page.content.finish();
            pdf.stream(content_ids[i], &raw);
        }

        pdf.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::theme;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(to_winansi("Oats"), b"Oats".to_vec());
        assert_eq!(to_winansi("é•…"), vec![0xE9, 0x95, 0x85]);
        assert_eq!(to_winansi("日"), b"?".to_vec());
    }

    #[test]
    fn test_finish_writes_one_page_object_per_page() {
        let mut surface = PdfSurface::new("Test");
        for _ in 0..3 {
            surface.begin_page(595.28, 841.89);
            surface.text(50.0, 50.0, "DAY 1", theme::PAGE_HEADER);
        }
        let bytes = surface.finish();
        assert!(bytes.starts_with(b"%PDF-"));
        let page_objects = count(&bytes, b"/Type /Page") - count(&bytes, b"/Type /Pages");
        assert_eq!(page_objects, 3);
        assert_eq!(count(&bytes, b"(DAY 1)"), 3);
    }

    #[test]
    fn test_opacity_states_are_deduplicated() {
        let mut surface = PdfSurface::new("Test");
        surface.begin_page(100.0, 100.0);
        surface.rotated_text((10.0, 90.0), 45.0, "W", theme::BODY, 0.1);
        surface.rotated_text((10.0, 90.0), 45.0, "W", theme::BODY, 0.1);
        surface.rotated_text((10.0, 90.0), 45.0, "W", theme::BODY, 0.5);
        assert_eq!(surface.opacities, vec![0.1, 0.5]);
    }
}
