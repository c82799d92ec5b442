//! Font-metric tables for the two PDF base faces used by the meal-plan document.
//!
//! Character widths are in em units (relative to font size). The built-in
//! tables mirror the Adobe Core 14 AFM widths for Helvetica and Helvetica-Bold
//! over ASCII 0x20..=0x7E; when AFM files are available in the runtime font
//! directory their widths take precedence.
//! Index = (char as usize) - 32.

use std::path::Path;

use tracing::debug;

use crate::render::error::DocumentGenerationError;

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

/// The faces the document is typeset in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub const ALL: [FontFace; 2] = [FontFace::Regular, FontFace::Bold];

    /// PostScript name of the PDF base font.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }

    /// File name of the AFM metric file expected in the runtime font directory.
    pub fn afm_file_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica.afm",
            FontFace::Bold => "Helvetica-Bold.afm",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
#[derive(Debug, Clone)]
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in points at `size_pt`.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str, size_pt: f32) -> f32 {
        let em: f32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum();
        em * size_pt
    }

    /// Greedy word-wrap of `text` into lines no wider than `max_width` points.
    ///
    /// Explicit newlines always break; an empty source line is kept as an empty
    /// output line. A single word wider than the line is split by character.
    pub fn wrap_lines(&self, text: &str, size_pt: f32, max_width: f32) -> Vec<String> {
        let space_w = self.measure_str(" ", size_pt);
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0_f32;

            for word in paragraph.split_whitespace() {
                let word_w = self.measure_str(word, size_pt);
                if !current.is_empty() && current_width + space_w + word_w <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space_w + word_w;
                    continue;
                }
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                if word_w <= max_width {
                    current.push_str(word);
                    current_width = word_w;
                } else {
                    current_width = 0.0;
                    for c in word.chars() {
                        let char_w = self.measure_str(c.encode_utf8(&mut [0; 4]), size_pt);
                        if !current.is_empty() && current_width + char_w > max_width {
                            lines.push(std::mem::take(&mut current));
                            current_width = 0.0;
                        }
                        current.push(c);
                        current_width += char_w;
                    }
                }
            }
            lines.push(current);
        }
        lines
    }

    /// Height of `text` wrapped at `max_width`, with `line_height` points per line.
    pub fn text_height(&self, text: &str, size_pt: f32, max_width: f32, line_height: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.wrap_lines(text, size_pt, max_width).len() as f32 * line_height
    }

    /// Builds a table from the contents of an AFM file.
    ///
    /// Only `C <code> ; WX <width> ;` records for codes 32..=126 are read; other
    /// codes keep the built-in width. Returns `None` when no usable record is found.
    fn from_afm(face: FontFace, afm: &str) -> Option<Self> {
        let mut table = builtin_table(face).clone();
        let mut found = 0usize;

        for line in afm.lines() {
            let line = line.trim();
            if !line.starts_with("C ") {
                continue;
            }
            let mut code: Option<i32> = None;
            let mut width: Option<f32> = None;
            for field in line.split(';') {
                let mut parts = field.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("C"), Some(v)) => code = v.parse().ok(),
                    (Some("WX"), Some(v)) => width = v.parse().ok(),
                    _ => {}
                }
            }
            if let (Some(code), Some(width)) = (code, width) {
                if (32..=126).contains(&code) {
                    table.widths[(code - 32) as usize] = width / 1000.0;
                    found += 1;
                }
            }
        }

        (found > 0).then_some(table)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loaded metrics
// ────────────────────────────────────────────────────────────────────────────

/// Width tables for every face, resolved once per document.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    regular: FontMetricTable,
    bold: FontMetricTable,
}

impl FontMetrics {
    /// The built-in Core 14 tables.
    pub fn builtin() -> Self {
        Self {
            regular: HELVETICA_TABLE.clone(),
            bold: HELVETICA_BOLD_TABLE.clone(),
        }
    }

    /// Loads metrics from the AFM files in `dir`, falling back to the built-in
    /// table for any face whose file is absent.
    ///
    /// A file that exists but cannot be read or parsed is an incompatible font
    /// resource and fails document construction.
    pub fn load(dir: &Path) -> Result<Self, DocumentGenerationError> {
        let mut metrics = Self::builtin();
        for face in FontFace::ALL {
            let path = dir.join(face.afm_file_name());
            if !path.exists() {
                debug!(face = face.base_font(), "AFM file not found, using built-in metrics");
                continue;
            }
            let afm = std::fs::read_to_string(&path).map_err(|e| {
                DocumentGenerationError::Construction(format!(
                    "font file {} could not be read: {e}",
                    path.display()
                ))
            })?;
            let table = FontMetricTable::from_afm(face, &afm).ok_or_else(|| {
                DocumentGenerationError::Construction(format!(
                    "font file {} contains no character metrics",
                    path.display()
                ))
            })?;
            match face {
                FontFace::Regular => metrics.regular = table,
                FontFace::Bold => metrics.bold = table,
            }
        }
        Ok(metrics)
    }

    pub fn table(&self, face: FontFace) -> &FontMetricTable {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
        }
    }
}

fn builtin_table(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular => &HELVETICA_TABLE,
        FontFace::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica: body text, ingredient lines, captions.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
};

/// Helvetica-Bold: headings, labels, stat values.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn regular() -> FontMetricTable {
        FontMetrics::builtin().table(FontFace::Regular).clone()
    }

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(regular().measure_str("", 12.0), 0.0);
    }

    #[test]
    fn test_measure_str_scales_with_size() {
        // "Oats" = O(0.778) + a(0.556) + t(0.278) + s(0.500) = 2.112em
        let width = regular().measure_str("Oats", 10.0);
        assert!((width - 21.12).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let table = regular();
        let width = table.measure_str("é", 1.0);
        assert!((width - table.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_bold_wider_than_regular() {
        let metrics = FontMetrics::builtin();
        let text = "Grilled salmon with quinoa";
        assert!(
            metrics.table(FontFace::Bold).measure_str(text, 12.0)
                > metrics.table(FontFace::Regular).measure_str(text, 12.0)
        );
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        assert_eq!(regular().wrap_lines("Boil then serve.", 10.0, 400.0), vec!["Boil then serve."]);
    }

    #[test]
    fn test_wrap_long_text_stays_within_width() {
        let table = regular();
        let text = "word ".repeat(80);
        let lines = table.wrap_lines(text.trim(), 10.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(table.measure_str(line, 10.0) <= 200.0, "line too wide: {line}");
        }
    }

    #[test]
    fn test_wrap_keeps_explicit_blank_lines() {
        let lines = regular().wrap_lines("1. Boil\n\n2. Serve", 10.0, 400.0);
        assert_eq!(lines, vec!["1. Boil", "", "2. Serve"]);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let table = regular();
        let word = "x".repeat(200);
        let lines = table.wrap_lines(&word, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(table.measure_str(line, 10.0) <= 100.0);
        }
    }

    #[test]
    fn test_text_height_counts_lines() {
        let table = regular();
        assert_eq!(table.text_height("", 10.0, 100.0, 14.0), 0.0);
        assert_eq!(table.text_height("a\nb\nc", 10.0, 100.0, 14.0), 42.0);
    }

    #[test]
    fn test_afm_overrides_widths() {
        let afm = "StartFontMetrics 4.1\nStartCharMetrics 2\nC 32 ; WX 300 ; N space ;\nC 65 ; WX 1000 ; N A ;\nEndCharMetrics\n";
        let table = FontMetricTable::from_afm(FontFace::Regular, afm).unwrap();
        assert!((table.measure_str("A", 1.0) - 1.0).abs() < 1e-4);
        assert!((table.measure_str(" ", 1.0) - 0.3).abs() < 1e-4);
        // untouched codes keep the built-in width
        assert!((table.measure_str("a", 1.0) - 0.556).abs() < 1e-4);
    }

    #[test]
    fn test_afm_without_metrics_is_rejected() {
        assert!(FontMetricTable::from_afm(FontFace::Bold, "not an afm file").is_none());
    }

    #[test]
    fn test_load_missing_dir_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = FontMetrics::load(&dir.path().join("absent")).unwrap();
        let width = metrics.table(FontFace::Regular).measure_str("A", 1.0);
        assert!((width - 0.667).abs() < 1e-4);
    }

    #[test]
    fn test_load_corrupt_afm_is_construction_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Helvetica-Bold.afm"), "garbage").unwrap();
        let err = FontMetrics::load(dir.path()).unwrap_err();
        assert!(matches!(err, DocumentGenerationError::Construction(_)));
    }
}
