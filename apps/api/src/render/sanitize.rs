//! Text sanitization for untrusted meal-plan strings.
//!
//! Every string that reaches the layout engine passes through [`sanitize_text`]
//! first, whether it is a meal name, an ingredient, an instruction block, a
//! grocery category or a grocery item. The function is pure and idempotent.

/// Cleans a user-influenced string so it is safe to measure and draw.
///
/// - drops ASCII control characters other than `\n`, `\r` and `\t`
/// - keeps printable ASCII and U+00A0..=U+FFFF; C1 controls and astral-plane
///   code points (emoji and the like) are dropped
/// - normalizes CRLF and CR to LF
/// - collapses runs of spaces and tabs to a single space
/// - trims every line, then collapses 3+ consecutive newlines to one blank line
/// - trims the result
pub fn sanitize_text(input: &str) -> String {
    let filtered: String = input.chars().filter(|c| is_allowed(*c)).collect();
    let normalized = filtered.replace("\r\n", "\n").replace('\r', "\n");

    let mut collapsed = String::with_capacity(normalized.len());
    let mut in_blank_run = false;
    for c in normalized.chars() {
        if c == ' ' || c == '\t' {
            if !in_blank_run {
                collapsed.push(' ');
            }
            in_blank_run = true;
        } else {
            collapsed.push(c);
            in_blank_run = false;
        }
    }

    let mut out = String::with_capacity(collapsed.len());
    let mut newline_run = 0usize;
    for (i, line) in collapsed.split('\n').map(str::trim).enumerate() {
        if i > 0 {
            newline_run += 1;
            if newline_run <= 2 {
                out.push('\n');
            }
        }
        if !line.is_empty() {
            out.push_str(line);
            newline_run = 0;
        }
    }

    out.trim().to_string()
}

fn is_allowed(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t' | '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FFFF}')
}

/// Truncates `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept.trim_end())
}

/// Joins the lines of already-sanitized text with single spaces, for labels drawn on one line.
pub fn to_single_line(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_forbidden_control(c: char) -> bool {
        matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
    }

    fn assert_clean(s: &str) {
        assert!(
            !s.chars().any(is_forbidden_control),
            "control character left in {s:?}"
        );
        assert!(!s.contains("\n\n\n"), "more than one blank line in {s:?}");
        assert!(!s.contains('\r'), "carriage return left in {s:?}");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize_text("Grilled chicken salad"), "Grilled chicken salad");
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text("   \t \n\r\n  "), "");
    }

    #[test]
    fn test_control_characters_stripped() {
        assert_eq!(sanitize_text("Oa\u{0}ts\u{7}\u{1B}[31m"), "Oats[31m");
        assert_eq!(sanitize_text("a\u{0B}b\u{0C}c\u{7F}d"), "abcd");
    }

    #[test]
    fn test_c1_controls_and_astral_dropped() {
        assert_eq!(sanitize_text("pasta\u{85} 🍝"), "pasta");
        assert_eq!(sanitize_text("crème brûlée"), "crème brûlée");
        assert_eq!(sanitize_text("tofu\u{A0}bowl"), "tofu\u{A0}bowl");
    }

    #[test]
    fn test_spaces_and_tabs_collapse() {
        assert_eq!(sanitize_text("1   cup\t\t rice"), "1 cup rice");
    }

    #[test]
    fn test_line_endings_normalized_and_lines_trimmed() {
        assert_eq!(sanitize_text("  Boil \r\n  Serve\rEat  "), "Boil\nServe\nEat");
    }

    #[test]
    fn test_blank_line_runs_collapse_to_one() {
        assert_eq!(sanitize_text("Step 1\n\n\n\n\nStep 2"), "Step 1\n\nStep 2");
        assert_eq!(sanitize_text("Step 1\n \n\t\n  \nStep 2"), "Step 1\n\nStep 2");
        assert_eq!(sanitize_text("Step 1\n\nStep 2"), "Step 1\n\nStep 2");
    }

    #[test]
    fn test_idempotent_on_awkward_inputs() {
        let inputs = [
            "",
            "   ",
            "\n\n\n",
            "a\r\r\rb",
            "  x  \n\n\n\n  y  \t",
            "\u{0}\u{1}\u{2}mixed\u{1F}\u{7F}",
            "tab\tseparated\tvalues",
            "line\u{2028}\n\n\n sep",
            "\u{3000}ideographic\u{3000}space\u{3000}",
            "🥑 avocado \u{FEFF} toast",
            "1. Boil\n\n2. Serve\n\n\n\n3. Eat",
        ];
        for input in inputs {
            let once = sanitize_text(input);
            let twice = sanitize_text(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
            assert_clean(&once);
        }
    }

    #[test]
    fn test_total_over_every_low_code_point() {
        let all: String = (0u32..0x300).filter_map(char::from_u32).collect();
        let cleaned = sanitize_text(&all);
        assert_clean(&cleaned);
        assert_eq!(sanitize_text(&cleaned), cleaned);
    }

    #[test]
    fn test_to_single_line() {
        assert_eq!(to_single_line("dairy\n\nand eggs"), "dairy and eggs");
        assert_eq!(to_single_line("produce"), "produce");
        assert_eq!(to_single_line(""), "");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 4), "abcd...");
        assert_eq!(truncate_with_ellipsis("ab cd", 3), "ab...");
    }
}
