//! WordprocessingML fragments for marked-up text.

use super::html::escape_text;
use super::segment::{TagStyle, parse_line};
use quick_xml::escape::escape;

/// Run properties shared by every run of a generated paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStyle {
    pub font: String,
    /// Font size in half-points (24 = 12pt).
    pub size_half_points: u32,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self {
            font: "標楷體".to_string(),
            size_half_points: 24,
        }
    }
}

/// Left and hanging indentation in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub left: u32,
    pub hanging: u32,
}

const RED: &str = "FF0000";
const BLACK: &str = "000000";
const LINE_BREAK_RUN: &str = "<w:r><w:br/></w:r>";

/// One `<w:p>` holding `text` as styled runs, lines separated by break runs.
/// Empty text yields an empty string, and empty segments yield no run.
pub fn paragraph_xml(text: &str, indent: Indent, style: &RunStyle) -> String {
    if text.is_empty() {
        return String::new();
    }
    let run_props = run_properties(style);
    let runs = text
        .split('\n')
        .map(|line| {
            parse_line(line)
                .into_iter()
                .filter(|segment| !segment.text.is_empty())
                .map(|segment| run_xml(&run_props, segment.text, segment.style))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(LINE_BREAK_RUN);
    format!(
        r#"<w:p><w:pPr><w:ind w:left="{}" w:hanging="{}"/><w:spacing w:line="240" w:lineRule="auto"/></w:pPr>{runs}</w:p>"#,
        indent.left, indent.hanging
    )
}

fn run_properties(style: &RunStyle) -> String {
    let font = escape(style.font.as_str());
    format!(
        r#"<w:rFonts w:ascii="{font}" w:eastAsia="{font}" w:hAnsi="{font}" w:cs="{font}" w:hint="eastAsia"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
        size = style.size_half_points
    )
}

fn run_xml(run_props: &str, text: &str, style: Option<TagStyle>) -> String {
    let (color, highlight) = match style {
        Some(TagStyle::Red) => (RED, ""),
        Some(TagStyle::Highlight) => (BLACK, r#"<w:highlight w:val="yellow"/>"#),
        None => (BLACK, ""),
    };
    format!(
        r#"<w:r><w:rPr>{run_props}<w:color w:val="{color}"/>{highlight}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_text(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDENT: Indent = Indent {
        left: 360,
        hanging: 360,
    };

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(paragraph_xml("", INDENT, &RunStyle::default()), "");
    }

    #[test]
    fn paragraph_carries_indent_and_spacing() {
        let xml = paragraph_xml("plain", INDENT, &RunStyle::default());
        assert!(xml.starts_with(
            r#"<w:p><w:pPr><w:ind w:left="360" w:hanging="360"/><w:spacing w:line="240" w:lineRule="auto"/></w:pPr>"#
        ));
        assert!(xml.ends_with("</w:p>"));
        assert!(xml.contains(r#"<w:rFonts w:ascii="標楷體""#));
        assert!(xml.contains(r#"<w:sz w:val="24"/><w:szCs w:val="24"/>"#));
        assert!(xml.contains(r#"<w:color w:val="000000"/></w:rPr><w:t xml:space="preserve">plain</w:t>"#));
    }

    #[test]
    fn styled_segments_become_styled_runs() {
        let xml = paragraph_xml("a((b)){{c}}", INDENT, &RunStyle::default());
        assert_eq!(xml.matches("<w:r>").count(), 3);
        assert!(xml.contains(r#"<w:color w:val="FF0000"/></w:rPr><w:t xml:space="preserve">b</w:t>"#));
        assert!(xml.contains(
            r#"<w:color w:val="000000"/><w:highlight w:val="yellow"/></w:rPr><w:t xml:space="preserve">c</w:t>"#
        ));
        assert!(!xml.contains("(("));
    }

    #[test]
    fn lines_are_joined_with_break_runs() {
        let xml = paragraph_xml("one\ntwo", INDENT, &RunStyle::default());
        assert_eq!(xml.matches(LINE_BREAK_RUN).count(), 1);
        assert_eq!(xml.matches("<w:p>").count(), 1);
    }

    #[test]
    fn empty_tags_produce_no_run_and_text_is_escaped() {
        let xml = paragraph_xml("(())x<y", INDENT, &RunStyle::default());
        assert_eq!(xml.matches("<w:t ").count(), 1);
        assert!(xml.contains("x&lt;y"));
    }

    #[test]
    fn custom_font_and_size() {
        let style = RunStyle {
            font: "Noto \"Serif\"".into(),
            size_half_points: 28,
        };
        let xml = paragraph_xml("x", INDENT, &style);
        assert!(xml.contains(r#"w:ascii="Noto &quot;Serif&quot;""#));
        assert!(xml.contains(r#"<w:sz w:val="28"/>"#));
    }
}
