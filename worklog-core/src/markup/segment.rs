use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// Inline styles of the tag language: `((red text))` and `{{highlighted text}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TagStyle {
    Red,
    #[strum(to_string = "highlight", serialize = "yellow")]
    Highlight,
}

impl TagStyle {
    pub fn open(&self) -> &'static str {
        match self {
            TagStyle::Red => "((",
            TagStyle::Highlight => "{{",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            TagStyle::Red => "))",
            TagStyle::Highlight => "}}",
        }
    }

    /// Class of the `<span>` wrapping this style in HTML previews.
    pub fn css_class(&self) -> &'static str {
        match self {
            TagStyle::Red => "preview-red",
            TagStyle::Highlight => "preview-yellow",
        }
    }
}

/// A run of text with at most one style. Delimiters are not part of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub style: Option<TagStyle>,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str) -> Self {
        Self { text, style: None }
    }
}

/// Splits one line into plain and tagged segments.
///
/// Tags do not nest. At each position the earliest opening delimiter wins and
/// is closed by the nearest matching closing delimiter. An opener with no
/// closer on the line stays literal text.
///
/// ```
/// use worklog_core::markup::{parse_line, TagStyle};
///
/// let segments = parse_line("a((b))c");
/// assert_eq!(segments[1].text, "b");
/// assert_eq!(segments[1].style, Some(TagStyle::Red));
/// ```
pub fn parse_line(line: &str) -> Vec<Segment<'_>> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match tag_at(line, i) {
            Some((style, content_end, tag_end)) => {
                if plain_start < i {
                    segments.push(Segment::plain(&line[plain_start..i]));
                }
                segments.push(Segment {
                    text: &line[i + 2..content_end],
                    style: Some(style),
                });
                i = tag_end;
                plain_start = tag_end;
            }
            None => i += 1,
        }
    }
    if plain_start < line.len() {
        segments.push(Segment::plain(&line[plain_start..]));
    }
    segments
}

/// Segments of every line of `text`, split on `\n`.
pub fn parse(text: &str) -> Vec<Vec<Segment<'_>>> {
    text.split('\n').map(parse_line).collect()
}

/// A complete tag starting at byte `i`: its style, the end of its content and the end of the tag.
fn tag_at(line: &str, i: usize) -> Option<(TagStyle, usize, usize)> {
    let rest = &line.as_bytes()[i..];
    let style = TagStyle::iter().find(|style| rest.starts_with(style.open().as_bytes()))?;
    // Delimiters are ASCII, so `i + 2` is a char boundary.
    let content_start = i + 2;
    let close = line[content_start..].find(style.close())?;
    let content_end = content_start + close;
    Some((style, content_end, content_end + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(line: &str) -> Vec<(&str, Option<TagStyle>)> {
        parse_line(line).into_iter().map(|s| (s.text, s.style)).collect()
    }

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(styled("hello"), [("hello", None)]);
        assert!(parse_line("").is_empty());
    }

    #[test]
    fn both_tags_in_one_line() {
        assert_eq!(
            styled("a((b))c{{d}}e"),
            [
                ("a", None),
                ("b", Some(TagStyle::Red)),
                ("c", None),
                ("d", Some(TagStyle::Highlight)),
                ("e", None),
            ]
        );
    }

    #[test]
    fn closing_is_non_greedy() {
        assert_eq!(
            styled("((x))y((z))"),
            [("x", Some(TagStyle::Red)), ("y", None), ("z", Some(TagStyle::Red))]
        );
    }

    #[test]
    fn unbalanced_markers_stay_literal() {
        assert_eq!(styled("a((b"), [("a((b", None)]);
        assert_eq!(styled("a}}b{{"), [("a}}b{{", None)]);
    }

    #[test]
    fn tags_do_not_nest() {
        assert_eq!(
            styled("(({{x}}))"),
            [("{{x}}", Some(TagStyle::Red))]
        );
        assert_eq!(
            styled("{{a((b}}c))"),
            [("a((b", Some(TagStyle::Highlight)), ("c))", None)]
        );
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(
            styled("完成((三樓))驗收"),
            [("完成", None), ("三樓", Some(TagStyle::Red)), ("驗收", None)]
        );
    }

    #[test]
    fn style_names_parse() {
        assert_eq!("red".parse::<TagStyle>().unwrap(), TagStyle::Red);
        assert_eq!("yellow".parse::<TagStyle>().unwrap(), TagStyle::Highlight);
        assert_eq!("Highlight".parse::<TagStyle>().unwrap(), TagStyle::Highlight);
    }
}
