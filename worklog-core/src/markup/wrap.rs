use super::segment::TagStyle;
use crate::error::{Result, WorkLogError};
use std::ops::Range;

/// Wraps the characters in `selection` (char offsets, end exclusive) in the
/// delimiters of `style`. The input is never modified; on error nothing is returned.
///
/// ```
/// use worklog_core::markup::{wrap_selection, TagStyle};
///
/// let out = wrap_selection("fix the pump", 4..7, TagStyle::Red).unwrap();
/// assert_eq!(out, "fix ((the)) pump");
/// ```
pub fn wrap_selection(text: &str, selection: Range<usize>, style: TagStyle) -> Result<String> {
    let len = text.chars().count();
    if selection.start > selection.end || selection.end > len {
        return Err(WorkLogError::SelectionOutOfBounds {
            start: selection.start,
            end: selection.end,
            len,
        });
    }
    if selection.is_empty() {
        return Err(WorkLogError::EmptySelection);
    }
    let start = byte_offset(text, selection.start);
    let end = byte_offset(text, selection.end);
    Ok(format!(
        "{}{}{}{}{}",
        &text[..start],
        style.open(),
        &text[start..end],
        style.close(),
        &text[end..]
    ))
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_by_character_offsets() {
        let out = wrap_selection("今日完成三樓驗收", 4..6, TagStyle::Highlight).unwrap();
        assert_eq!(out, "今日完成{{三樓}}驗收");
        let out = wrap_selection("abc", 0..3, TagStyle::Red).unwrap();
        assert_eq!(out, "((abc))");
    }

    #[test]
    fn zero_length_selection_is_rejected() {
        let text = String::from("unchanged");
        let err = wrap_selection(&text, 3..3, TagStyle::Red).unwrap_err();
        assert!(matches!(err, WorkLogError::EmptySelection));
        assert_eq!(err.to_string(), "select text first");
        assert_eq!(text, "unchanged");
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        assert!(matches!(
            wrap_selection("abc", 1..9, TagStyle::Red),
            Err(WorkLogError::SelectionOutOfBounds { len: 3, .. })
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = wrap_selection("abc", 2..1, TagStyle::Red);
        assert!(reversed.is_err());
    }
}
