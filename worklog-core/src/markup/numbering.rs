use super::docx::Indent;

/// Letter label for a zero-based index: `a`..`z`, then `aa`, `ab`, ...
pub fn to_abc(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Lowercase roman numeral. Zero has no numeral and yields an empty string.
pub fn to_roman(mut n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Nesting level below a project, as numbered in documents and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Item,
    Sub,
    SubSub,
}

impl Depth {
    /// Numbering prefix for the zero-based sibling `index`: `1).`, `a.`, `i.`.
    pub fn label(&self, index: usize) -> String {
        match self {
            Depth::Item => format!("{}).", index + 1),
            Depth::Sub => format!("{}.", to_abc(index)),
            Depth::SubSub => format!("{}.", to_roman(index + 1)),
        }
    }

    /// Paragraph indentation in twentieths of a point.
    pub fn indent(&self) -> Indent {
        match self {
            Depth::Item => Indent { left: 360, hanging: 360 },
            Depth::Sub => Indent { left: 600, hanging: 240 },
            Depth::SubSub => Indent { left: 840, hanging: 240 },
        }
    }
}
