use super::segment::parse_line;

/// Escapes `&`, `<` and `>`. Quotes are left alone; output only lands in element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders markup as an HTML fragment: text escaped, tags turned into styled
/// `<span>`s, newlines into `<br>`.
///
/// ```
/// use worklog_core::markup::render_html;
///
/// assert_eq!(
///     render_html("<b>((x))</b>"),
///     r#"&lt;b&gt;<span class="preview-red">x</span>&lt;/b&gt;"#
/// );
/// ```
pub fn render_html(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            parse_line(line)
                .into_iter()
                .map(|segment| match segment.style {
                    Some(style) => format!(
                        r#"<span class="{}">{}</span>"#,
                        style.css_class(),
                        escape_text(segment.text)
                    ),
                    None => escape_text(segment.text),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("<br>")
}
