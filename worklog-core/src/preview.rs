//! Standalone HTML rendering of a log book, for printing and report review.

use crate::markup::{Depth, escape_text, render_html};
use crate::model::{ImageRef, LogBook};
use quick_xml::escape::escape;
use std::fmt::Write;

const STYLE: &str = "\
body{font-family:\"Noto Sans TC\",\"Microsoft JhengHei\",sans-serif;margin:2rem;color:#222}
.day-card{border:1px solid #ddd;border-radius:6px;padding:1rem 1.5rem;margin-bottom:1.5rem;break-inside:avoid}
.day-date{margin:0 0 .5rem;font-size:1.2rem}
.project h3{margin:.75rem 0 .25rem;font-size:1.05rem}
.item{margin-left:1.5rem}.sub{margin-left:3rem}.subsub{margin-left:4.5rem}
.label{display:inline-block;min-width:2rem}
.attachment{display:block;max-width:480px;margin:.25rem 0 .5rem 2rem}
.preview-red{color:#d32f2f;font-weight:bold}
.preview-yellow{background:#fff59d}
@media print{body{margin:0}.day-card{border:none}}";

/// Renders `book` as a complete HTML page titled `title`.
pub fn render_page(title: &str, book: &LogBook) -> String {
    let mut html = String::new();
    let title = escape_text(title);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"zh-Hant\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    for day in &book.days {
        let _ = writeln!(
            html,
            "<section class=\"day-card\">\n<h2 class=\"day-date\">{}</h2>",
            escape_text(&day.date)
        );
        for project in &day.projects {
            let _ = writeln!(
                html,
                "<div class=\"project\">\n<h3>{}</h3>",
                escape_text(&project.name)
            );
            for (i, item) in project.items.iter().enumerate() {
                push_node(&mut html, Depth::Item, i, &item.content, &item.image);
                for (j, sub) in item.subs.iter().enumerate() {
                    push_node(&mut html, Depth::Sub, j, &sub.content, &sub.image);
                    for (k, subsub) in sub.subsubs.iter().enumerate() {
                        push_node(&mut html, Depth::SubSub, k, &subsub.content, &subsub.image);
                    }
                }
            }
            html.push_str("</div>\n");
        }
        html.push_str("</section>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn push_node(html: &mut String, depth: Depth, index: usize, content: &str, image: &ImageRef) {
    let class = match depth {
        Depth::Item => "item",
        Depth::Sub => "sub",
        Depth::SubSub => "subsub",
    };
    let _ = write!(
        html,
        "<div class=\"{class}\"><span class=\"label\">{}</span><span class=\"content\">{}</span>",
        depth.label(index),
        render_html(content)
    );
    if !image.img_url.is_empty() {
        let _ = write!(
            html,
            "<img class=\"attachment\" src=\"{}\" alt=\"\">",
            escape(image.img_url.as_str())
        );
    }
    html.push_str("</div>\n");
}
