use super::theme::Palette;
use regex::{Captures, Regex, RegexBuilder};
use termimad::{
    MadSkin,
    crossterm::style::{Color, Stylize},
};
use worklog_core::{
    Day, ImageRef, NodePath,
    markup::{Depth, TagStyle, parse_line},
};

pub struct Renderer {
    skin: MadSkin,
    use_color: bool,
}

impl Renderer {
    pub fn new(use_color: bool) -> Self {
        Self {
            skin: Palette::skin(),
            use_color,
        }
    }

    pub fn print_md(&self, md: &str) {
        self.skin.print_text(md);
    }

    pub fn print_info(&self, message: &str) {
        if self.use_color {
            self.print_md(&format!("|-|\n| {message} |\n|-|\n"));
        } else {
            println!("{message}");
        }
    }

    pub fn print_warning(&self, message: &str) {
        let line = format!("warning: {message}");
        if self.use_color {
            eprintln!("{}", line.with(Palette::RED));
        } else {
            eprintln!("{line}");
        }
    }

    pub fn print_list(&self, values: &[String]) {
        for value in values {
            println!("{}", self.paint(value, Palette::YELLOW));
        }
    }

    /// Prints days with their node paths. Matches of `search` are underlined.
    pub fn print_days(&self, days: &[(usize, &Day)], search: Option<&str>) {
        let emphasis = search
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .and_then(|query| {
                RegexBuilder::new(&regex::escape(query))
                    .case_insensitive(true)
                    .build()
                    .ok()
            });
        for (i, (index, day)) in days.iter().enumerate() {
            if i > 0 {
                println!();
            }
            for line in self.day_lines(Some(*index), day, emphasis.as_ref()) {
                println!("{line}");
            }
        }
    }

    /// Prints days that are not part of the stored log, without node paths.
    pub fn print_report(&self, days: &[Day]) {
        for (i, day) in days.iter().enumerate() {
            if i > 0 {
                println!();
            }
            for line in self.day_lines(None, day, None) {
                println!("{line}");
            }
        }
    }

    /// Listing lines of one day. Node paths are shown only when `index` is given.
    fn day_lines(&self, index: Option<usize>, day: &Day, emphasis: Option<&Regex>) -> Vec<String> {
        let tag = |path: NodePath| match index {
            Some(_) => format!(" {}", self.path_tag(path)),
            None => String::new(),
        };
        let index = index.unwrap_or_default();
        let mut lines = vec![format!(
            "{}{}",
            self.paint(&self.emphasize(&day.date, emphasis), Palette::CYAN),
            tag(NodePath::Day { day: index })
        )];
        for (p, project) in day.projects.iter().enumerate() {
            let name = if project.name.trim().is_empty() {
                "(unnamed)".to_string()
            } else {
                self.emphasize(&project.name, emphasis)
            };
            let path = NodePath::Project {
                day: index,
                project: p,
            };
            lines.push(format!("  {}{}", self.paint(&name, Palette::YELLOW), tag(path)));
            for (i, item) in project.items.iter().enumerate() {
                let path = NodePath::Item {
                    day: index,
                    project: p,
                    item: i,
                };
                let node = Node::new(4, Depth::Item.label(i), &item.content, &item.image);
                self.push_node(&mut lines, node, tag(path), emphasis);
                for (s, sub) in item.subs.iter().enumerate() {
                    let path = NodePath::Sub {
                        day: index,
                        project: p,
                        item: i,
                        sub: s,
                    };
                    let node = Node::new(7, Depth::Sub.label(s), &sub.content, &sub.image);
                    self.push_node(&mut lines, node, tag(path), emphasis);
                    for (ss, subsub) in sub.subsubs.iter().enumerate() {
                        let path = NodePath::SubSub {
                            day: index,
                            project: p,
                            item: i,
                            sub: s,
                            subsub: ss,
                        };
                        let node =
                            Node::new(10, Depth::SubSub.label(ss), &subsub.content, &subsub.image);
                        self.push_node(&mut lines, node, tag(path), emphasis);
                    }
                }
            }
        }
        lines
    }

    fn push_node(&self, lines: &mut Vec<String>, node: Node, tag: String, emphasis: Option<&Regex>) {
        let pad = " ".repeat(node.indent);
        let continuation = " ".repeat(node.indent + node.label.chars().count() + 1);
        let mut text_lines = node.content.split('\n');
        let first = text_lines.next().unwrap_or_default();
        let marker = match node.image {
            image if image.is_remote() => format!(" {}", self.paint("[img]", Palette::GREEN)),
            image if image.is_local_preview() => {
                format!(" {}", self.paint("[img: not uploaded]", Palette::RED))
            }
            _ => String::new(),
        };
        lines.push(format!(
            "{pad}{} {}{marker}{tag}",
            self.paint(&node.label, Palette::BLUE),
            self.markup_line(first, emphasis),
        ));
        for rest in text_lines {
            lines.push(format!("{continuation}{}", self.markup_line(rest, emphasis)));
        }
    }

    /// Red and highlight tags as terminal styles. Without color the
    /// delimiters are kept so nothing is lost.
    fn markup_line(&self, line: &str, emphasis: Option<&Regex>) -> String {
        if !self.use_color {
            return line.to_string();
        }
        parse_line(line)
            .into_iter()
            .map(|segment| match segment.style {
                Some(TagStyle::Red) => segment.text.with(Color::Red).bold().to_string(),
                Some(TagStyle::Highlight) => {
                    segment.text.with(Color::Black).on(Color::Yellow).to_string()
                }
                None => self.emphasize(segment.text, emphasis),
            })
            .collect()
    }

    fn emphasize(&self, text: &str, emphasis: Option<&Regex>) -> String {
        match emphasis {
            Some(re) if self.use_color => re
                .replace_all(text, |caps: &Captures| {
                    caps[0].to_string().bold().underlined().to_string()
                })
                .into_owned(),
            _ => text.to_string(),
        }
    }

    fn path_tag(&self, path: NodePath) -> String {
        self.paint(&format!("[{path}]"), Palette::COMMENT)
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

struct Node<'a> {
    indent: usize,
    label: String,
    content: &'a str,
    image: &'a ImageRef,
}

impl<'a> Node<'a> {
    fn new(indent: usize, label: String, content: &'a str, image: &'a ImageRef) -> Self {
        Self {
            indent,
            label,
            content,
            image,
        }
    }
}
