//! A small paragraph-level template engine for `word/document.xml`.
//!
//! Tags are read from the text of each paragraph, so a tag the word processor
//! split across several runs still matches. Supported tags:
//!
//! - `{#name}` / `{/name}`: loop over a list. Each marker must be alone in its
//!   paragraph; the marker paragraphs are dropped from the output.
//! - `{@name}`: alone in a paragraph; the paragraph is replaced by raw XML.
//! - `{name}`: replaced by text. The paragraph is rebuilt as a single run that
//!   keeps the paragraph properties and the formatting of its first run.

use crate::error::{Result, WorkLogError};
use crate::markup::escape_text;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>.*?</w:p>").expect("paragraph pattern")
});
static PARAGRAPH_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<w:p(?:\s[^>]*)?>").expect("paragraph open pattern"));
static TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("text pattern"));
static PARAGRAPH_PROPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:pPr>.*?</w:pPr>|<w:pPr/>").expect("pPr pattern"));
static RUN_PROPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:rPr>.*?</w:rPr>").expect("rPr pattern"));
static CONTROL_ALONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{([#/@])(\w+)\}$").expect("control pattern"));
static CONTROL_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[#/@]\w+\}").expect("control pattern"));
static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("variable pattern"));

/// Data bound to template tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<Scope>),
}

pub type Scope = BTreeMap<String, Value>;

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Scope>> for Value {
    fn from(value: Vec<Scope>) -> Self {
        Value::List(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Verbatim(String),
    /// A paragraph containing `{name}` tags, with its collected text.
    Paragraph { xml: String, text: String },
    Raw(String),
    Loop { name: String, body: Vec<Node> },
}

/// A parsed `document.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parses the document, collecting every structural tag error before failing.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut frames: Vec<(Option<String>, Vec<Node>)> = vec![(None, Vec::new())];
        let mut errors = Vec::new();
        let mut last = 0;

        for paragraph in PARAGRAPH.find_iter(xml) {
            if paragraph.start() > last {
                push_node(&mut frames, Node::Verbatim(xml[last..paragraph.start()].to_string()));
            }
            last = paragraph.end();

            let p_xml = paragraph.as_str();
            let text = paragraph_text(p_xml);
            let trimmed = text.trim();

            if let Some(caps) = CONTROL_ALONE.captures(trimmed) {
                let name = caps[2].to_string();
                match &caps[1] {
                    "#" => frames.push((Some(name), Vec::new())),
                    "@" => push_node(&mut frames, Node::Raw(name)),
                    _ => close_loop(&mut frames, &name, &mut errors),
                }
            } else if let Some(tag) = CONTROL_ANY.find(trimmed) {
                errors.push(format!(
                    "tag {} must be alone in its paragraph (found in \"{trimmed}\")",
                    tag.as_str()
                ));
            } else if VARIABLE.is_match(&text) {
                push_node(
                    &mut frames,
                    Node::Paragraph {
                        xml: p_xml.to_string(),
                        text,
                    },
                );
            } else {
                push_node(&mut frames, Node::Verbatim(p_xml.to_string()));
            }
        }
        if last < xml.len() {
            push_node(&mut frames, Node::Verbatim(xml[last..].to_string()));
        }

        while frames.len() > 1 {
            if let Some((Some(name), _)) = frames.pop() {
                errors.push(format!("unclosed loop {{#{name}}}"));
            }
        }
        if !errors.is_empty() {
            return Err(WorkLogError::Template(errors));
        }
        let nodes = frames.pop().map(|(_, nodes)| nodes).unwrap_or_default();
        Ok(Self { nodes })
    }

    /// Renders the document against `data`. Missing values render as empty text.
    pub fn render(&self, data: &Scope) -> String {
        let mut out = String::new();
        let mut scopes = vec![data];
        render_nodes(&self.nodes, &mut scopes, &mut out);
        out
    }
}

fn push_node(frames: &mut [(Option<String>, Vec<Node>)], node: Node) {
    if let Some((_, nodes)) = frames.last_mut() {
        nodes.push(node);
    }
}

fn close_loop(frames: &mut Vec<(Option<String>, Vec<Node>)>, name: &str, errors: &mut Vec<String>) {
    if frames.len() <= 1 {
        errors.push(format!("unopened loop {{/{name}}}"));
        return;
    }
    let Some((Some(open), body)) = frames.pop() else {
        return;
    };
    if open != name {
        errors.push(format!("loop {{#{open}}} is closed by {{/{name}}}"));
    }
    push_node(frames, Node::Loop { name: open, body });
}

/// Concatenated, unescaped text of every `<w:t>` in the paragraph.
fn paragraph_text(xml: &str) -> String {
    TEXT.captures_iter(xml)
        .map(|caps| unescape_text(&caps[1]))
        .collect()
}

fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn lookup<'a>(scopes: &[&'a Scope], name: &str) -> Option<&'a Value> {
    scopes.iter().rev().find_map(|scope| scope.get(name))
}

fn render_nodes<'a>(nodes: &'a [Node], scopes: &mut Vec<&'a Scope>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Verbatim(xml) => out.push_str(xml),
            Node::Paragraph { xml, text } => {
                let substituted = VARIABLE.replace_all(text, |caps: &Captures| {
                    match lookup(scopes, &caps[1]) {
                        Some(Value::Text(value)) => value.clone(),
                        _ => String::new(),
                    }
                });
                out.push_str(&rebuild_paragraph(xml, &substituted));
            }
            Node::Raw(name) => {
                if let Some(Value::Text(raw)) = lookup(scopes, name) {
                    out.push_str(raw);
                }
            }
            Node::Loop { name, body } => match lookup(scopes, name) {
                Some(Value::List(items)) => {
                    for item in items {
                        scopes.push(item);
                        render_nodes(body, scopes, out);
                        scopes.pop();
                    }
                }
                Some(Value::Text(flag)) if !flag.is_empty() => render_nodes(body, scopes, out),
                _ => {}
            },
        }
    }
}

/// Paragraph with the same opening tag and properties holding `text` as one
/// run styled like the paragraph's first run. Newlines become `<w:br/>`.
fn rebuild_paragraph(xml: &str, text: &str) -> String {
    let open = PARAGRAPH_OPEN
        .find(xml)
        .map(|m| m.as_str())
        .unwrap_or("<w:p>");
    let (paragraph_props, rest) = match PARAGRAPH_PROPS.find(xml) {
        Some(m) => (m.as_str(), &xml[m.end()..]),
        None => ("", xml),
    };
    let run_props = RUN_PROPS.find(rest).map(|m| m.as_str()).unwrap_or("");
    let body = text
        .split('\n')
        .map(|line| format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape_text(line)))
        .collect::<Vec<_>>()
        .join("<w:br/>");
    format!("{open}{paragraph_props}<w:r>{run_props}{body}</w:r></w:p>")
}
