//! Report documents: fills a user-supplied `.docx` template with the log.
//!
//! The template sees `logs[] { date, projects[] { name, xml_content } }`, where
//! `xml_content` is ready-made paragraph XML meant for a `{@xml_content}` tag.

mod template;

pub use template::{Scope, Template, Value};

use crate::error::{Result, WorkLogError};
use crate::markup::{Depth, RunStyle, paragraph_xml};
use crate::model::{LogBook, Project};
use std::io::{Cursor, Read, Write};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";

/// Numbered paragraphs for every item, sub-item and sub-sub-item of a project.
pub fn project_xml(project: &Project, style: &RunStyle) -> String {
    let mut xml = String::new();
    for (i, item) in project.items.iter().enumerate() {
        let depth = Depth::Item;
        xml += &paragraph_xml(&format!("{}{}", depth.label(i), item.content), depth.indent(), style);
        for (j, sub) in item.subs.iter().enumerate() {
            let depth = Depth::Sub;
            xml += &paragraph_xml(&format!("{}{}", depth.label(j), sub.content), depth.indent(), style);
            for (k, subsub) in sub.subsubs.iter().enumerate() {
                let depth = Depth::SubSub;
                xml += &paragraph_xml(
                    &format!("{}{}", depth.label(k), subsub.content),
                    depth.indent(),
                    style,
                );
            }
        }
    }
    xml
}

/// Template data for the whole book.
pub fn build_data(book: &LogBook, style: &RunStyle) -> Scope {
    let logs: Vec<Scope> = book
        .days
        .iter()
        .map(|day| {
            let projects: Vec<Scope> = day
                .projects
                .iter()
                .map(|project| {
                    Scope::from([
                        ("name".to_string(), Value::from(project.name.as_str())),
                        ("xml_content".to_string(), Value::from(project_xml(project, style))),
                    ])
                })
                .collect();
            Scope::from([
                ("date".to_string(), Value::from(day.date.as_str())),
                ("projects".to_string(), Value::from(projects)),
            ])
        })
        .collect();
    Scope::from([("logs".to_string(), Value::from(logs))])
}

/// Renders `book` into a copy of the template package. Every other part of
/// the package is copied unchanged.
pub fn fill_template(template: &[u8], book: &LogBook, style: &RunStyle) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .map_err(|e| WorkLogError::Template(vec![format!("not a .docx package: {e}")]))?;

    let document = {
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| WorkLogError::Template(vec![format!("{DOCUMENT_PART} is missing")]))?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)?;
        xml
    };
    let rendered = Template::parse(&document)?.render(&build_data(book, style));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.name() == DOCUMENT_PART {
            drop(file);
            zip.start_file(DOCUMENT_PART, options)?;
            zip.write_all(rendered.as_bytes())?;
        } else {
            zip.raw_copy_file(file)?;
        }
    }
    let bytes = zip.finish()?.into_inner();
    info!(days = book.days.len(), bytes = bytes.len(), "report document generated");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::sample_book;

    const TEMPLATE_XML: &str = concat!(
        r#"<w:document><w:body>"#,
        r#"<w:p><w:r><w:t>{#logs}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{date}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{#projects}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{name}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{@xml_content}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{/projects}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{/logs}</w:t></w:r></w:p>"#,
        r#"</w:body></w:document>"#
    );

    fn docx(document_xml: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::<()>::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn document_of(bytes: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn project_paragraphs_are_numbered_per_level() {
        let book = sample_book();
        let xml = project_xml(&book.days[0].projects[0], &RunStyle::default());
        assert_eq!(xml.matches("<w:p>").count(), 6);
        assert!(xml.contains(">1).Survey <"));
        assert!(xml.contains(">north<"));
        assert!(xml.contains(">a.Piers<"));
        assert!(xml.contains(">i.P1<"));
        assert!(xml.contains(">ii.P2<"));
        assert!(xml.contains(">b.Deck<"));
        assert!(xml.contains(">2).Report<"));
        assert!(xml.contains(r#"<w:ind w:left="840" w:hanging="240"/>"#));
    }

    #[test]
    fn data_mirrors_days_and_projects() {
        let data = build_data(&sample_book(), &RunStyle::default());
        let Some(Value::List(logs)) = data.get("logs") else {
            panic!("logs missing");
        };
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].get("date"), Some(&Value::from("115.01.05")));
        let Some(Value::List(projects)) = logs[0].get("projects") else {
            panic!("projects missing");
        };
        assert_eq!(projects[1].get("name"), Some(&Value::from("Road")));
        assert_eq!(projects[1].get("xml_content"), Some(&Value::from("")));
    }

    #[test]
    fn fills_template_and_keeps_other_parts() {
        let out = fill_template(&docx(TEMPLATE_XML), &sample_book(), &RunStyle::default()).unwrap();
        let xml = document_of(&out);
        assert!(xml.contains("115.02.13"));
        assert!(xml.contains("115.01.05"));
        assert!(xml.contains(">1).Kickoff<"));
        assert!(!xml.contains("{#logs}"));
        assert!(!xml.contains("{@xml_content}"));

        let mut archive = ZipArchive::new(Cursor::new(out.as_slice())).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());
    }

    #[test]
    fn template_errors_surface_together() {
        let broken = r#"<w:body><w:p><w:r><w:t>{#logs}</w:t></w:r></w:p></w:body>"#;
        let err = fill_template(&docx(broken), &sample_book(), &RunStyle::default()).unwrap_err();
        assert!(matches!(err, WorkLogError::Template(ref e) if e.len() == 1));
    }

    #[test]
    fn non_docx_input_is_rejected() {
        let err = fill_template(b"plain text", &sample_book(), &RunStyle::default()).unwrap_err();
        assert!(matches!(err, WorkLogError::Template(_)));
    }
}
