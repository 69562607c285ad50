use super::WorkLogCli;
use crate::cli::{ExportFormat, ImportFormat};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use worklog_core::{ReportFilter, preview::render_page};

impl WorkLogCli {
    pub(super) fn export(&self, format: ExportFormat) -> Result<()> {
        match format {
            ExportFormat::Xlsx { out } => {
                let bytes = self.work_log.export_workbook()?;
                let out = out.unwrap_or_else(|| PathBuf::from(self.work_log.export_file_name()));
                self.write_output(&out, &bytes)
            }
            ExportFormat::Docx {
                template,
                project,
                from,
                to,
                out,
            } => {
                let template = template
                    .map(|path| {
                        fs::read(&path).with_context(|| format!("reading {}", path.display()))
                    })
                    .transpose()?;
                let filter = project.map(|project| ReportFilter {
                    project,
                    start: from.map(|date| date.to_string()),
                    end: to.map(|date| date.to_string()),
                });
                let bytes = self
                    .work_log
                    .generate_document(template.as_deref(), filter.as_ref())?;
                let out = out.unwrap_or_else(|| PathBuf::from(self.work_log.report_file_name()));
                self.write_output(&out, &bytes)
            }
            ExportFormat::Html { out, title } => {
                let page = render_page(&title, &self.work_log.book);
                let out = out.unwrap_or_else(|| {
                    PathBuf::from(self.work_log.export_file_name()).with_extension("html")
                });
                self.write_output(&out, page.as_bytes())
            }
            ExportFormat::Json { out } => {
                let json = serde_json::to_string_pretty(&self.work_log.book)?;
                match out {
                    Some(out) => self.write_output(&out, json.as_bytes()),
                    None => {
                        println!("{json}");
                        Ok(())
                    }
                }
            }
        }
    }

    pub(super) async fn import(&mut self, format: ImportFormat) -> Result<()> {
        match format {
            ImportFormat::Xlsx { file, keep_images } => {
                let bytes =
                    fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
                let released = self.work_log.import_workbook(&bytes)?;
                self.save()?;
                self.renderer.print_info(&format!(
                    "Imported {} days from {}",
                    self.work_log.book.days.len(),
                    file.display()
                ));
                self.release(&released, keep_images).await
            }
        }
    }

    fn write_output(&self, out: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(out, bytes).with_context(|| format!("writing {}", out.display()))?;
        self.renderer
            .print_info(&format!("Wrote {}", out.display()));
        Ok(())
    }
}
