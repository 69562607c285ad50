use super::WorkLogCli;
use crate::cli::{ReportArgs, ShowArgs};
use anyhow::{Context, Result};
use chrono::Datelike;
use std::{fs, path::Path};
use worklog_core::{
    ViewFilter,
    preview::render_page,
    view::{generate_report, unique_project_names, visible_days, year_list},
};

impl WorkLogCli {
    pub(super) fn print_path(&self) -> Result<()> {
        self.renderer
            .print_info(&format!("{}", self.work_log.config.data_dir.display()));
        Ok(())
    }

    pub(super) fn show(&self, args: &ShowArgs) -> Result<()> {
        let book = &self.work_log.book;
        if args.projects {
            self.renderer.print_list(&unique_project_names(book));
            return Ok(());
        }
        if args.years {
            let years: Vec<String> = year_list(book, self.work_log.config.reference_date)
                .iter()
                .map(i32::to_string)
                .collect();
            self.renderer.print_list(&years);
            return Ok(());
        }

        let year = args.year.or_else(|| {
            args.month
                .map(|_| self.work_log.config.reference_date.year())
        });
        let filter = ViewFilter {
            search: args.search.clone(),
            year,
            month: args.month.unwrap_or_default(),
        };
        let days = visible_days(book, &filter);
        if days.is_empty() {
            self.renderer.print_info("No days found.");
            return Ok(());
        }
        if filter != ViewFilter::default() {
            self.renderer
                .print_info(&format!("{} of {} days shown.", days.len(), book.days.len()));
        }
        self.renderer.print_days(&days, args.search.as_deref());
        Ok(())
    }

    pub(super) fn report(&self, args: &ReportArgs, html: Option<&Path>) -> Result<()> {
        let report = generate_report(&self.work_log.book, &args.to_filter())?;
        if report.is_empty() {
            self.renderer
                .print_info(&format!("No entries found for {}.", args.project));
            return Ok(());
        }
        match html {
            Some(path) => {
                let page = render_page(&args.project, &report);
                fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
                self.renderer.print_info(&format!(
                    "Wrote {} days of {} to {}",
                    report.days.len(),
                    args.project,
                    path.display()
                ));
            }
            None => {
                self.renderer
                    .print_info(&format!("{} days found.", report.days.len()));
                self.renderer.print_report(&report.days);
            }
        }
        Ok(())
    }
}
