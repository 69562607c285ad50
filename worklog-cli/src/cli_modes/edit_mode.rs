use super::WorkLogCli;
use crate::cli::MarkArgs;
use crate::common::{edit_text, resolve_editor};
use anyhow::{Result, bail};
use std::ops::Range;
use worklog_core::{Direction, MonthFilter, NodePath, RocDate};

impl WorkLogCli {
    pub(super) fn new_day(
        &mut self,
        date: Option<RocDate>,
        year: Option<i32>,
        month: Option<MonthFilter>,
    ) -> Result<()> {
        let path = match date {
            Some(date) => self.work_log.add_day(date),
            None => self
                .work_log
                .add_new_day(year, month.unwrap_or_default()),
        };
        self.save()?;
        let date = self.work_log.book.text(path)?;
        self.renderer
            .print_info(&format!("Added day {date} at [{path}]"));
        Ok(())
    }

    pub(super) fn add(&mut self, parent: NodePath, text: &[String]) -> Result<()> {
        let path = self.work_log.book.add_child(parent)?;
        if !text.is_empty() {
            self.work_log.book.set_text(path, text.join(" "))?;
        }
        self.save()?;
        self.renderer.print_info(&format!("Added [{path}]"));
        Ok(())
    }

    pub(super) fn set(&mut self, path: NodePath, text: &str) -> Result<()> {
        let text = match path {
            NodePath::Day { .. } => RocDate::from_user_input(text)?.to_string(),
            _ => text.to_string(),
        };
        self.work_log.book.set_text(path, text)?;
        self.save()?;
        self.renderer.print_info(&format!("Updated [{path}]"));
        Ok(())
    }

    pub(super) fn edit(&mut self, path: NodePath) -> Result<()> {
        let current = self.work_log.book.text(path)?.to_string();
        let editor = resolve_editor(&self.work_log.config.editor);
        let edited = edit_text(&editor, &current)?;
        if edited == current {
            self.renderer.print_info("No changes.");
            return Ok(());
        }
        self.set(path, &edited)
    }

    pub(super) fn mark(&mut self, args: &MarkArgs) -> Result<()> {
        let selection = match (&args.text, args.start, args.end) {
            (Some(needle), _, _) => {
                let text = self.work_log.book.text(args.path)?;
                match find_chars(text, needle) {
                    Some(range) => range,
                    None => bail!("'{needle}' does not occur in [{}]", args.path),
                }
            }
            (None, Some(start), Some(end)) => start..end,
            _ => bail!("give --text or both --start and --end"),
        };
        self.work_log.apply_markup(args.path, selection, args.style)?;
        self.save()?;
        self.renderer.print_info(&format!(
            "[{}] {}",
            args.path,
            self.work_log.book.text(args.path)?
        ));
        Ok(())
    }

    pub(super) fn move_node(&mut self, path: NodePath, direction: Direction) -> Result<()> {
        if !self.work_log.book.move_node(path, direction)? {
            self.renderer
                .print_info(&format!("[{path}] is already at the edge."));
            return Ok(());
        }
        self.save()?;
        let index = match direction {
            Direction::Up => path.index() - 1,
            Direction::Down => path.index() + 1,
        };
        self.renderer
            .print_info(&format!("Moved to [{}]", path.with_index(index)));
        Ok(())
    }

    pub(super) async fn remove(&mut self, path: NodePath, keep_images: bool) -> Result<()> {
        let released = self.work_log.book.remove_node(path)?;
        self.save()?;
        self.renderer.print_info(&format!("Removed [{path}]"));
        self.release(&released, keep_images).await
    }

    pub(super) fn copy_from(&mut self, day: usize, source_date: &str) -> Result<()> {
        let source = RocDate::from_user_input(source_date)?.to_string();
        if !self.work_log.book.copy_projects_from(day, &source)? {
            bail!("no day dated {source}");
        }
        self.save()?;
        self.renderer
            .print_info(&format!("Copied the projects of {source} into [{day}]"));
        Ok(())
    }

    pub(super) fn sort(&mut self) -> Result<()> {
        self.work_log.book.sort_by_date_desc();
        self.save()?;
        self.renderer.print_info("Days sorted, newest first.");
        Ok(())
    }

    pub(super) fn clear(&mut self, yes: bool) -> Result<()> {
        if !yes {
            bail!(
                "this deletes all {} days; run again with --yes to confirm",
                self.work_log.book.days.len()
            );
        }
        self.work_log.clear()?;
        self.save()?;
        self.renderer.print_info("Log cleared.");
        Ok(())
    }
}

/// Character range of the first occurrence of `needle` in `text`.
fn find_chars(text: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    let byte = text.find(needle)?;
    let start = text[..byte].chars().count();
    Some(start..start + needle.chars().count())
}
