mod cloud_mode;
mod edit_mode;
mod read_mode;
mod transfer_mode;

use crate::cli::{Command, ConfigAction, ImageAction, SyncAction};
use crate::render::Renderer;
use anyhow::Result;
use worklog_core::{HttpEndpoint, WorkLog};

pub struct WorkLogCli {
    renderer: Renderer,
    work_log: WorkLog,
}

impl WorkLogCli {
    pub fn new(renderer: Renderer, work_log: WorkLog) -> Self {
        Self { renderer, work_log }
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Path => self.print_path(),
            Command::Show(args) => self.show(&args),
            Command::New { date, year, month } => self.new_day(date, year, month),
            Command::Add { parent, text } => self.add(parent, &text),
            Command::Set { path, text } => self.set(path, &text.join(" ")),
            Command::Edit { path } => self.edit(path),
            Command::Mark(args) => self.mark(&args),
            Command::Move { path, direction } => self.move_node(path, direction),
            Command::Remove { path, keep_images } => self.remove(path, keep_images).await,
            Command::CopyFrom { day, source_date } => self.copy_from(day, &source_date),
            Command::Sort => self.sort(),
            Command::Clear { yes } => self.clear(yes),
            Command::Report { filter, html } => self.report(&filter, html.as_deref()),
            Command::Export { format } => self.export(format),
            Command::Import { format } => self.import(format).await,
            Command::Image { action } => match action {
                ImageAction::Attach {
                    path,
                    file,
                    keep_images,
                } => self.attach_image(path, &file, keep_images).await,
                ImageAction::Remove { path } => self.remove_image(path).await,
            },
            Command::Sync { action } => match action {
                SyncAction::Push => self.push().await,
                SyncAction::Pull { keep_images } => self.pull(keep_images).await,
                SyncAction::Clean { yes } => self.clean(yes).await,
            },
            Command::Config { action } => match action {
                ConfigAction::Show => self.show_settings(),
                ConfigAction::Set {
                    script_url,
                    token,
                    folder_id,
                } => self.set_settings(script_url, token, folder_id),
            },
        }
    }

    fn save(&self) -> Result<()> {
        self.work_log.save()?;
        Ok(())
    }

    fn endpoint(&self) -> Result<HttpEndpoint> {
        Ok(HttpEndpoint::new(self.work_log.settings.script_url.trim())?)
    }

    /// Deletes remote images the log stopped referencing, unless `keep` is set.
    /// Failures are reported but never undo the local change.
    async fn release(&self, ids: &[String], keep: bool) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        if keep {
            self.renderer
                .print_info(&format!("Kept {} remote images.", ids.len()));
            return Ok(());
        }
        if let Err(e) = self.work_log.settings.require_sync() {
            self.renderer.print_warning(&format!(
                "{} remote images were left in place: {e}",
                ids.len()
            ));
            return Ok(());
        }
        let report = self.work_log.release_images(&self.endpoint()?, ids).await?;
        for (id, e) in &report.failed {
            self.renderer
                .print_warning(&format!("could not delete remote image {id}: {e}"));
        }
        if !report.deleted.is_empty() {
            self.renderer
                .print_info(&format!("Deleted {} remote images.", report.deleted.len()));
        }
        Ok(())
    }
}
