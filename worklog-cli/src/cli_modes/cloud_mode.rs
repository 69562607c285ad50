use super::WorkLogCli;
use anyhow::{Context, Result};
use std::{fs, path::Path};
use worklog_core::{ImageUpload, NodePath};

impl WorkLogCli {
    pub(super) async fn attach_image(
        &mut self,
        path: NodePath,
        file: &Path,
        keep_images: bool,
    ) -> Result<()> {
        let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
        let endpoint = self.endpoint()?;
        let attached = self.work_log.attach_image(&endpoint, path, &bytes).await?;
        self.save()?;
        match &attached.upload {
            ImageUpload::Remote(uploaded) => self
                .renderer
                .print_info(&format!("Uploaded image {} for [{path}]", uploaded.id)),
            ImageUpload::LocalOnly(e) => self.renderer.print_warning(&format!(
                "image kept locally for [{path}], not uploaded: {e}"
            )),
        }
        let replaced: Vec<String> = attached.replaced.into_iter().collect();
        self.release(&replaced, keep_images).await
    }

    pub(super) async fn remove_image(&mut self, path: NodePath) -> Result<()> {
        let endpoint = self.endpoint()?;
        let failure = self.work_log.remove_image(&endpoint, path).await?;
        self.save()?;
        if let Some(e) = failure {
            self.renderer
                .print_warning(&format!("remote copy could not be deleted: {e}"));
        }
        self.renderer
            .print_info(&format!("Removed the image of [{path}]"));
        Ok(())
    }

    pub(super) async fn push(&self) -> Result<()> {
        self.work_log.push(&self.endpoint()?).await?;
        self.renderer.print_info(&format!(
            "Uploaded {} days.",
            self.work_log.book.days.len()
        ));
        Ok(())
    }

    pub(super) async fn pull(&mut self, keep_images: bool) -> Result<()> {
        let endpoint = self.endpoint()?;
        let released = self.work_log.pull(&endpoint).await?;
        self.save()?;
        self.renderer.print_info(&format!(
            "Downloaded {} days.",
            self.work_log.book.days.len()
        ));
        self.release(&released, keep_images).await
    }

    pub(super) async fn clean(&self, yes: bool) -> Result<()> {
        self.work_log.settings.require_storage()?;
        let endpoint = self.endpoint()?;
        let orphans = self.work_log.find_orphans(&endpoint).await?;
        if orphans.is_empty() {
            self.renderer.print_info("No unused remote images.");
            return Ok(());
        }
        let names: Vec<String> = orphans
            .iter()
            .map(|file| match file.name() {
                Some(name) => format!("{} ({name})", file.id),
                None => file.id.clone(),
            })
            .collect();
        self.renderer.print_list(&names);
        if !yes {
            self.renderer.print_info(&format!(
                "{} unused remote images. Run again with --yes to delete them.",
                orphans.len()
            ));
            return Ok(());
        }
        let report = self.work_log.delete_files(&endpoint, &orphans).await?;
        for (id, e) in &report.failed {
            self.renderer
                .print_warning(&format!("could not delete remote image {id}: {e}"));
        }
        self.renderer.print_info(&format!(
            "Deleted {} of {} unused remote images.",
            report.deleted.len(),
            orphans.len()
        ));
        Ok(())
    }

    pub(super) fn show_settings(&self) -> Result<()> {
        let settings = &self.work_log.settings;
        let lines = [
            format!("script URL: {}", or_unset(&settings.script_url)),
            format!("token:      {}", mask(&settings.token)),
            format!("folder id:  {}", or_unset(&settings.folder_id)),
        ];
        self.renderer.print_list(&lines);
        Ok(())
    }

    pub(super) fn set_settings(
        &mut self,
        script_url: Option<String>,
        token: Option<String>,
        folder_id: Option<String>,
    ) -> Result<()> {
        let settings = &mut self.work_log.settings;
        if let Some(script_url) = script_url {
            settings.script_url = script_url.trim().to_string();
        }
        if let Some(token) = token {
            settings.token = token.trim().to_string();
        }
        if let Some(folder_id) = folder_id {
            settings.folder_id = folder_id.trim().to_string();
        }
        self.work_log.save_settings()?;
        self.show_settings()
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

/// Shows the last four characters of a secret.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().skip(count.saturating_sub(4)).collect();
    if count <= 4 {
        "*".repeat(count)
    } else {
        format!("{}{visible}", "*".repeat(count - 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_the_tail() {
        assert_eq!(mask(""), "(not set)");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("secret-token"), "********oken");
    }
}
