use crate::{
    Config,
    cloud::{CloudClient, RemoteEndpoint, RemoteFile, RemoteSettings, UploadedImage, upload_file_name},
    dates::{MonthFilter, RocDate, default_new_day_date},
    document::fill_template,
    error::{Result, WorkLogError},
    images::compress_image,
    markup::{TagStyle, wrap_selection},
    model::{Day, ImageRef, LogBook, NodePath},
    storage::{FileStore, KeyValueStore, LOG_KEY, SETTINGS_KEY},
    transform::{book_from_sheet, to_sheet},
    view::{ReportFilter, generate_report},
    workbook::{read_workbook, write_workbook},
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;
use tracing::{info, warn};

/// Where an attached image ended up.
#[derive(Debug)]
pub enum ImageUpload {
    /// The node now points at the remote copy.
    Remote(UploadedImage),
    /// The node keeps the compressed local preview; the upload was skipped or failed.
    LocalOnly(WorkLogError),
}

#[derive(Debug)]
pub struct AttachedImage {
    pub upload: ImageUpload,
    /// Remote id of the image this one replaced. Nothing deletes it yet.
    pub replaced: Option<String>,
}

/// Outcome of deleting a batch of remote files. One failure never stops the rest.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, WorkLogError)>,
}

impl ReleaseReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The work log, its remote settings and the store both are persisted in.
///
/// Mutations only touch memory; call [`WorkLog::save`] to persist them.
pub struct WorkLog<S: KeyValueStore = FileStore> {
    pub config: Config,
    pub book: LogBook,
    pub settings: RemoteSettings,
    store: S,
}

impl WorkLog<FileStore> {
    /// Loads configuration from the standard paths and opens the stored log.
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::load()?;
        Self::with_config(config)
    }

    /// Opens the log kept under `config.data_dir`, creating the directory if needed.
    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self::open(config, store)?)
    }
}

impl<S: KeyValueStore> WorkLog<S> {
    /// Reads the log and settings from `store`.
    ///
    /// A missing log starts with one new day. A stored log that cannot be
    /// parsed is logged and replaced by an empty one.
    pub fn open(config: Config, store: S) -> Result<Self> {
        let stored = load_or_default::<LogBook>(&store, LOG_KEY)?;
        let settings = load_or_default::<RemoteSettings>(&store, SETTINGS_KEY)?.unwrap_or_default();
        let missing = stored.is_none();
        let mut work_log = Self {
            config,
            book: stored.unwrap_or_default(),
            settings,
            store,
        };
        if missing {
            work_log.add_new_day(None, MonthFilter::All);
        }
        Ok(work_log)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.book)?;
        self.store.set(LOG_KEY, &json)?;
        info!(days = self.book.days.len(), "work log saved");
        Ok(())
    }

    pub fn save_settings(&self) -> Result<()> {
        let json = serde_json::to_string(&self.settings)?;
        self.store.set(SETTINGS_KEY, &json)?;
        info!("remote settings saved");
        Ok(())
    }

    /// Prepends an empty day dated for the viewed month, or today when the
    /// view is the current month or unset.
    pub fn add_new_day(&mut self, view_year: Option<i32>, month: MonthFilter) -> NodePath {
        let date = default_new_day_date(self.config.reference_date, view_year, month);
        self.add_day(date)
    }

    /// Prepends an empty day with the given date.
    pub fn add_day(&mut self, date: RocDate) -> NodePath {
        self.book.days.insert(0, Day::new(date.to_string()));
        NodePath::Day { day: 0 }
    }

    /// Empties the log, drops it from the store, and starts over with one new day.
    pub fn clear(&mut self) -> Result<()> {
        self.book = LogBook::default();
        self.store.remove(LOG_KEY)?;
        self.add_new_day(None, MonthFilter::All);
        info!("work log cleared");
        Ok(())
    }

    /// Swaps in `book` and returns the remote image ids only the old book referenced.
    pub fn replace_book(&mut self, book: LogBook) -> Vec<String> {
        let kept: HashSet<String> = book.drive_ids().into_iter().collect();
        let mut seen = HashSet::new();
        let released = self
            .book
            .drive_ids()
            .into_iter()
            .filter(|id| !kept.contains(id) && seen.insert(id.clone()))
            .collect();
        self.book = book;
        released
    }

    /// Replaces the log with the contents of an xlsx workbook. Returns the
    /// remote image ids no longer referenced. On a parse error the log is untouched.
    pub fn import_workbook(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        let rows = read_workbook(bytes)?;
        let book = book_from_sheet(&rows);
        info!(rows = rows.len().saturating_sub(1), days = book.days.len(), "workbook imported");
        Ok(self.replace_book(book))
    }

    pub fn export_workbook(&self) -> Result<Vec<u8>> {
        let bytes = write_workbook(&self.config.sheet_name, &to_sheet(&self.book))?;
        info!(days = self.book.days.len(), bytes = bytes.len(), "workbook exported");
        Ok(bytes)
    }

    pub fn export_file_name(&self) -> String {
        format!(
            "{}_{}.xlsx",
            self.config.export_prefix,
            self.config.reference_date.format("%Y-%m-%d")
        )
    }

    pub fn report_file_name(&self) -> String {
        format!(
            "{}_{}.docx",
            self.config.report_prefix,
            self.config.reference_date.format("%Y-%m-%d")
        )
    }

    /// Fills `template` with the whole log, or with the report selected by `report`.
    pub fn generate_document(
        &self,
        template: Option<&[u8]>,
        report: Option<&ReportFilter>,
    ) -> Result<Vec<u8>> {
        let template = template.ok_or(WorkLogError::MissingTemplate)?;
        let book = match report {
            Some(filter) => Cow::Owned(generate_report(&self.book, filter)?),
            None => Cow::Borrowed(&self.book),
        };
        fill_template(template, &book, &self.config.document_style)
    }

    /// Wraps the character range `selection` of the node's text in `style` tags.
    pub fn apply_markup(
        &mut self,
        path: NodePath,
        selection: Range<usize>,
        style: TagStyle,
    ) -> Result<()> {
        let wrapped = wrap_selection(self.book.text(path)?, selection, style)?;
        self.book.set_text(path, wrapped)
    }

    /// Compresses `bytes` into the node's image slot and uploads it.
    ///
    /// The compressed preview is stored first and kept when the settings are
    /// incomplete or the upload fails; only invalid paths and undecodable
    /// images are errors.
    pub async fn attach_image<E: RemoteEndpoint>(
        &mut self,
        endpoint: &E,
        path: NodePath,
        bytes: &[u8],
    ) -> Result<AttachedImage> {
        self.book.image(path)?;
        let data_uri = compress_image(bytes)?;

        let slot = self.book.image_mut(path)?;
        let replaced = slot.take_drive_id();
        *slot = ImageRef::local(data_uri.as_str());

        if let Err(e) = self.settings.require_storage() {
            return Ok(AttachedImage {
                upload: ImageUpload::LocalOnly(e),
                replaced,
            });
        }

        let client = CloudClient::new(endpoint, &self.settings);
        let file_name = upload_file_name(Utc::now().timestamp_millis());
        let upload = match client.upload_image(&data_uri, file_name).await {
            Ok(uploaded) => {
                *self.book.image_mut(path)? = ImageRef::new(&uploaded.url, &uploaded.id);
                info!(%path, id = %uploaded.id, "image uploaded");
                ImageUpload::Remote(uploaded)
            }
            Err(e) => {
                warn!(%path, error = %e, "image upload failed, keeping local preview");
                ImageUpload::LocalOnly(e)
            }
        };
        Ok(AttachedImage { upload, replaced })
    }

    /// Clears the node's image and deletes its remote copy when there is one
    /// and the settings allow it. Returns the remote failure, if any; the
    /// local reference is cleared either way.
    pub async fn remove_image<E: RemoteEndpoint>(
        &mut self,
        endpoint: &E,
        path: NodePath,
    ) -> Result<Option<WorkLogError>> {
        let drive_id = self.book.image(path)?.drive_id.clone();
        let mut failure = None;
        if !drive_id.is_empty() && self.settings.require_sync().is_ok() {
            let client = CloudClient::new(endpoint, &self.settings);
            if let Err(e) = client.delete_image(&drive_id).await {
                warn!(%path, id = %drive_id, error = %e, "remote delete failed, clearing local image anyway");
                failure = Some(e);
            }
        }
        self.book.image_mut(path)?.take_drive_id();
        Ok(failure)
    }

    /// Deletes each remote file in `ids`, one request at a time.
    pub async fn release_images<E: RemoteEndpoint>(
        &self,
        endpoint: &E,
        ids: &[String],
    ) -> Result<ReleaseReport> {
        self.settings.require_sync()?;
        let client = CloudClient::new(endpoint, &self.settings);
        let mut report = ReleaseReport::default();
        for id in ids {
            match client.delete_image(id).await {
                Ok(()) => report.deleted.push(id.clone()),
                Err(e) => {
                    warn!(%id, error = %e, "remote delete failed");
                    report.failed.push((id.clone(), e));
                }
            }
        }
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "remote images released"
        );
        Ok(report)
    }

    /// Remote files the log no longer references.
    pub async fn find_orphans<E: RemoteEndpoint>(&self, endpoint: &E) -> Result<Vec<RemoteFile>> {
        let remote = CloudClient::new(endpoint, &self.settings).list_files().await?;
        let local: HashSet<String> = self.book.drive_ids().into_iter().collect();
        let orphans: Vec<RemoteFile> = remote
            .into_iter()
            .filter(|file| !local.contains(&file.id))
            .collect();
        info!(orphans = orphans.len(), "remote folder compared");
        Ok(orphans)
    }

    pub async fn delete_files<E: RemoteEndpoint>(
        &self,
        endpoint: &E,
        files: &[RemoteFile],
    ) -> Result<ReleaseReport> {
        let ids: Vec<String> = files.iter().map(|file| file.id.clone()).collect();
        self.release_images(endpoint, &ids).await
    }

    /// Uploads the whole log.
    pub async fn push<E: RemoteEndpoint>(&self, endpoint: &E) -> Result<()> {
        CloudClient::new(endpoint, &self.settings)
            .sync_upload(&self.book)
            .await?;
        info!(days = self.book.days.len(), "work log pushed");
        Ok(())
    }

    /// Replaces the log with the remote copy. Returns the remote image ids
    /// only the replaced log referenced. On any failure the log is kept.
    pub async fn pull<E: RemoteEndpoint>(&mut self, endpoint: &E) -> Result<Vec<String>> {
        let book = CloudClient::new(endpoint, &self.settings)
            .sync_download()
            .await?;
        info!(days = book.days.len(), "work log pulled");
        Ok(self.replace_book(book))
    }
}

/// `Ok(None)` when the key is absent; unparsable values are logged and
/// read as the type's default.
fn load_or_default<T: DeserializeOwned + Default>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "stored value is unreadable, starting empty");
            Ok(Some(T::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, Project};
    use crate::tests::common::{MemoryStore, MockEndpoint, full_settings, mk_config, sample_book};
    use chrono::NaiveDate;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 13).unwrap()
    }

    fn mk_work_log(book: LogBook, settings: RemoteSettings) -> WorkLog<MemoryStore> {
        let store = MemoryStore::default();
        store.set(LOG_KEY, &serde_json::to_string(&book).unwrap()).unwrap();
        store.set(SETTINGS_KEY, &serde_json::to_string(&settings).unwrap()).unwrap();
        WorkLog::open(mk_config(std::env::temp_dir(), Some(today())), store).unwrap()
    }

    fn png() -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, image::Rgb([10, 20, 30])))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn item_path() -> NodePath {
        "0.0.0".parse().unwrap()
    }

    #[test]
    fn fresh_store_starts_with_one_day_for_today() {
        let work_log =
            WorkLog::open(mk_config(std::env::temp_dir(), Some(today())), MemoryStore::default())
                .unwrap();
        assert_eq!(work_log.book.days.len(), 1);
        assert_eq!(work_log.book.days[0].date, "115.02.13");
        assert_eq!(work_log.settings, RemoteSettings::default());
    }

    #[test]
    fn unreadable_log_starts_empty() {
        let store = MemoryStore::default();
        store.set(LOG_KEY, "{not json").unwrap();
        let work_log = WorkLog::open(mk_config(std::env::temp_dir(), Some(today())), store).unwrap();
        assert!(work_log.book.is_empty());
    }

    #[test]
    fn save_and_reopen_with_file_store() {
        let tmp = tempdir().unwrap();
        let config = mk_config(tmp.path().join("data"), Some(today()));

        let mut work_log = WorkLog::with_config(config.clone()).unwrap();
        work_log.book = sample_book();
        work_log.settings = full_settings();
        work_log.save().unwrap();
        work_log.save_settings().unwrap();

        let reopened = WorkLog::with_config(config).unwrap();
        assert_eq!(reopened.book, sample_book());
        assert_eq!(reopened.settings, full_settings());
        assert!(reopened.store().path_for(LOG_KEY).exists());
    }

    #[test]
    fn new_day_follows_the_viewed_month() {
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        work_log.add_new_day(Some(2025), MonthFilter::Month(11));
        assert_eq!(work_log.book.days[0].date, "114.11.01");
        assert!(work_log.book.days[0].projects.is_empty());

        work_log.add_new_day(Some(2026), MonthFilter::Month(2));
        assert_eq!(work_log.book.days[0].date, "115.02.13");
        assert_eq!(work_log.book.days.len(), 4);
    }

    #[test]
    fn clear_leaves_one_new_day_and_drops_the_stored_log() {
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        work_log.clear().unwrap();
        assert_eq!(work_log.book.days.len(), 1);
        assert_eq!(work_log.store().get(LOG_KEY).unwrap(), None);
    }

    #[test]
    fn replace_book_reports_only_dropped_ids() {
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        let mut next = sample_book();
        next.days.remove(1);
        let released = work_log.replace_book(next.clone());
        assert_eq!(released, ["older-img"]);
        assert_eq!(work_log.book, next);
    }

    #[test]
    fn workbook_export_then_import_keeps_the_log() {
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        let bytes = work_log.export_workbook().unwrap();
        let released = work_log.import_workbook(&bytes).unwrap();
        assert!(released.is_empty());
        assert_eq!(work_log.book, sample_book());
        assert_eq!(work_log.export_file_name(), "工作日誌資料庫_2026-02-13.xlsx");
        assert_eq!(work_log.report_file_name(), "工作日誌彙整_2026-02-13.docx");
    }

    #[test]
    fn bad_workbook_leaves_the_log_untouched() {
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        assert!(matches!(
            work_log.import_workbook(b"nope"),
            Err(WorkLogError::Workbook(_))
        ));
        assert_eq!(work_log.book, sample_book());
    }

    #[test]
    fn document_needs_a_template() {
        let work_log = mk_work_log(sample_book(), RemoteSettings::default());
        assert!(matches!(
            work_log.generate_document(None, None),
            Err(WorkLogError::MissingTemplate)
        ));
    }

    #[test]
    fn markup_wraps_the_selected_characters() {
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        let path: NodePath = "0.0.0.1".parse().unwrap();
        work_log.apply_markup(path, 0..4, TagStyle::Red).unwrap();
        assert_eq!(work_log.book.text(path).unwrap(), "((Deck))");

        let err = work_log.apply_markup(path, 2..2, TagStyle::Highlight).unwrap_err();
        assert!(matches!(err, WorkLogError::EmptySelection));
        assert_eq!(work_log.book.text(path).unwrap(), "((Deck))");
    }

    #[tokio::test]
    async fn attach_uploads_and_reports_the_replaced_id() {
        let endpoint = MockEndpoint::new().respond(
            "uploadImage",
            json!({"success": true, "url": "https://drive/new", "id": "new-img"}),
        );
        let mut work_log = mk_work_log(sample_book(), full_settings());

        let attached = work_log.attach_image(&endpoint, item_path(), &png()).await.unwrap();
        assert!(matches!(attached.upload, ImageUpload::Remote(_)));
        assert_eq!(attached.replaced.as_deref(), Some("item-img"));
        assert_eq!(
            work_log.book.image(item_path()).unwrap(),
            &ImageRef::new("https://drive/new", "new-img")
        );
        let sent = endpoint.requests();
        assert!(sent[0]["base64"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn attach_without_settings_keeps_the_preview() {
        let endpoint = MockEndpoint::new();
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        let path: NodePath = "0.0.1".parse().unwrap();

        let attached = work_log.attach_image(&endpoint, path, &png()).await.unwrap();
        assert!(matches!(
            attached.upload,
            ImageUpload::LocalOnly(WorkLogError::MissingSetting(_))
        ));
        assert_eq!(attached.replaced, None);
        assert!(work_log.book.image(path).unwrap().is_local_preview());
        assert!(endpoint.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_keeps_the_preview() {
        let endpoint = MockEndpoint::new()
            .respond("uploadImage", json!({"success": false, "message": "quota"}));
        let mut work_log = mk_work_log(sample_book(), full_settings());
        let attached = work_log.attach_image(&endpoint, item_path(), &png()).await.unwrap();
        assert!(matches!(attached.upload, ImageUpload::LocalOnly(WorkLogError::Remote { .. })));
        assert!(work_log.book.image(item_path()).unwrap().is_local_preview());
    }

    #[tokio::test]
    async fn attach_rejects_project_paths_before_compressing() {
        let endpoint = MockEndpoint::new();
        let mut work_log = mk_work_log(sample_book(), full_settings());
        let err = work_log
            .attach_image(&endpoint, "0.0".parse().unwrap(), b"not an image")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkLogError::NotImageNode(_)));
    }

    #[tokio::test]
    async fn failed_remote_delete_still_clears_the_image() {
        let endpoint = MockEndpoint::new()
            .respond("deleteImage", json!({"success": true}))
            .fail_on("item-img");
        let mut work_log = mk_work_log(sample_book(), full_settings());

        let failure = work_log.remove_image(&endpoint, item_path()).await.unwrap();
        assert!(failure.is_some());
        assert!(work_log.book.image(item_path()).unwrap().is_empty());
        assert_eq!(endpoint.requests()[0]["fileId"], "item-img");
    }

    #[tokio::test]
    async fn remove_image_without_settings_is_local_only() {
        let endpoint = MockEndpoint::new();
        let mut work_log = mk_work_log(sample_book(), RemoteSettings::default());
        let failure = work_log.remove_image(&endpoint, item_path()).await.unwrap();
        assert!(failure.is_none());
        assert!(work_log.book.image(item_path()).unwrap().is_empty());
        assert!(endpoint.requests().is_empty());
    }

    #[tokio::test]
    async fn release_continues_after_a_failure() {
        let endpoint = MockEndpoint::new()
            .respond("deleteImage", json!({"success": true}))
            .fail_on("b");
        let work_log = mk_work_log(sample_book(), full_settings());
        let ids = ["a", "b", "c"].map(String::from);

        let report = work_log.release_images(&endpoint, &ids).await.unwrap();
        assert_eq!(report.deleted, ["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn orphans_are_remote_ids_missing_from_the_log() {
        let endpoint = MockEndpoint::new().respond(
            "listFiles",
            json!({"success": true, "files": [
                {"id": "item-img"}, {"id": "stray-1", "name": "img_1.jpg"},
                {"id": "older-img"}, {"id": "stray-2"}
            ]}),
        );
        let work_log = mk_work_log(sample_book(), full_settings());
        let orphans = work_log.find_orphans(&endpoint).await.unwrap();
        let ids: Vec<&str> = orphans.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["stray-1", "stray-2"]);
    }

    #[tokio::test]
    async fn pull_replaces_the_log_and_reports_dropped_images() {
        let remote = LogBook::new(vec![Day::new("115.03.01").with_projects(vec![
            Project::new("Bridge").with_items(vec![Item::new("Pour")]),
        ])]);
        let endpoint =
            MockEndpoint::new().respond("syncDownload", serde_json::to_value(&remote).unwrap());
        let mut work_log = mk_work_log(sample_book(), full_settings());

        let mut released = work_log.pull(&endpoint).await.unwrap();
        released.sort();
        assert_eq!(released, ["item-img", "older-img", "subsub-img"]);
        assert_eq!(work_log.book, remote);
    }

    #[tokio::test]
    async fn bad_pull_keeps_the_log() {
        let endpoint = MockEndpoint::new().respond("syncDownload", json!({"error": "denied"}));
        let mut work_log = mk_work_log(sample_book(), full_settings());
        assert!(work_log.pull(&endpoint).await.is_err());
        assert_eq!(work_log.book, sample_book());
    }

    #[tokio::test]
    async fn push_sends_the_log() {
        let endpoint = MockEndpoint::new().respond("syncUpload", json!({"result": "Success"}));
        let work_log = mk_work_log(sample_book(), full_settings());
        work_log.push(&endpoint).await.unwrap();
        assert_eq!(
            endpoint.requests()[0]["data"],
            serde_json::to_value(sample_book()).unwrap()
        );
    }
}
