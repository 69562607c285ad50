use crate::{
    Config,
    cloud::{RemoteEndpoint, RemoteRequest, RemoteSettings},
    error::{Result, WorkLogError},
    markup::RunStyle,
    model::{Day, ImageRef, Item, LogBook, Project, Sub, SubSub},
    storage::KeyValueStore,
};
use chrono::{Local, NaiveDate};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Test helper to create a default `Config` for testing purposes.
///
/// This is the single source of truth for test configuration.
/// If you add a field to `Config`, you only need to update it here.
pub fn mk_config(tmp_dir: PathBuf, reference_date: Option<NaiveDate>) -> Config {
    Config {
        data_dir: tmp_dir,
        editor: None,
        reference_date: reference_date.unwrap_or(Local::now().date_naive()),
        export_prefix: "工作日誌資料庫".to_string(),
        sheet_name: "工作日誌資料庫".to_string(),
        report_prefix: "工作日誌彙整".to_string(),
        document_style: RunStyle::default(),
    }
}

/// Two days, newest first. Exercises every level, images at item and
/// sub-sub-item level, a project without items and a sub-item without
/// children. No text contains "drive", so searches never hit image fields.
pub fn sample_book() -> LogBook {
    LogBook::new(vec![
        Day::new("115.02.13").with_projects(vec![
            Project::new("Bridge").with_items(vec![
                Item::new("Survey ((north)) bank")
                    .with_image(ImageRef::new("https://drive/item", "item-img"))
                    .with_subs(vec![
                        Sub::new("Piers").with_subsubs(vec![
                            SubSub::new("P1")
                                .with_image(ImageRef::new("https://drive/subsub", "subsub-img")),
                            SubSub::new("P2"),
                        ]),
                        Sub::new("Deck"),
                    ]),
                Item::new("Report"),
            ]),
            Project::new("Road"),
        ]),
        Day::new("115.01.05").with_projects(vec![Project::new("Bridge").with_items(vec![
            Item::new("Kickoff").with_image(ImageRef::new("https://drive/older", "older-img")),
        ])]),
    ])
}

pub fn full_settings() -> RemoteSettings {
    RemoteSettings {
        script_url: "https://script.example/exec".to_string(),
        token: "secret".to_string(),
        folder_id: "folder-1".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Canned answers per action. Every request is recorded as the JSON it
/// would have been sent as.
#[derive(Debug, Default)]
pub struct MockEndpoint {
    responses: HashMap<&'static str, Value>,
    failing_ids: HashSet<String>,
    requests: RefCell<Vec<Value>>,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, action: &'static str, response: Value) -> Self {
        self.responses.insert(action, response);
        self
    }

    /// Makes `deleteImage` for `file_id` answer with a failure.
    pub fn fail_on(mut self, file_id: &str) -> Self {
        self.failing_ids.insert(file_id.to_string());
        self
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.borrow().clone()
    }
}

impl RemoteEndpoint for MockEndpoint {
    async fn call(&self, request: &RemoteRequest<'_>) -> Result<Value> {
        let sent = serde_json::to_value(request)?;
        let failing = sent["fileId"]
            .as_str()
            .is_some_and(|id| self.failing_ids.contains(id));
        self.requests.borrow_mut().push(sent);
        if failing {
            return Ok(json!({"success": false, "message": "file not found"}));
        }
        let action = request.action();
        self.responses
            .get(action)
            .cloned()
            .ok_or_else(|| WorkLogError::Remote {
                action,
                message: "no response configured".to_string(),
            })
    }
}
