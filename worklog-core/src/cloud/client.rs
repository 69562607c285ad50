use super::endpoint::{RemoteEndpoint, RemoteRequest};
use crate::error::{Result, WorkLogError};
use crate::model::LogBook;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Connection settings for the remote endpoint, kept in the local store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSettings {
    pub script_url: String,
    pub token: String,
    pub folder_id: String,
}

impl RemoteSettings {
    /// Enough to sync the log or delete a file.
    pub fn require_sync(&self) -> Result<()> {
        if self.script_url.trim().is_empty() {
            return Err(WorkLogError::MissingSetting("script URL"));
        }
        if self.token.trim().is_empty() {
            return Err(WorkLogError::MissingSetting("token"));
        }
        Ok(())
    }

    /// Enough to upload or list image files.
    pub fn require_storage(&self) -> Result<()> {
        self.require_sync()?;
        if self.folder_id.trim().is_empty() {
            return Err(WorkLogError::MissingSetting("folder id"));
        }
        Ok(())
    }
}

/// A stored image as reported by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub id: String,
}

/// An entry of the remote image folder. Fields other than `id` are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteFile {
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusResponse {
    success: bool,
    message: Option<Value>,
    url: String,
    id: String,
    files: Vec<RemoteFile>,
}

impl StatusResponse {
    fn into_success(self, action: &'static str) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let message = match &self.message {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "request rejected".to_string(),
        };
        Err(WorkLogError::Remote { action, message })
    }
}

/// File name for an upload made at `unix_millis`.
pub fn upload_file_name(unix_millis: i64) -> String {
    format!("img_{unix_millis}.jpg")
}

/// Typed calls to a [`RemoteEndpoint`], checking the settings each call needs.
pub struct CloudClient<'a, E: RemoteEndpoint> {
    endpoint: &'a E,
    settings: &'a RemoteSettings,
}

impl<'a, E: RemoteEndpoint> CloudClient<'a, E> {
    pub fn new(endpoint: &'a E, settings: &'a RemoteSettings) -> Self {
        Self { endpoint, settings }
    }

    pub async fn upload_image(&self, data_uri: &str, file_name: String) -> Result<UploadedImage> {
        self.settings.require_storage()?;
        let request = RemoteRequest::UploadImage {
            token: &self.settings.token,
            folder_id: &self.settings.folder_id,
            base64: data_uri,
            file_name,
        };
        let action = request.action();
        let response: StatusResponse = decode(action, self.endpoint.call(&request).await?)?;
        let response = response.into_success(action)?;
        if response.url.is_empty() || response.id.is_empty() {
            return Err(WorkLogError::UnexpectedResponse {
                action,
                detail: "upload succeeded without url or id".to_string(),
            });
        }
        Ok(UploadedImage {
            url: response.url,
            id: response.id,
        })
    }

    pub async fn delete_image(&self, file_id: &str) -> Result<()> {
        self.settings.require_sync()?;
        let request = RemoteRequest::DeleteImage {
            token: &self.settings.token,
            file_id,
        };
        let action = request.action();
        let response: StatusResponse = decode(action, self.endpoint.call(&request).await?)?;
        response.into_success(action)?;
        Ok(())
    }

    pub async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        self.settings.require_storage()?;
        let request = RemoteRequest::ListFiles {
            token: &self.settings.token,
            folder_id: &self.settings.folder_id,
        };
        let action = request.action();
        let response: StatusResponse = decode(action, self.endpoint.call(&request).await?)?;
        Ok(response.into_success(action)?.files)
    }

    /// Uploads the whole book. Only `{"result": "Success"}` counts as success.
    pub async fn sync_upload(&self, book: &LogBook) -> Result<()> {
        self.settings.require_sync()?;
        let request = RemoteRequest::SyncUpload {
            token: &self.settings.token,
            data: book,
        };
        let action = request.action();
        let response = self.endpoint.call(&request).await?;
        match response.get("result").and_then(Value::as_str) {
            Some("Success") => Ok(()),
            _ => Err(WorkLogError::Remote {
                action,
                message: format!("upload not confirmed: {response}"),
            }),
        }
    }

    /// Downloads the book. Anything but a JSON array is rejected.
    pub async fn sync_download(&self) -> Result<LogBook> {
        self.settings.require_sync()?;
        let request = RemoteRequest::SyncDownload {
            token: &self.settings.token,
        };
        let action = request.action();
        let response = self.endpoint.call(&request).await?;
        if !response.is_array() {
            return Err(WorkLogError::UnexpectedResponse {
                action,
                detail: format!("expected a list of days, got {response}"),
            });
        }
        decode(action, response)
    }
}

fn decode<T: DeserializeOwned>(action: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| WorkLogError::UnexpectedResponse {
        action,
        detail: e.to_string(),
    })
}
