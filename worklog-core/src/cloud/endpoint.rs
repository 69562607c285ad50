use crate::error::{Result, WorkLogError};
use crate::model::LogBook;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// One request to the remote script endpoint, serialized as a flat JSON
/// object whose `action` field selects the operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RemoteRequest<'a> {
    UploadImage {
        token: &'a str,
        folder_id: &'a str,
        /// The image as a `data:` URI.
        base64: &'a str,
        file_name: String,
    },
    DeleteImage {
        token: &'a str,
        file_id: &'a str,
    },
    ListFiles {
        token: &'a str,
        folder_id: &'a str,
    },
    SyncUpload {
        token: &'a str,
        data: &'a LogBook,
    },
    SyncDownload {
        token: &'a str,
    },
}

impl RemoteRequest<'_> {
    pub fn action(&self) -> &'static str {
        match self {
            RemoteRequest::UploadImage { .. } => "uploadImage",
            RemoteRequest::DeleteImage { .. } => "deleteImage",
            RemoteRequest::ListFiles { .. } => "listFiles",
            RemoteRequest::SyncUpload { .. } => "syncUpload",
            RemoteRequest::SyncDownload { .. } => "syncDownload",
        }
    }
}

/// Something that answers [`RemoteRequest`]s with JSON.
#[allow(async_fn_in_trait)]
pub trait RemoteEndpoint {
    async fn call(&self, request: &RemoteRequest<'_>) -> Result<Value>;
}

/// The real endpoint: a web-app script reached by HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("worklog/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl RemoteEndpoint for HttpEndpoint {
    async fn call(&self, request: &RemoteRequest<'_>) -> Result<Value> {
        let action = request.action();
        info!(action, "calling remote endpoint");

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        debug!(action, %status, "remote endpoint answered");
        if !status.is_success() {
            return Err(WorkLogError::Remote {
                action,
                message: format!("HTTP status {status}"),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| WorkLogError::UnexpectedResponse {
                action,
                detail: e.to_string(),
            })
    }
}
