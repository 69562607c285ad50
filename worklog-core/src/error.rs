//! Error types for work-log operations.
//!
//! Three families: validation errors (nothing changed, fix the input),
//! remote-call failures (local changes already made are kept), and
//! parse/format failures on import or document generation (in-memory state
//! untouched). None of them is fatal to the process.

use crate::model::NodePath;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkLogError {
    #[error("select text first")]
    EmptySelection,

    #[error("selection {start}..{end} is outside the text ({len} characters)")]
    SelectionOutOfBounds { start: usize, end: usize, len: usize },

    #[error("remote settings incomplete: {0} is not set")]
    MissingSetting(&'static str),

    #[error("no node at {0}")]
    NodeNotFound(NodePath),

    #[error("{0} is a sub-sub-item and cannot have children")]
    LeafNode(NodePath),

    #[error("{0} has no image slot (only items, sub-items and sub-sub-items do)")]
    NotImageNode(NodePath),

    #[error("invalid node path '{0}', expected dotted indices such as 0.1.2")]
    InvalidPath(String),

    #[error("invalid date '{0}', expected ROC form 115.02.13 or ISO form 2026-02-13")]
    InvalidDate(String),

    #[error("choose a project name for the report")]
    MissingProject,

    #[error("load a document template first")]
    MissingTemplate,

    #[error("remote call '{action}' failed: {message}")]
    Remote { action: &'static str, message: String },

    #[error("unexpected response to '{action}': {detail}")]
    UnexpectedResponse { action: &'static str, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unreadable workbook: {0}")]
    Workbook(String),

    #[error("template tags are invalid:\n{}", .0.join("\n"))]
    Template(Vec<String>),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl WorkLogError {
    /// True for errors caused by bad input rather than by IO, the network, or file contents.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptySelection
                | Self::SelectionOutOfBounds { .. }
                | Self::MissingSetting(_)
                | Self::NodeNotFound(_)
                | Self::LeafNode(_)
                | Self::NotImageNode(_)
                | Self::InvalidPath(_)
                | Self::InvalidDate(_)
                | Self::MissingProject
                | Self::MissingTemplate
        )
    }
}

pub type Result<T> = std::result::Result<T, WorkLogError>;
