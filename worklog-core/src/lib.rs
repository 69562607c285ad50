pub mod cloud;
pub mod config;
pub mod dates;
pub mod document;
pub mod error;
pub mod images;
pub mod markup;
pub mod model;
pub mod preview;
pub mod storage;
pub mod transform;
pub mod view;
pub mod work_log;
pub mod workbook;

#[cfg(test)]
mod tests;

pub use cloud::{HttpEndpoint, RemoteEndpoint, RemoteSettings};
pub use config::Config;
pub use dates::{MonthFilter, RocDate};
pub use error::{Result, WorkLogError};
pub use model::{Day, Direction, ImageRef, Item, LogBook, NodePath, Project, Sub, SubSub};
pub use view::{ReportFilter, ViewFilter};
pub use work_log::{AttachedImage, ImageUpload, ReleaseReport, WorkLog};
