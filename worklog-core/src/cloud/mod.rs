//! Client side of the remote script endpoint: image storage and log sync.

mod client;
mod endpoint;

pub use client::{CloudClient, RemoteFile, RemoteSettings, UploadedImage, upload_file_name};
pub use endpoint::{HttpEndpoint, RemoteEndpoint, RemoteRequest};
