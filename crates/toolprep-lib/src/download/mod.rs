#[allow(clippy::module_inception)]
mod download;
mod types;

pub use download::{DownloadCenter, Fetch};
pub use types::{
    DownloadBatch, DownloadOptions, DownloadRequest, DownloadResult, FetchMode, Payload,
};
