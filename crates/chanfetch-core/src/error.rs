//! Error types for chanfetch-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChanfetchError>;

#[derive(Error, Debug)]
pub enum ChanfetchError {
    #[error("Channel listing failed: {0}")]
    List(#[from] ListError),

    #[error("Metadata extraction failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Verification failed: {0}")]
    Verify(#[from] VerifyError),

    #[error("Report failed: {0}")]
    Report(#[from] ReportError),

    #[error("Channel fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    ToolNotFound,

    #[error("yt-dlp failed with exit code {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Raw listing not found: {0}")]
    MissingInput(PathBuf),

    #[error("Malformed JSON on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    ToolNotFound,

    #[error("yt-dlp failed with exit code: {0:?}")]
    ToolFailed(Option<i32>),

    #[error("Video metadata not found: {0}")]
    MissingInput(PathBuf),

    #[error("Failed to parse video metadata: {0}")]
    MetadataParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Videos directory does not exist: {0}")]
    MissingDownloads(PathBuf),

    #[error("Video metadata not found: {0}")]
    MissingInput(PathBuf),

    #[error("Failed to read or write verification data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report input not found: {0}")]
    MissingInput(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse report input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Channel client error: {0}")]
    Client(#[from] chanfetch_client::ClientError),

    #[error("No downloadable stream for {0}")]
    NoStreams(String),

    #[error("Failed to write video document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
