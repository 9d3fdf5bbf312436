//! Error types for the channel client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    ToolNotFound,

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("yt-dlp failed with exit code {code:?}: {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("Failed to parse yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No videos found for channel: {0}")]
    EmptyChannel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
