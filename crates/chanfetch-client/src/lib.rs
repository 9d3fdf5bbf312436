//! Typed YouTube channel client for chanfetch
//!
//! Exposes a channel as an iterable list of video URLs and each video as a
//! typed object with filterable/orderable media streams. The default
//! implementation talks to yt-dlp's JSON interface.

mod error;
mod video;
mod ytdlp;

pub use error::ClientError;
pub use video::{Stream, StreamQuery, Video};
pub use ytdlp::YtDlpClient;

use async_trait::async_trait;
use std::path::Path;

/// Source of channel listings, per-video details and stream downloads
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Watch URLs of every video on the channel, in channel order
    async fn video_urls(&self, channel_url: &str) -> Result<Vec<String>, ClientError>;

    /// Load descriptive fields and available streams for one video
    async fn video(&self, url: &str) -> Result<Video, ClientError>;

    /// Save a single stream of `video` to `dest`
    async fn download_stream(
        &self,
        video: &Video,
        stream: &Stream,
        dest: &Path,
    ) -> Result<(), ClientError>;
}
