//! Standalone channel downloader driving the channel client in-process

use crate::error::FetchError;
use chanfetch_client::{ClientError, Video, VideoSource};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

/// Shorts are shorter than this many seconds
pub const SHORT_MAX_SECONDS: u64 = 60;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub output_dir: PathBuf,
    pub skip_shorts: bool,
    pub delay: Duration,
}

/// Metadata document saved next to each downloaded video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDocument {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publish_date: String,
    pub length: Option<u64>,
    pub views: Option<u64>,
    pub keywords: Vec<String>,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
}

impl VideoDocument {
    pub fn from_video(video: &Video, url: &str) -> Self {
        Self {
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            url: url.to_string(),
            description: video.description.clone(),
            author: video.author.clone(),
            publish_date: video
                .publish_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            length: video.length,
            views: video.views,
            keywords: video.keywords.clone(),
            channel_id: video.channel_id.clone(),
            channel_url: video.channel_url.clone(),
        }
    }
}

/// What happened to a single channel entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded,
    AlreadyPresent,
    SkippedShort,
    Unavailable,
    Failed(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Downloaded | FetchOutcome::AlreadyPresent)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub succeeded: usize,
    pub total: usize,
}

/// Short iff it is under a minute with a vertical progressive stream, or its URL is a shorts URL
pub fn is_short(video: &Video) -> bool {
    if video.length.is_some_and(|len| len < SHORT_MAX_SECONDS) {
        let vertical = video
            .streams
            .progressive()
            .with_extension("mp4")
            .iter()
            .any(|s| s.is_vertical());
        if vertical {
            return true;
        }
    }

    video.watch_url.contains("/shorts/")
}

pub struct ChannelFetcher<S> {
    source: S,
    options: FetchOptions,
}

impl<S: VideoSource> ChannelFetcher<S> {
    pub fn new(source: S, options: FetchOptions) -> Self {
        Self { source, options }
    }

    fn video_dir(&self) -> PathBuf {
        self.options.output_dir.join("videos")
    }

    fn metadata_dir(&self) -> PathBuf {
        self.options.output_dir.join("metadata")
    }

    pub fn video_path(&self, video_id: &str) -> PathBuf {
        self.video_dir().join(format!("{}.mp4", video_id))
    }

    pub fn metadata_path(&self, video_id: &str) -> PathBuf {
        self.metadata_dir().join(format!("{}.json", video_id))
    }

    /// Download every video of the channel, one at a time.
    ///
    /// An empty channel yields an empty summary; failing to enumerate the
    /// channel at all is an error. Per-video failures never abort the loop.
    pub async fn download_all(&self, channel_url: &str) -> Result<FetchSummary, FetchError> {
        info!("Fetching video list from channel: {}", channel_url);
        let urls = match self.source.video_urls(channel_url).await {
            Ok(urls) => urls,
            Err(ClientError::EmptyChannel(_)) => Vec::new(),
            Err(e) => {
                warn!("Error fetching video list: {}", e);
                return Err(e.into());
            }
        };

        if urls.is_empty() {
            info!("No videos found to download");
            return Ok(FetchSummary::default());
        }

        let total = urls.len();
        info!("Found {} total videos", total);
        let mut summary = FetchSummary { succeeded: 0, total };

        for (idx, url) in urls.iter().enumerate() {
            info!("Processing video {}/{}", idx + 1, total);

            let outcome = self.download_video(url).await;
            match &outcome {
                FetchOutcome::Failed(error) => warn!("Error downloading {}: {}", url, error),
                FetchOutcome::Unavailable => warn!("Video {} is unavailable, skipping", url),
                other => debug!("{}: {:?}", url, other),
            }
            if outcome.is_success() {
                summary.succeeded += 1;
            }

            if idx + 1 < total && !self.options.delay.is_zero() {
                info!("Waiting {:.1} seconds before next download", self.options.delay.as_secs_f32());
                tokio::time::sleep(self.options.delay).await;
            }
        }

        info!(
            "Download complete! Successfully downloaded {}/{} videos",
            summary.succeeded, summary.total
        );
        Ok(summary)
    }

    /// Process a single URL; errors are folded into the outcome
    pub async fn download_video(&self, url: &str) -> FetchOutcome {
        match self.try_download_video(url).await {
            Ok(outcome) => outcome,
            Err(FetchError::Client(ClientError::VideoUnavailable(_))) => FetchOutcome::Unavailable,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }

    async fn try_download_video(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let video = self.source.video(url).await?;
        info!("Processing: {} ({})", video.title, video.video_id);

        if self.options.skip_shorts && is_short(&video) {
            info!("Skipping YouTube Short: {}", video.title);
            return Ok(FetchOutcome::SkippedShort);
        }

        let video_path = self.video_path(&video.video_id);
        let metadata_path = self.metadata_path(&video.video_id);
        if fs::try_exists(&video_path).await? && fs::try_exists(&metadata_path).await? {
            info!("Video and metadata already exist. Skipping.");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        fs::create_dir_all(self.video_dir()).await?;
        fs::create_dir_all(self.metadata_dir()).await?;

        let document = VideoDocument::from_video(&video, url);
        fs::write(&metadata_path, serde_json::to_string_pretty(&document)?).await?;

        let progressive = video
            .streams
            .progressive()
            .with_extension("mp4")
            .order_by_resolution_desc();
        let audio = video.streams.only_audio();

        let stream = match progressive.first() {
            Some(stream) => stream,
            None => {
                info!("No suitable stream found for {}. Trying audio only.", video.video_id);
                audio
                    .first()
                    .ok_or_else(|| FetchError::NoStreams(video.video_id.clone()))?
            }
        };

        self.source
            .download_stream(&video, stream, &video_path)
            .await?;

        info!("Successfully downloaded: {}", video.title);
        Ok(FetchOutcome::Downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chanfetch_client::{Stream, StreamQuery};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    fn stream(id: &str, ext: &str, dims: Option<(u32, u32)>, video: bool, audio: bool) -> Stream {
        Stream {
            format_id: id.to_string(),
            ext: ext.to_string(),
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            resolution: None,
            vcodec: Some(if video { "avc1" } else { "none" }.to_string()),
            acodec: Some(if audio { "mp4a" } else { "none" }.to_string()),
        }
    }

    fn video(id: &str, length: Option<u64>, url: &str, streams: Vec<Stream>) -> Video {
        Video {
            video_id: id.to_string(),
            title: format!("Title {}", id),
            description: Some("desc".to_string()),
            author: Some("VK-STREAMING".to_string()),
            publish_date: None,
            length,
            views: Some(7),
            keywords: vec!["tag".to_string()],
            channel_id: Some("UC123".to_string()),
            channel_url: None,
            watch_url: url.to_string(),
            streams: StreamQuery::new(streams),
        }
    }

    #[derive(Default)]
    struct FakeSource {
        urls: Vec<String>,
        videos: HashMap<String, Video>,
        downloads: Mutex<Vec<(String, String)>>,
        fail_listing: bool,
    }

    impl FakeSource {
        fn with(videos: Vec<Video>) -> Self {
            Self {
                urls: videos.iter().map(|v| v.watch_url.clone()).collect(),
                videos: videos.into_iter().map(|v| (v.watch_url.clone(), v)).collect(),
                downloads: Mutex::new(Vec::new()),
                fail_listing: false,
            }
        }

        fn downloaded(&self) -> Vec<(String, String)> {
            self.downloads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoSource for FakeSource {
        async fn video_urls(&self, channel_url: &str) -> Result<Vec<String>, ClientError> {
            if self.fail_listing {
                return Err(ClientError::CommandFailed {
                    code: Some(1),
                    stderr: "ERROR: unable to download webpage".to_string(),
                });
            }
            if self.urls.is_empty() {
                return Err(ClientError::EmptyChannel(channel_url.to_string()));
            }
            Ok(self.urls.clone())
        }

        async fn video(&self, url: &str) -> Result<Video, ClientError> {
            self.videos
                .get(url)
                .cloned()
                .ok_or_else(|| ClientError::VideoUnavailable(url.to_string()))
        }

        async fn download_stream(
            &self,
            video: &Video,
            stream: &Stream,
            dest: &Path,
        ) -> Result<(), ClientError> {
            std::fs::write(dest, b"media")?;
            self.downloads
                .lock()
                .unwrap()
                .push((video.video_id.clone(), stream.format_id.clone()));
            Ok(())
        }
    }

    fn options(dir: &Path, skip_shorts: bool) -> FetchOptions {
        FetchOptions {
            output_dir: dir.to_path_buf(),
            skip_shorts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_short_detection() {
        let vertical = stream("18", "mp4", Some((360, 640)), true, true);
        let landscape = stream("22", "mp4", Some((1280, 720)), true, true);

        assert!(is_short(&video("a", Some(30), "https://www.youtube.com/watch?v=a", vec![vertical.clone()])));
        // Long vertical video is not a short
        assert!(!is_short(&video("b", Some(600), "https://www.youtube.com/watch?v=b", vec![vertical])));
        // Short landscape video is not a short
        assert!(!is_short(&video("c", Some(30), "https://www.youtube.com/watch?v=c", vec![landscape.clone()])));
        // URL marker wins regardless of duration
        assert!(is_short(&video("d", Some(600), "https://www.youtube.com/shorts/d", vec![landscape])));
        assert!(!is_short(&video("e", None, "https://www.youtube.com/watch?v=e", vec![])));
    }

    #[tokio::test]
    async fn test_downloads_highest_progressive_stream() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with(vec![video(
            "v1",
            Some(900),
            "https://www.youtube.com/watch?v=v1",
            vec![
                stream("18", "mp4", Some((640, 360)), true, true),
                stream("22", "mp4", Some((1280, 720)), true, true),
                stream("137", "mp4", Some((1920, 1080)), true, false),
                stream("140", "m4a", None, false, true),
            ],
        )]);

        let fetcher = ChannelFetcher::new(source, options(dir.path(), true));
        let summary = fetcher.download_all("https://www.youtube.com/@chan").await.unwrap();

        assert_eq!(summary, FetchSummary { succeeded: 1, total: 1 });
        assert_eq!(fetcher.source.downloaded(), vec![("v1".to_string(), "22".to_string())]);
        assert!(fetcher.video_path("v1").exists());

        let doc: VideoDocument = serde_json::from_str(
            &std::fs::read_to_string(fetcher.metadata_path("v1")).unwrap(),
        )
        .unwrap();
        assert_eq!(doc.video_id, "v1");
        assert_eq!(doc.publish_date, "Unknown");
        assert_eq!(doc.url, "https://www.youtube.com/watch?v=v1");
    }

    #[tokio::test]
    async fn test_falls_back_to_audio_only() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with(vec![video(
            "a1",
            Some(300),
            "https://www.youtube.com/watch?v=a1",
            vec![stream("140", "m4a", None, false, true)],
        )]);

        let fetcher = ChannelFetcher::new(source, options(dir.path(), true));
        assert_eq!(
            fetcher.download_video("https://www.youtube.com/watch?v=a1").await,
            FetchOutcome::Downloaded
        );
        assert_eq!(fetcher.source.downloaded(), vec![("a1".to_string(), "140".to_string())]);
    }

    #[tokio::test]
    async fn test_no_streams_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with(vec![video("n", Some(300), "https://www.youtube.com/watch?v=n", vec![])]);

        let fetcher = ChannelFetcher::new(source, options(dir.path(), true));
        let outcome = fetcher.download_video("https://www.youtube.com/watch?v=n").await;
        assert!(matches!(outcome, FetchOutcome::Failed(ref e) if e.contains("No downloadable stream")));
    }

    #[tokio::test]
    async fn test_skips_existing_and_shorts() {
        let dir = tempfile::tempdir().unwrap();
        let streams = vec![stream("22", "mp4", Some((1280, 720)), true, true)];
        let source = FakeSource::with(vec![
            video("old", Some(900), "https://www.youtube.com/watch?v=old", streams.clone()),
            video("s", Some(20), "https://www.youtube.com/shorts/s", streams),
        ]);

        let fetcher = ChannelFetcher::new(source, options(dir.path(), true));
        fs::create_dir_all(fetcher.video_dir()).await.unwrap();
        fs::create_dir_all(fetcher.metadata_dir()).await.unwrap();
        std::fs::write(fetcher.video_path("old"), b"media").unwrap();
        std::fs::write(fetcher.metadata_path("old"), b"{}").unwrap();

        assert_eq!(
            fetcher.download_video("https://www.youtube.com/watch?v=old").await,
            FetchOutcome::AlreadyPresent
        );
        assert_eq!(
            fetcher.download_video("https://www.youtube.com/shorts/s").await,
            FetchOutcome::SkippedShort
        );
        assert!(fetcher.source.downloaded().is_empty());

        let summary = fetcher.download_all("https://www.youtube.com/@chan").await.unwrap();
        assert_eq!(summary, FetchSummary { succeeded: 1, total: 2 });
    }

    #[tokio::test]
    async fn test_include_shorts() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with(vec![video(
            "s",
            Some(20),
            "https://www.youtube.com/shorts/s",
            vec![stream("18", "mp4", Some((360, 640)), true, true)],
        )]);

        let fetcher = ChannelFetcher::new(source, options(dir.path(), false));
        assert_eq!(
            fetcher.download_video("https://www.youtube.com/shorts/s").await,
            FetchOutcome::Downloaded
        );
    }

    #[tokio::test]
    async fn test_unavailable_video_does_not_halt_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::with(vec![video(
            "ok",
            Some(900),
            "https://www.youtube.com/watch?v=ok",
            vec![stream("22", "mp4", Some((1280, 720)), true, true)],
        )]);
        source.urls.insert(0, "https://www.youtube.com/watch?v=private".to_string());

        let fetcher = ChannelFetcher::new(source, options(dir.path(), true));
        assert_eq!(
            fetcher.download_video("https://www.youtube.com/watch?v=private").await,
            FetchOutcome::Unavailable
        );

        let summary = fetcher.download_all("https://www.youtube.com/@chan").await.unwrap();
        assert_eq!(summary, FetchSummary { succeeded: 1, total: 2 });
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::with(vec![]);
        source.fail_listing = true;

        let fetcher = ChannelFetcher::new(source, options(dir.path(), true));
        let err = fetcher
            .download_all("https://www.youtube.com/@chan")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Client(ClientError::CommandFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_channel_is_an_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ChannelFetcher::new(FakeSource::with(vec![]), options(dir.path(), true));

        let summary = fetcher.download_all("https://www.youtube.com/@chan").await.unwrap();
        assert_eq!(summary, FetchSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_items() {
        let dir = tempfile::tempdir().unwrap();
        let streams = vec![stream("22", "mp4", Some((1280, 720)), true, true)];
        let source = FakeSource::with(vec![
            video("a", Some(900), "https://www.youtube.com/watch?v=a", streams.clone()),
            video("b", Some(900), "https://www.youtube.com/watch?v=b", streams.clone()),
            video("c", Some(900), "https://www.youtube.com/watch?v=c", streams),
        ]);

        let mut opts = options(dir.path(), true);
        opts.delay = Duration::from_secs(5);
        let fetcher = ChannelFetcher::new(source, opts);

        let start = tokio::time::Instant::now();
        let summary = fetcher.download_all("https://www.youtube.com/@chan").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(summary, FetchSummary { succeeded: 3, total: 3 });
        // Two gaps for three videos, none after the last
        assert!(elapsed >= Duration::from_secs(10), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(15), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_video_never_waits() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with(vec![video(
            "a",
            Some(900),
            "https://www.youtube.com/watch?v=a",
            vec![stream("22", "mp4", Some((1280, 720)), true, true)],
        )]);

        let mut opts = options(dir.path(), true);
        opts.delay = Duration::from_secs(5);
        let fetcher = ChannelFetcher::new(source, opts);

        let start = tokio::time::Instant::now();
        fetcher.download_all("https://www.youtube.com/@chan").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
