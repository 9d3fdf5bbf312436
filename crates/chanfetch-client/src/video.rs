//! Typed video and stream model built from yt-dlp JSON

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// A single YouTube video as seen by the channel client
#[derive(Debug, Clone)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
    /// Length in seconds, when known
    pub length: Option<u64>,
    pub views: Option<u64>,
    pub keywords: Vec<String>,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    /// URL the video was requested with (keeps `/shorts/` paths intact)
    pub watch_url: String,
    pub streams: StreamQuery,
}

/// One downloadable media stream (a yt-dlp "format")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub format_id: String,
    pub ext: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Resolution string as reported by yt-dlp, e.g. "1280x720" or "audio only"
    pub resolution: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}

impl Stream {
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// Audio and video muxed into one file
    pub fn is_progressive(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }

    /// Width and height, from explicit fields or parsed from the resolution string
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if let (Some(w), Some(h)) = (self.width, self.height) {
            return Some((w, h));
        }
        self.resolution.as_deref().and_then(parse_resolution)
    }

    /// Height greater than width
    pub fn is_vertical(&self) -> bool {
        self.dimensions().map(|(w, h)| h > w).unwrap_or(false)
    }
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

fn resolution_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    // Pattern like "1280x720"
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d+)x(\d+)$").ok())
        .as_ref()
}

fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let caps = resolution_pattern()?.captures(resolution.trim())?;
    let width = caps.get(1)?.as_str().parse().ok()?;
    let height = caps.get(2)?.as_str().parse().ok()?;
    Some((width, height))
}

/// Filterable, orderable collection of streams
#[derive(Debug, Clone, Default)]
pub struct StreamQuery {
    streams: Vec<Stream>,
}

impl StreamQuery {
    pub fn new(streams: Vec<Stream>) -> Self {
        Self { streams }
    }

    pub fn progressive(&self) -> Self {
        self.filter(Stream::is_progressive)
    }

    pub fn only_audio(&self) -> Self {
        self.filter(Stream::is_audio_only)
    }

    pub fn with_extension(&self, ext: &str) -> Self {
        self.filter(|s| s.ext.eq_ignore_ascii_case(ext))
    }

    pub fn filter(&self, predicate: impl Fn(&Stream) -> bool) -> Self {
        Self {
            streams: self.streams.iter().filter(|s| predicate(s)).cloned().collect(),
        }
    }

    /// Highest resolution first; streams without dimensions go last
    pub fn order_by_resolution_desc(mut self) -> Self {
        self.streams.sort_by_key(|s| {
            std::cmp::Reverse(s.dimensions().map(|(w, h)| (h, w)).unwrap_or((0, 0)))
        });
        self
    }

    pub fn first(&self) -> Option<&Stream> {
        self.streams.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawVideo {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    channel_url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    original_url: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
}

impl From<RawVideo> for Video {
    fn from(raw: RawVideo) -> Self {
        let watch_url = raw
            .original_url
            .or(raw.webpage_url)
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", raw.id));

        // yt-dlp dates are YYYYMMDD
        let publish_date = raw
            .upload_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok());

        let streams = raw
            .formats
            .into_iter()
            .map(|f| Stream {
                format_id: f.format_id,
                ext: f.ext.unwrap_or_default(),
                width: f.width,
                height: f.height,
                resolution: f.resolution,
                vcodec: f.vcodec,
                acodec: f.acodec,
            })
            .collect();

        Self {
            video_id: raw.id,
            title: raw.title,
            description: raw.description,
            author: raw.uploader.or(raw.channel),
            publish_date,
            length: raw.duration.map(|d| d.max(0.0).round() as u64),
            views: raw.view_count,
            keywords: raw.tags.unwrap_or_default(),
            channel_id: raw.channel_id,
            channel_url: raw.channel_url,
            watch_url,
            streams: StreamQuery::new(streams),
        }
    }
}
