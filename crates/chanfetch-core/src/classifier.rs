//! Split the raw channel listing into regular videos and shorts

use crate::config::Layout;
use crate::error::ClassifyError;
use crate::record::ListingRecord;
use crate::report;
use chrono::Local;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedMetadata {
    pub videos: Vec<ListingRecord>,
    pub shorts: Vec<ListingRecord>,
}

impl ClassifiedMetadata {
    pub fn total(&self) -> usize {
        self.videos.len() + self.shorts.len()
    }
}

/// A record is a short iff its URL mentions `shorts` (any case)
pub fn is_short(record: &ListingRecord) -> bool {
    record
        .url()
        .map(|url| url.to_lowercase().contains("shorts"))
        .unwrap_or(false)
}

/// Parse newline-delimited JSON and partition it; any malformed line fails the whole listing
pub fn classify_listing(raw: &str) -> Result<ClassifiedMetadata, ClassifyError> {
    let mut classified = ClassifiedMetadata::default();

    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let record: ListingRecord = serde_json::from_str(line)
            .map_err(|source| ClassifyError::MalformedRecord { line: idx + 1, source })?;

        if is_short(&record) {
            classified.shorts.push(record);
        } else {
            classified.videos.push(record);
        }
    }

    Ok(classified)
}

/// Read the raw listing, persist both partitions and write the summary
pub async fn extract_metadata(
    layout: &Layout,
    channel: &str,
) -> Result<ClassifiedMetadata, ClassifyError> {
    info!("Extracting video metadata");

    let raw_path = layout.raw_listing();
    let raw = match fs::read_to_string(&raw_path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ClassifyError::MissingInput(raw_path));
        }
        Err(e) => return Err(e.into()),
    };

    let classified = classify_listing(&raw)?;

    let metadata_dir = layout.metadata_dir();
    fs::create_dir_all(metadata_dir.join("videos")).await?;
    fs::create_dir_all(metadata_dir.join("shorts")).await?;

    fs::write(
        layout.videos_metadata(),
        serde_json::to_string_pretty(&classified.videos)?,
    )
    .await?;
    fs::write(
        layout.shorts_metadata(),
        serde_json::to_string_pretty(&classified.shorts)?,
    )
    .await?;

    let summary = report::render_summary(&classified, channel, Local::now().naive_local());
    report::write_report(&layout.summary(), &summary).await?;

    info!(
        "Found {} videos and {} shorts",
        classified.videos.len(),
        classified.shorts.len()
    );
    Ok(classified)
}
