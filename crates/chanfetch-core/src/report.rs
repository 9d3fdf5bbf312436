//! Human-readable text reports

use crate::classifier::ClassifiedMetadata;
use crate::config::Layout;
use crate::downloader::BatchReport;
use crate::error::ReportError;
use crate::record::{ListingRecord, VerificationRecord};
use crate::verifier::VerificationSummary;
use chrono::{Local, NaiveDateTime};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Classification summary written to `metadata/summary.txt`
pub fn render_summary(
    classified: &ClassifiedMetadata,
    channel: &str,
    generated: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Channel: {}\n", channel));
    out.push_str(&format!(
        "Extraction date: {}\n\n",
        generated.format(TIMESTAMP_FORMAT)
    ));

    out.push_str(&format!("Total videos: {}\n", classified.videos.len()));
    out.push_str(&format!("Total shorts: {}\n\n", classified.shorts.len()));

    out.push_str("=== VIDEOS ===\n");
    for (i, video) in classified.videos.iter().enumerate() {
        out.push_str(&entry_heading(i + 1, video));
        out.push_str(&format!(
            "   Duration: {}\n",
            video.duration_string().unwrap_or("Unknown")
        ));
        out.push_str(&format!("   URL: {}\n", video.url().unwrap_or("Unknown URL")));
        out.push_str(&format!("   Views: {}\n", views(video)));
        out.push_str(&format!(
            "   Description: {}\n\n",
            video.description().unwrap_or("No description")
        ));
    }

    out.push_str("=== SHORTS ===\n");
    for (i, short) in classified.shorts.iter().enumerate() {
        out.push_str(&entry_heading(i + 1, short));
        out.push_str(&format!("   URL: {}\n", short.url().unwrap_or("Unknown URL")));
        out.push_str(&format!("   Views: {}\n\n", views(short)));
    }

    out
}

fn entry_heading(index: usize, record: &ListingRecord) -> String {
    format!(
        "{}. {} (ID: {})\n",
        index,
        record.title().unwrap_or("Unknown Title"),
        record.id().unwrap_or("Unknown ID")
    )
}

fn views(record: &ListingRecord) -> String {
    record
        .view_count()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Verification report written to `downloads/verification_report.txt`
pub fn render_verification_report(records: &[VerificationRecord], generated: NaiveDateTime) -> String {
    let verified = records.iter().filter(|r| r.verified).count();

    let mut out = String::new();
    out.push_str("Video Download Verification Report\n");
    out.push_str(&format!("Generated: {}\n\n", generated.format(TIMESTAMP_FORMAT)));
    out.push_str(&format!(
        "Summary: {} out of {} videos verified\n\n",
        verified,
        records.len()
    ));

    out.push_str("=== VERIFICATION DETAILS ===\n");
    for record in records {
        out.push_str(&format!(
            "\nVideo: {} (ID: {})\n",
            record.title.as_deref().unwrap_or("Unknown Title"),
            record.id.as_deref().unwrap_or("Unknown ID")
        ));
        out.push_str(&format!(
            "Status: {}\n",
            if record.verified { "✓ Verified" } else { "✗ Failed" }
        ));

        if let Some(ref file) = record.video_file {
            out.push_str(&format!("Video file: {}\n", file));
        }

        if !record.issues.is_empty() {
            out.push_str("Issues:\n");
            for issue in &record.issues {
                out.push_str(&format!("  - {}\n", issue));
            }
        }
    }

    out
}

/// End-of-run report written to `reports/download_report.txt`
pub fn render_run_report(
    channel: &str,
    classified: &ClassifiedMetadata,
    batch: Option<&BatchReport>,
    verification: Option<&VerificationSummary>,
    generated: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push_str("Channel Download Report\n");
    out.push_str(&format!("Channel: {}\n", channel));
    out.push_str(&format!("Generated: {}\n\n", generated.format(TIMESTAMP_FORMAT)));

    out.push_str("=== LISTING ===\n");
    out.push_str(&format!("Videos: {}\n", classified.videos.len()));
    out.push_str(&format!("Shorts: {}\n\n", classified.shorts.len()));

    out.push_str("=== DOWNLOADS ===\n");
    match batch {
        Some(batch) => {
            out.push_str(&format!("Attempted: {}\n", batch.attempted));
            out.push_str(&format!("Succeeded: {}\n", batch.succeeded.len()));
            out.push_str(&format!("Failed: {}\n", batch.failed.len()));
            out.push_str(&format!("Skipped (missing ID or URL): {}\n", batch.skipped.len()));
            for failure in &batch.failed {
                out.push_str(&format!("  - {}: {}\n", failure.id, failure.error));
            }
        }
        None => out.push_str("Download results not recorded for this run\n"),
    }
    out.push('\n');

    out.push_str("=== VERIFICATION ===\n");
    match verification {
        Some(summary) => {
            out.push_str(&format!(
                "Verified: {} out of {}\n",
                summary.verified_count(),
                summary.records.len()
            ));
            for record in summary.records.iter().filter(|r| !r.verified) {
                out.push_str(&format!(
                    "  - {}: {}\n",
                    record.id.as_deref().unwrap_or("Unknown ID"),
                    record.issues.join("; ")
                ));
            }
        }
        None => out.push_str("Verification did not complete\n"),
    }

    out
}

/// Build the end-of-run report from the files earlier steps left on disk
pub async fn report_from_disk(layout: &Layout, channel: &str) -> Result<PathBuf, ReportError> {
    let videos: Vec<ListingRecord> = read_json(&layout.videos_metadata())
        .await?
        .ok_or_else(|| ReportError::MissingInput(layout.videos_metadata()))?;
    let shorts: Vec<ListingRecord> = read_json(&layout.shorts_metadata())
        .await?
        .unwrap_or_default();
    let verification = read_json::<Vec<VerificationRecord>>(&layout.verification_results())
        .await?
        .map(|records| VerificationSummary { records });

    let classified = ClassifiedMetadata { videos, shorts };
    let text = render_run_report(
        channel,
        &classified,
        None,
        verification.as_ref(),
        Local::now().naive_local(),
    );

    let path = layout.run_report();
    write_report(&path, &text).await?;
    Ok(path)
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ReportError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ReportError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write a rendered report, creating its parent directory
pub async fn write_report(path: &Path, contents: &str) -> Result<(), ReportError> {
    let wrap = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(wrap)?;
    }
    fs::write(path, contents).await.map_err(wrap)?;

    debug!("Wrote report: {}", path.display());
    Ok(())
}
