//! Cross-check expected videos against the downloaded artifacts

use crate::config::{Layout, VerifyConfig};
use crate::error::VerifyError;
use crate::record::{ListingRecord, VerificationRecord};
use crate::report;
use chrono::Local;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

pub const ISSUE_NO_DIRECTORY: &str = "Video directory not found";
pub const ISSUE_NO_ID: &str = "Video identifier missing";
pub const ISSUE_NO_MEDIA: &str = "No video file found";
pub const ISSUE_NO_SNAPSHOT: &str = "metadata.json not found";
pub const ISSUE_NO_INFO: &str = "info.json not found";
pub const ISSUE_NO_DESCRIPTION: &str = "description file not found";
pub const ISSUE_NO_THUMBNAIL: &str = "thumbnail not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    /// Non-fatal: some videos are incomplete
    Warning { failed: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    pub records: Vec<VerificationRecord>,
}

impl VerificationSummary {
    pub fn verified_count(&self) -> usize {
        self.records.iter().filter(|r| r.verified).count()
    }

    pub fn outcome(&self) -> VerificationOutcome {
        let failed = self.records.len() - self.verified_count();
        if failed == 0 {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::Warning { failed }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Verifier {
    media_extensions: Vec<String>,
    thumbnail_extensions: Vec<String>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(&VerifyConfig::default())
    }
}

impl Verifier {
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            media_extensions: config.media_extensions.clone(),
            thumbnail_extensions: config.thumbnail_extensions.clone(),
        }
    }

    /// Inspect every expected video's directory
    pub async fn verify(
        &self,
        expected: &[ListingRecord],
        layout: &Layout,
    ) -> Result<VerificationSummary, VerifyError> {
        let videos_dir = layout.videos_dir();
        if !fs::try_exists(&videos_dir).await? {
            return Err(VerifyError::MissingDownloads(videos_dir));
        }

        info!("Expected {} videos", expected.len());

        let mut records = Vec::with_capacity(expected.len());
        for video in expected {
            records.push(self.verify_entry(video, layout).await?);
        }

        let summary = VerificationSummary { records };
        match summary.outcome() {
            VerificationOutcome::Verified => info!("All videos successfully verified"),
            VerificationOutcome::Warning { failed } => {
                warn!("{} videos failed verification", failed)
            }
        }
        Ok(summary)
    }

    async fn verify_entry(
        &self,
        video: &ListingRecord,
        layout: &Layout,
    ) -> Result<VerificationRecord, VerifyError> {
        let mut record = VerificationRecord::new(video.id(), video.title());

        let Some(id) = video.id() else {
            record.issue(ISSUE_NO_ID);
            return Ok(record.finish());
        };

        let video_dir = layout.video_dir(id);
        if !fs::try_exists(&video_dir).await? {
            record.issue(ISSUE_NO_DIRECTORY);
            return Ok(record.finish());
        }

        let files = list_files(&video_dir).await?;
        let has_suffix = |suffix: &str| files.iter().any(|f| f.ends_with(suffix));

        match files.iter().find(|f| has_extension(f, &self.media_extensions)) {
            Some(media) => record.video_file = Some(media.clone()),
            None => record.issue(ISSUE_NO_MEDIA),
        }

        if !files.iter().any(|f| f == "metadata.json") {
            record.issue(ISSUE_NO_SNAPSHOT);
        }
        if !has_suffix(".info.json") {
            record.issue(ISSUE_NO_INFO);
        }
        if !has_suffix(".description") {
            record.issue(ISSUE_NO_DESCRIPTION);
        }
        if !files.iter().any(|f| has_extension(f, &self.thumbnail_extensions)) {
            record.issue(ISSUE_NO_THUMBNAIL);
        }

        Ok(record.finish())
    }

    /// Verify the classified videos and persist results and report
    pub async fn run(&self, layout: &Layout) -> Result<VerificationSummary, VerifyError> {
        let path = layout.videos_metadata();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VerifyError::MissingInput(path));
            }
            Err(e) => return Err(e.into()),
        };
        let expected: Vec<ListingRecord> = serde_json::from_str(&content)?;

        let summary = self.verify(&expected, layout).await?;
        write_results(&summary, layout).await?;
        Ok(summary)
    }
}

/// Persist `verification_results.json` and `verification_report.txt`
pub async fn write_results(summary: &VerificationSummary, layout: &Layout) -> Result<(), VerifyError> {
    fs::create_dir_all(layout.downloads_dir()).await?;
    fs::write(
        layout.verification_results(),
        serde_json::to_string_pretty(&summary.records)?,
    )
    .await?;

    let text = report::render_verification_report(&summary.records, Local::now().naive_local());
    report::write_report(&layout.verification_report(), &text).await?;

    info!(
        "Verified {} out of {} videos",
        summary.verified_count(),
        summary.records.len()
    );
    Ok(())
}

async fn list_files(dir: &Path) -> Result<Vec<String>, VerifyError> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn has_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected(value: serde_json::Value) -> Vec<ListingRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn touch(dir: &Path, names: &[&str]) {
        std::fs::create_dir_all(dir).unwrap();
        for name in names {
            std::fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[tokio::test]
    async fn test_missing_directory_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        std::fs::create_dir_all(layout.videos_dir()).unwrap();

        let summary = Verifier::default()
            .verify(&expected(json!([{"id": "gone", "title": "Gone"}])), &layout)
            .await
            .unwrap();

        assert_eq!(summary.records.len(), 1);
        assert!(!summary.records[0].verified);
        assert_eq!(summary.records[0].issues, vec![ISSUE_NO_DIRECTORY]);
        assert_eq!(summary.outcome(), VerificationOutcome::Warning { failed: 1 });
    }

    #[tokio::test]
    async fn test_complete_directory_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        touch(
            &layout.video_dir("ok"),
            &[
                "Title.mp4",
                "metadata.json",
                "Title.info.json",
                "Title.description",
                "Title.webp",
            ],
        );

        let summary = Verifier::default()
            .verify(&expected(json!([{"id": "ok", "title": "Title"}])), &layout)
            .await
            .unwrap();

        let record = &summary.records[0];
        assert!(record.verified);
        assert!(record.issues.is_empty());
        assert_eq!(record.video_file.as_deref(), Some("Title.mp4"));
        assert_eq!(summary.outcome(), VerificationOutcome::Verified);
    }

    #[tokio::test]
    async fn test_each_missing_artifact_is_one_issue() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        touch(&layout.video_dir("partial"), &["metadata.json", "Title.mp4.part"]);

        let summary = Verifier::default()
            .verify(&expected(json!([{"id": "partial"}])), &layout)
            .await
            .unwrap();

        assert_eq!(
            summary.records[0].issues,
            vec![ISSUE_NO_MEDIA, ISSUE_NO_INFO, ISSUE_NO_DESCRIPTION, ISSUE_NO_THUMBNAIL]
        );
        assert!(summary.records[0].video_file.is_none());
    }

    #[tokio::test]
    async fn test_record_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        std::fs::create_dir_all(layout.videos_dir()).unwrap();

        let summary = Verifier::default()
            .verify(&expected(json!([{"title": "Nameless"}])), &layout)
            .await
            .unwrap();
        assert_eq!(summary.records[0].issues, vec![ISSUE_NO_ID]);
    }

    #[tokio::test]
    async fn test_missing_videos_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());

        let err = Verifier::default().verify(&[], &layout).await.unwrap_err();
        assert!(matches!(err, VerifyError::MissingDownloads(_)));
    }

    #[tokio::test]
    async fn test_run_writes_results_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        std::fs::create_dir_all(layout.metadata_dir()).unwrap();
        std::fs::create_dir_all(layout.videos_dir()).unwrap();
        std::fs::write(
            layout.videos_metadata(),
            r#"[{"id": "gone", "title": "Gone"}]"#,
        )
        .unwrap();

        let summary = Verifier::default().run(&layout).await.unwrap();
        assert_eq!(summary.verified_count(), 0);

        let written: Vec<VerificationRecord> = serde_json::from_str(
            &std::fs::read_to_string(layout.verification_results()).unwrap(),
        )
        .unwrap();
        assert_eq!(written, summary.records);

        let text = std::fs::read_to_string(layout.verification_report()).unwrap();
        assert!(text.contains("Summary: 0 out of 1 videos verified"));
        assert!(text.contains("  - Video directory not found"));
    }
}
