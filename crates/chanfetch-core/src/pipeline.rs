//! Five-step orchestration: list, classify, download, verify, report

use crate::classifier::{self, ClassifiedMetadata};
use crate::config::{Layout, VerifyConfig};
use crate::downloader::{BatchReport, Downloader};
use crate::error::ChanfetchError;
use crate::lister::ChannelLister;
use crate::record::ListingRecord;
use crate::report;
use crate::verifier::{self, VerificationOutcome, VerificationSummary, Verifier};

use chrono::Local;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub channel_url: String,
    pub layout: Layout,
    pub yt_dlp_path: PathBuf,
    pub format: String,
    pub include_shorts: bool,
    pub delay: Duration,
    pub verify: VerifyConfig,
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Listing { channel: String },
    Classifying,
    Downloading { videos: usize },
    Verifying,
    Reporting,
    Warning { stage: String, message: String },
    Complete { duration: Duration },
    Failed { stage: String, error: String },
}

/// Result of a full run; advisory step failures end up in `warnings`
#[derive(Debug, Clone)]
pub struct RunReport {
    pub listed: usize,
    pub classified: ClassifiedMetadata,
    pub batch: BatchReport,
    pub verification: Option<VerificationSummary>,
    pub report_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Main processing pipeline
pub struct Pipeline {
    config: PipelineConfig,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, progress_tx: mpsc::Sender<PipelineStage>) -> Self {
        Self { config, progress_tx }
    }

    async fn emit(&self, stage: PipelineStage) {
        let _ = self.progress_tx.send(stage).await;
    }

    async fn fail<E: Into<ChanfetchError>>(&self, stage: &str, error: E) -> ChanfetchError {
        let error = error.into();
        self.emit(PipelineStage::Failed {
            stage: stage.to_string(),
            error: error.to_string(),
        })
        .await;
        error
    }

    async fn warn(&self, stage: &str, message: String, warnings: &mut Vec<String>) {
        warn!("{}: {}", stage, message);
        self.emit(PipelineStage::Warning {
            stage: stage.to_string(),
            message: message.clone(),
        })
        .await;
        warnings.push(message);
    }

    pub async fn run(&self) -> Result<RunReport, ChanfetchError> {
        let start_time = Instant::now();
        let layout = &self.config.layout;
        let mut warnings = Vec::new();

        info!("Starting download process for channel: {}", self.config.channel_url);

        // 1. List the channel
        self.emit(PipelineStage::Listing {
            channel: self.config.channel_url.clone(),
        })
        .await;

        let lister = ChannelLister::new(self.config.yt_dlp_path.clone());
        let listing = match lister.list(&self.config.channel_url, layout).await {
            Ok(listing) => listing,
            Err(e) => return Err(self.fail("list", e).await),
        };

        // 2. Classify
        self.emit(PipelineStage::Classifying).await;

        let classified = match classifier::extract_metadata(layout, &self.config.channel_url).await {
            Ok(classified) => classified,
            Err(e) => return Err(self.fail("classify", e).await),
        };

        // 3. Download
        let targets: Vec<ListingRecord> = if self.config.include_shorts {
            classified.videos.iter().chain(&classified.shorts).cloned().collect()
        } else {
            classified.videos.clone()
        };

        self.emit(PipelineStage::Downloading {
            videos: targets.len(),
        })
        .await;

        let downloader = Downloader::new(self.config.yt_dlp_path.clone())
            .with_format(self.config.format.clone())
            .with_delay(self.config.delay);
        let batch = match downloader.download_all(&targets, layout).await {
            Ok(batch) => batch,
            Err(e) => return Err(self.fail("download", e).await),
        };

        // 4. Verify (advisory)
        self.emit(PipelineStage::Verifying).await;

        let verifier = Verifier::new(&self.config.verify);
        let verification = match verifier.verify(&targets, layout).await {
            Ok(summary) => {
                if let Err(e) = verifier::write_results(&summary, layout).await {
                    self.warn("verify", e.to_string(), &mut warnings).await;
                }
                if let VerificationOutcome::Warning { failed } = summary.outcome() {
                    self.warn(
                        "verify",
                        format!("{} videos failed verification", failed),
                        &mut warnings,
                    )
                    .await;
                }
                Some(summary)
            }
            Err(e) => {
                self.warn("verify", e.to_string(), &mut warnings).await;
                None
            }
        };

        // 5. Report (advisory)
        self.emit(PipelineStage::Reporting).await;

        let text = report::render_run_report(
            &self.config.channel_url,
            &classified,
            Some(&batch),
            verification.as_ref(),
            Local::now().naive_local(),
        );
        let report_path = layout.run_report();
        let report_path = match report::write_report(&report_path, &text).await {
            Ok(()) => Some(report_path),
            Err(e) => {
                self.warn("report", e.to_string(), &mut warnings).await;
                None
            }
        };

        let duration = start_time.elapsed();
        info!("Download process completed ({:.1}s)", duration.as_secs_f32());

        self.emit(PipelineStage::Complete { duration }).await;

        Ok(RunReport {
            listed: listing.entries,
            classified,
            batch,
            verification,
            report_path,
            warnings,
        })
    }
}
