use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::args::ChannelOptions;
use chanfetch_core::{
    pipeline::{Pipeline, PipelineConfig, PipelineStage},
    Config, Layout,
};

pub async fn run(
    url: Option<&str>,
    options: &ChannelOptions,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    let channel_url = url
        .map(String::from)
        .unwrap_or_else(|| config.channel.url.clone());
    let base_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.base_directory.clone());
    let delay = match options.delay {
        Some(delay) => delay,
        None => config.delay()?,
    };

    let pipeline_config = PipelineConfig {
        channel_url: channel_url.clone(),
        layout: Layout::new(base_dir.clone()),
        yt_dlp_path: config.yt_dlp_path()?,
        format: config.download.format.clone(),
        include_shorts: options.include_shorts || config.download.include_shorts,
        delay,
        verify: config.verify.clone(),
    };
    let layout = pipeline_config.layout.clone();

    println!("YouTube Channel Downloader");
    println!("==========================");
    println!("Channel: {}", channel_url);
    println!("Output:  {}\n", base_dir.display());

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.cyan} [{elapsed_precise}] {msg}",
    )?);
    pb.enable_steady_tick(Duration::from_millis(100));

    // Spawn progress handler
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Listing { channel } => {
                    pb.set_message(format!("Step 1: Accessing {}...", channel));
                }
                PipelineStage::Classifying => {
                    pb.set_message("Step 2: Extracting video metadata...");
                }
                PipelineStage::Downloading { videos } => {
                    pb.set_message(format!("Step 3: Downloading {} videos...", videos));
                }
                PipelineStage::Verifying => {
                    pb.set_message("Step 4: Verifying downloads...");
                }
                PipelineStage::Reporting => {
                    pb.set_message("Step 5: Creating summary report...");
                }
                PipelineStage::Warning { stage, message } => {
                    pb.println(format!("Warning ({}): {}", stage, message));
                }
                PipelineStage::Complete { duration } => {
                    pb.finish_with_message(format!(
                        "Done ({:.1}s)",
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    // Run pipeline; dropping it closes the progress channel
    let pipeline = Pipeline::new(pipeline_config, tx);
    let result = pipeline.run().await;
    drop(pipeline);

    progress_handle.await?;

    let report = result?;

    println!("\nListed {} entries", report.listed);
    println!(
        "Videos: {}, shorts: {}",
        report.classified.videos.len(),
        report.classified.shorts.len()
    );
    println!(
        "Downloaded {} of {} attempted ({} skipped)",
        report.batch.succeeded.len(),
        report.batch.attempted,
        report.batch.skipped.len()
    );
    if let Some(ref verification) = report.verification {
        println!(
            "Verified {} out of {} videos",
            verification.verified_count(),
            verification.records.len()
        );
    }

    if let Some(ref path) = report.report_path {
        println!("\nDownload process completed, report written to {}", path.display());
    }
    println!("Results are available in the following directories:");
    println!("  - Downloaded videos: {}", layout.videos_dir().display());
    println!("  - Reports: {}", layout.reports_dir().display());

    Ok(ExitCode::SUCCESS)
}
