//! Individual pipeline steps, each using the configured defaults

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use chanfetch_core::{
    classifier,
    downloader::{self, Downloader},
    lister::ChannelLister,
    report,
    verifier::{VerificationOutcome, Verifier},
    Config,
};

pub async fn list(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let layout = config.layout();

    let lister = ChannelLister::new(config.yt_dlp_path()?);
    let listing = lister
        .list(&config.channel.url, &layout)
        .await
        .context("Failed to access channel information")?;

    println!(
        "Channel information saved to {} ({} entries)",
        listing.path.display(),
        listing.entries
    );
    Ok(ExitCode::SUCCESS)
}

pub async fn classify(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let layout = config.layout();

    let classified = classifier::extract_metadata(&layout, &config.channel.url)
        .await
        .context("Failed to extract video metadata")?;

    println!(
        "Found {} videos and {} shorts",
        classified.videos.len(),
        classified.shorts.len()
    );
    println!(
        "Metadata saved to {} and {}",
        layout.videos_metadata().display(),
        layout.shorts_metadata().display()
    );
    Ok(ExitCode::SUCCESS)
}

pub async fn download(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let layout = config.layout();

    let mut videos = downloader::load_records(&layout.videos_metadata())
        .await
        .context("Failed to read video metadata")?;
    if config.download.include_shorts {
        let shorts = downloader::load_records(&layout.shorts_metadata())
            .await
            .context("Failed to read shorts metadata")?;
        videos.extend(shorts);
    }

    let downloader = Downloader::new(config.yt_dlp_path()?)
        .with_format(config.download.format.clone())
        .with_delay(config.delay()?);
    let batch = downloader
        .download_all(&videos, &layout)
        .await
        .context("Failed to download videos and metadata")?;

    println!("\n=== Download Complete ===");
    println!("Succeeded: {}", batch.succeeded.len());
    println!("Failed: {}", batch.failed.len());
    println!("Skipped: {}", batch.skipped.len());

    if !batch.failed.is_empty() {
        println!("\nFailed videos:");
        for failure in &batch.failed {
            println!("  {} - {}", failure.id, failure.error);
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub async fn verify(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let layout = config.layout();

    let summary = Verifier::new(&config.verify)
        .run(&layout)
        .await
        .context("Error during verification")?;

    println!(
        "Verified {} out of {} videos",
        summary.verified_count(),
        summary.records.len()
    );
    println!("Report: {}", layout.verification_report().display());

    match summary.outcome() {
        VerificationOutcome::Verified => {
            println!("All videos successfully verified");
            Ok(ExitCode::SUCCESS)
        }
        VerificationOutcome::Warning { failed } => {
            println!("Warning: {} videos failed verification", failed);
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn report(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let layout = config.layout();

    let path = report::report_from_disk(&layout, &config.channel.url)
        .await
        .context("Failed to create summary report")?;

    println!("Summary report written to {}", path.display());
    Ok(ExitCode::SUCCESS)
}
