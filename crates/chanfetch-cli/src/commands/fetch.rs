use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use crate::args::ChannelOptions;
use chanfetch_client::YtDlpClient;
use chanfetch_core::{
    fetch::{ChannelFetcher, FetchOptions},
    Config,
};

/// Exit status after Ctrl-C, as a shell reports SIGINT
const INTERRUPTED: u8 = 130;

pub async fn run(url: &str, options: &ChannelOptions, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.base_directory.join("downloads"));
    let delay = match options.delay {
        Some(delay) => delay,
        None => config.delay()?,
    };

    let client = YtDlpClient::new(config.yt_dlp_path()?);
    let fetcher = ChannelFetcher::new(
        client,
        FetchOptions {
            output_dir: output_dir.clone(),
            skip_shorts: !(options.include_shorts || config.download.include_shorts),
            delay,
        },
    );

    info!("Saving into {}", output_dir.display());

    tokio::select! {
        result = fetcher.download_all(url) => {
            let summary = result.context("Channel download failed")?;
            println!(
                "\nDownload complete. Successfully downloaded {} out of {} videos.",
                summary.succeeded, summary.total
            );
            Ok(ExitCode::SUCCESS)
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nProcess interrupted by user.");
            Ok(ExitCode::from(INTERRUPTED))
        }
    }
}
