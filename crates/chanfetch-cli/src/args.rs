use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "chanfetch")]
#[command(author, version, about = "Download every video and its metadata from a YouTube channel")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Step 1: dump the channel listing to metadata/channel_raw_info.json
    List,

    /// Step 2: split the listing into videos and shorts
    Classify,

    /// Step 3: download every classified video with its sidecar files
    Download,

    /// Step 4: check downloaded artifacts against the classified videos
    Verify,

    /// Step 5: write the final summary report
    Report,

    /// Run all five steps in order
    Run {
        /// YouTube channel URL (defaults to the configured channel)
        #[arg(value_name = "URL")]
        url: Option<String>,

        #[command(flatten)]
        options: ChannelOptions,
    },

    /// Download a channel directly, skipping the listing/verification pipeline
    Fetch {
        /// YouTube channel URL
        url: String,

        #[command(flatten)]
        options: ChannelOptions,
    },

    /// Check external dependencies
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ChannelOptions {
    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include YouTube Shorts in the download
    #[arg(long)]
    pub include_shorts: bool,

    /// Delay between video downloads, in seconds
    #[arg(short, long, value_parser = parse_delay)]
    pub delay: Option<Duration>,
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| "delay must be a non-negative number of seconds within range".to_string())
}
