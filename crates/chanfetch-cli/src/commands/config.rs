use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use chanfetch_core::Config;

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    println!("chanfetch configuration\n");

    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered.trim_end());

    if config.paths.yt_dlp.is_none() {
        match config.yt_dlp_path() {
            Ok(p) => println!("\n# yt-dlp auto-detected at {}", p.display()),
            Err(_) => println!("\n# yt-dlp not configured and not found in PATH"),
        }
    }

    // Show config file locations
    println!("\nConfig sources (later entries override earlier ones):");
    println!("  1. Built-in defaults");
    if let Some(config_dir) = dirs::config_dir() {
        println!("  2. {}/chanfetch/config.toml", config_dir.display());
    }
    if let Some(p) = config_path {
        println!("  3. {} (specified)", p.display());
    }
    println!("  4. Environment variables (CHANFETCH_*, `__` separates sections)");

    Ok(ExitCode::SUCCESS)
}
