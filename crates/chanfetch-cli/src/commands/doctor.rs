use anyhow::Result;
use std::path::Path;
use std::process::{Command, ExitCode};
use which::which;

use chanfetch_core::Config;

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    println!("chanfetch dependency check\n");

    let mut all_ok = true;

    // yt-dlp does the listing and the downloads
    print!("yt-dlp:  ");
    match config.yt_dlp_path() {
        Ok(path) => match Command::new(&path).arg("--version").output() {
            Ok(out) if out.status.success() => {
                let v = String::from_utf8_lossy(&out.stdout);
                println!("OK ({}, {})", v.trim(), path.display());
            }
            Ok(_) | Err(_) => {
                println!("FOUND at {} but failed to get version", path.display());
                all_ok = false;
            }
        },
        Err(_) => {
            println!("NOT FOUND");
            println!("         Install with: pip install yt-dlp");
            println!("         or set paths.yt_dlp / CHANFETCH_PATHS__YT_DLP");
            all_ok = false;
        }
    }

    // Only needed when the format selector merges separate streams
    print!("ffmpeg:  ");
    match which("ffmpeg") {
        Ok(path) => {
            let first_line = Command::new(&path)
                .arg("-version")
                .output()
                .ok()
                .and_then(|out| {
                    String::from_utf8_lossy(&out.stdout)
                        .lines()
                        .next()
                        .map(str::to_string)
                })
                .unwrap_or_default();
            let version = first_line.split_whitespace().nth(2).unwrap_or("unknown");
            println!("OK ({})", version);
        }
        Err(_) => {
            println!("NOT FOUND (optional)");
            if config.download.format != "best" {
                println!(
                    "         Format `{}` may need ffmpeg to merge streams",
                    config.download.format
                );
            }
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
        Ok(ExitCode::FAILURE)
    }
}
