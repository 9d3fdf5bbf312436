//! Channel enumeration using yt-dlp

use crate::config::Layout;
use crate::error::ListError;
use std::path::PathBuf;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug)]
pub struct ChannelLister {
    yt_dlp_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ListingSummary {
    pub path: PathBuf,
    /// Number of non-empty records in the raw listing
    pub entries: usize,
}

impl ChannelLister {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    /// Dump the flat channel listing to `metadata/channel_raw_info.json`
    pub async fn list(&self, channel_url: &str, layout: &Layout) -> Result<ListingSummary, ListError> {
        info!("Accessing channel: {}", channel_url);

        fs::create_dir_all(layout.metadata_dir()).await?;

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--flat-playlist", channel_url])
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ListError::ToolNotFound,
                _ => ListError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(ListError::ToolFailed {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        let path = layout.raw_listing();
        fs::write(&path, &output.stdout).await?;

        let entries = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count();

        info!("Channel information saved to {} ({} entries)", path.display(), entries);
        Ok(ListingSummary { path, entries })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        let stub = dir.join("yt-dlp");
        std::fs::write(&stub, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();
        stub
    }

    #[tokio::test]
    async fn test_list_writes_stdout_verbatim() {
        let tools = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let stub = write_stub(
            tools.path(),
            "echo '{\"id\": \"a\"}'\necho '{\"id\": \"b\"}'\n",
        );

        let layout = Layout::new(out.path());
        let summary = ChannelLister::new(stub)
            .list("https://www.youtube.com/@chan", &layout)
            .await
            .unwrap();

        assert_eq!(summary.entries, 2);
        let raw = std::fs::read_to_string(layout.raw_listing()).unwrap();
        assert_eq!(raw, "{\"id\": \"a\"}\n{\"id\": \"b\"}\n");
    }

    #[tokio::test]
    async fn test_list_reports_stderr_on_failure() {
        let tools = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let stub = write_stub(tools.path(), "echo 'ERROR: channel does not exist' >&2\nexit 2\n");

        let layout = Layout::new(out.path());
        let err = ChannelLister::new(stub)
            .list("https://www.youtube.com/@missing", &layout)
            .await
            .unwrap_err();

        match err {
            ListError::ToolFailed { code, stderr } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "ERROR: channel does not exist");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!layout.raw_listing().exists());
    }
}
