//! chanfetch-core: listing, download, verification and reporting for a YouTube channel

pub mod classifier;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod lister;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod verifier;

pub use config::{Config, Layout};
pub use error::{ChanfetchError, Result};
