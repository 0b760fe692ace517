//! Error types for proxy configuration management.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`SiteConfig`](super::SiteConfig) operations.
#[derive(Debug, Error)]
pub enum NginxError {
    /// The domain's config file does not exist.
    #[error("no config file exists for {domain}")]
    ConfigMissing { domain: String },

    /// No upstream port could be determined from an existing config.
    #[error("no upstream port found in config for {domain}")]
    PortNotFound { domain: String },

    /// A required template file is absent.
    #[error("template not found: {path}")]
    TemplateMissing { path: PathBuf },

    /// Filesystem operation failed.
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
