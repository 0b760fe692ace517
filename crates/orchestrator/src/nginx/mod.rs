//! Reverse-proxy configuration management
//!
//! Owns the on-disk lifecycle of one domain's nginx config file and the
//! control path to the daemon itself.
//!
//! # Components
//!
//! - [`SiteConfig`] - per-domain config file manager: template rendering,
//!   backup/restore, upstream port discovery
//! - [`ProxyControl`] - external syntax check and reload, injected behind
//!   the command-runner seam so flows are testable without a daemon
//!
//! # File Layout
//!
//! ```text
//! /etc/nginx/sites-enabled/
//! ├── example.com.conf          # live config
//! └── example.com.conf.bak      # only while a backup is outstanding
//! ```
//!
//! Backup/restore is the safety net around the only step that mutates a file
//! the live proxy is actively using. Every mutating flow step is paired with
//! a prior backup and a restore path on downstream failure; at most one
//! backup exists per domain at a time.

mod control;
mod error;
mod site;

pub use control::ProxyControl;
pub use error::NginxError;
pub use site::SiteConfig;
