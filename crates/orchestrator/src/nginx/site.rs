//! Per-domain proxy config file management.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use super::error::NginxError;

/// `proxy_pass` directive with an explicit upstream port.
static PROXY_PASS_WITH_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"proxy_pass\s+https?://[^:\s]+:(\d+);").expect("valid regex"));

/// `proxy_pass` directive with scheme and host only.
static PROXY_PASS_SCHEME_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"proxy_pass\s+(https?)://[^;\s/]+;").expect("valid regex"));

/// Placeholder tokens substituted literally into templates.
const DOMAIN_PLACEHOLDER: &str = "{{DOMAIN}}";
const PORT_PLACEHOLDER: &str = "{{PORT}}";

/// Manages one domain's proxy configuration file.
///
/// The config lives at `<dir>/<domain>.conf` with a `<domain>.conf.bak`
/// sibling while a backup is outstanding. All operations are plain
/// synchronous filesystem calls; nothing here touches the daemon (see
/// [`ProxyControl`](super::ProxyControl) for that).
#[derive(Debug)]
pub struct SiteConfig {
    domain: String,
    template_path: PathBuf,
    challenge_template_path: PathBuf,
    config_path: PathBuf,
    backup_path: PathBuf,
}

impl SiteConfig {
    /// Create a manager for `domain`'s config file under `nginx_dir`.
    pub fn new(
        domain: impl Into<String>,
        nginx_dir: &Path,
        template_path: impl Into<PathBuf>,
        challenge_template_path: impl Into<PathBuf>,
    ) -> Self {
        let domain = domain.into();
        let config_path = nginx_dir.join(format!("{domain}.conf"));
        let backup_path = nginx_dir.join(format!("{domain}.conf.bak"));

        Self {
            domain,
            template_path: template_path.into(),
            challenge_template_path: challenge_template_path.into(),
            config_path,
            backup_path,
        }
    }

    /// The domain this manager operates on.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Path of the live config file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Path of the backup file.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Whether the live config file exists.
    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Whether a backup is outstanding.
    pub fn backup_exists(&self) -> bool {
        self.backup_path.exists()
    }

    /// Discover the upstream port from the existing config.
    ///
    /// Searches for a `proxy_pass` directive. An explicit `host:port` target
    /// yields that port; a scheme-and-host-only target defaults to `443` for
    /// https and `80` for http. Returns [`NginxError::PortNotFound`] when no
    /// directive matches and [`NginxError::ConfigMissing`] when there is no
    /// config file at all.
    pub fn upstream_port(&self) -> Result<String, NginxError> {
        if !self.exists() {
            return Err(NginxError::ConfigMissing {
                domain: self.domain.clone(),
            });
        }

        let content = fs::read_to_string(&self.config_path)?;

        if let Some(captures) = PROXY_PASS_WITH_PORT.captures(&content) {
            let port = captures[1].to_string();
            debug!(domain = %self.domain, port = %port, "Extracted upstream port");
            return Ok(port);
        }

        if let Some(captures) = PROXY_PASS_SCHEME_ONLY.captures(&content) {
            let port = if &captures[1] == "https" { "443" } else { "80" };
            debug!(
                domain = %self.domain,
                port = %port,
                "No explicit upstream port, defaulting from scheme"
            );
            return Ok(port.to_string());
        }

        Err(NginxError::PortNotFound {
            domain: self.domain.clone(),
        })
    }

    /// Render a template with this domain and an optional port.
    ///
    /// Substitution is literal: every `{{DOMAIN}}` occurrence becomes the
    /// domain, every `{{PORT}}` occurrence becomes the port when one is
    /// given. No escaping, no conditionals.
    pub fn render_template(
        &self,
        template_path: &Path,
        port: Option<&str>,
    ) -> Result<String, NginxError> {
        if !template_path.exists() {
            return Err(NginxError::TemplateMissing {
                path: template_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(template_path)?;
        let mut rendered = content.replace(DOMAIN_PLACEHOLDER, &self.domain);
        if let Some(port) = port {
            rendered = rendered.replace(PORT_PLACEHOLDER, port);
        }

        Ok(rendered)
    }

    /// Render the service template with `port` and overwrite the live config.
    pub fn write_service_config(&self, port: &str) -> Result<(), NginxError> {
        let rendered = self.render_template(&self.template_path, Some(port))?;
        fs::write(&self.config_path, rendered)?;
        info!(
            domain = %self.domain,
            path = %self.config_path.display(),
            "Service config written"
        );
        Ok(())
    }

    /// Render the ACME challenge template and overwrite the live config.
    ///
    /// The challenge template routes only validation-path traffic and takes
    /// no upstream port.
    pub fn write_challenge_config(&self) -> Result<(), NginxError> {
        let rendered = self.render_template(&self.challenge_template_path, None)?;
        fs::write(&self.config_path, rendered)?;
        info!(
            domain = %self.domain,
            path = %self.config_path.display(),
            "ACME challenge config written"
        );
        Ok(())
    }

    /// Copy the live config to the backup path.
    ///
    /// Overwrites any stale backup; at most one backup exists per domain.
    pub fn create_backup(&self) -> Result<(), NginxError> {
        if !self.exists() {
            return Err(NginxError::ConfigMissing {
                domain: self.domain.clone(),
            });
        }

        fs::copy(&self.config_path, &self.backup_path)?;
        info!(
            domain = %self.domain,
            path = %self.backup_path.display(),
            "Backup created"
        );
        Ok(())
    }

    /// Copy the backup over the live config, then delete the backup.
    ///
    /// This is the rollback primitive. It is safe to call unconditionally:
    /// with no backup outstanding it logs and returns `false` instead of
    /// failing the compensation path it runs on.
    pub fn restore_backup(&self) -> bool {
        if !self.backup_exists() {
            debug!(domain = %self.domain, "No backup to restore");
            return false;
        }

        if let Err(e) = fs::copy(&self.backup_path, &self.config_path) {
            warn!(
                domain = %self.domain,
                error = %e,
                "Failed to restore backup over live config"
            );
            return false;
        }
        info!(
            domain = %self.domain,
            path = %self.config_path.display(),
            "Backup restored"
        );

        if let Err(e) = fs::remove_file(&self.backup_path) {
            warn!(domain = %self.domain, error = %e, "Failed to delete restored backup");
        }

        true
    }

    /// Remove the live config if present.
    pub fn delete_config(&self) {
        if !self.exists() {
            return;
        }
        match fs::remove_file(&self.config_path) {
            Ok(()) => info!(
                domain = %self.domain,
                path = %self.config_path.display(),
                "Config deleted"
            ),
            Err(e) => warn!(domain = %self.domain, error = %e, "Failed to delete config"),
        }
    }

    /// Remove the backup if present.
    pub fn delete_backup(&self) {
        if !self.backup_exists() {
            return;
        }
        match fs::remove_file(&self.backup_path) {
            Ok(()) => info!(
                domain = %self.domain,
                path = %self.backup_path.display(),
                "Backup deleted"
            ),
            Err(e) => warn!(domain = %self.domain, error = %e, "Failed to delete backup"),
        }
    }
}
