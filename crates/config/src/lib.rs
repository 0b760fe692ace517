//! Certflow settings document.
//!
//! Loads and validates the JSON settings file shared by every certflow
//! invocation:
//!
//! ```json
//! {
//!     "domain": "example.com",
//!     "email": "admin@example.com",
//!     "cron_days": 14,
//!     "webroot": "/var/www/cert_bot",
//!     "paths": {
//!         "nginx": "/etc/nginx/sites-enabled",
//!         "template": "/etc/certflow/service.conf.tmpl",
//!         "acme_template": "/etc/certflow/acme_challenge.conf.tmpl"
//!     }
//! }
//! ```
//!
//! `webroot` is optional and defaults to `/var/www/cert_bot`; everything
//! else is required. The document is validated immediately after parsing so
//! a broken settings file fails the run before any proxy state is touched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading or validating the settings document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the expected schema.
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but one of its values is unusable.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Filesystem paths the orchestrator operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsPaths {
    /// Directory holding one proxy config file per domain.
    pub nginx: PathBuf,
    /// Template for the final service config (`{{DOMAIN}}`, `{{PORT}}`).
    pub template: PathBuf,
    /// Template for the transient ACME challenge config (`{{DOMAIN}}`).
    pub acme_template: PathBuf,
}

/// The certflow settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Primary domain; all other handled domains are subdomains of it.
    pub domain: String,

    /// Contact email passed to the ACME client.
    pub email: String,

    /// Renewal threshold in days for the cron flow.
    pub cron_days: i64,

    /// Webroot directory served for HTTP-01 challenge files.
    #[serde(default = "default_webroot")]
    pub webroot: String,

    /// Filesystem paths.
    pub paths: SettingsPaths,
}

fn default_webroot() -> String {
    "/var/www/cert_bot".to_string()
}

impl Settings {
    /// Load and validate a settings document from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        settings.validate()?;

        debug!(
            domain = %settings.domain,
            cron_days = settings.cron_days,
            nginx_dir = %settings.paths.nginx.display(),
            "Loaded settings"
        );

        Ok(settings)
    }

    /// Check the loaded document for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.is_empty() || self.domain.starts_with('.') || self.domain.ends_with('.') {
            return Err(ConfigError::Invalid(format!(
                "primary domain {:?} is not a usable hostname",
                self.domain
            )));
        }

        if !self.email.contains('@') {
            return Err(ConfigError::Invalid(format!(
                "contact email {:?} is not an email address",
                self.email
            )));
        }

        if self.cron_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "cron_days must be non-negative, got {}",
                self.cron_days
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_settings(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"{
        "domain": "example.com",
        "email": "admin@example.com",
        "cron_days": 14,
        "paths": {
            "nginx": "/etc/nginx/sites-enabled",
            "template": "/etc/certflow/service.conf.tmpl",
            "acme_template": "/etc/certflow/acme_challenge.conf.tmpl"
        }
    }"#;

    #[test]
    fn test_load_valid_settings() {
        let file = write_settings(VALID);
        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.domain, "example.com");
        assert_eq!(settings.email, "admin@example.com");
        assert_eq!(settings.cron_days, 14);
        assert_eq!(
            settings.paths.nginx,
            PathBuf::from("/etc/nginx/sites-enabled")
        );
    }

    #[test]
    fn test_webroot_defaults() {
        let file = write_settings(VALID);
        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.webroot, "/var/www/cert_bot");
    }

    #[test]
    fn test_webroot_override() {
        let json = VALID.replacen(
            "\"cron_days\": 14,",
            "\"cron_days\": 14, \"webroot\": \"/srv/challenges\",",
            1,
        );
        let file = write_settings(&json);
        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.webroot, "/srv/challenges");
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let file = write_settings(r#"{"domain": "example.com"}"#);
        let result = Settings::load(file.path());

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Settings::load(Path::new("/nonexistent/certflow.json"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_bad_email_rejected() {
        let json = VALID.replace("admin@example.com", "not-an-email");
        let file = write_settings(&json);

        assert!(matches!(
            Settings::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_negative_cron_days_rejected() {
        let json = VALID.replace("\"cron_days\": 14", "\"cron_days\": -1");
        let file = write_settings(&json);

        assert!(matches!(
            Settings::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
