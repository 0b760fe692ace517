//! Unattended renewal scan.
//!
//! Lists the certificate inventory, selects every certificate within the
//! configured number of days of expiry, maps each back to a domain selector
//! against the primary domain, and runs the update flow for the matches,
//! one full transactional flow at a time.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use certflow_common::{CommandRunner, DomainSelector};
use certflow_config::Settings;

use super::engine::{FlowReport, Orchestrator};
use crate::certbot::{CertbotClient, CertbotError, CertificateRecord};

/// Select the domains whose certificates are due for renewal.
///
/// A certificate is due when `expiry - now <= threshold_days`. Records whose
/// domains string matches neither the primary domain nor one of its
/// subdomains are skipped; unrelated certificates on the host are expected.
/// Order of the selection follows the inventory order.
pub fn select_due(
    records: &[CertificateRecord],
    primary: &str,
    threshold_days: i64,
    now: DateTime<Utc>,
) -> Vec<DomainSelector> {
    let threshold = Duration::days(threshold_days);
    let mut due = Vec::new();

    for record in records {
        let remaining = record.expiry.with_timezone(&Utc) - now;
        if remaining > threshold {
            debug!(
                domains = %record.domains,
                days_remaining = remaining.num_days(),
                "Certificate still valid"
            );
            continue;
        }

        match DomainSelector::from_inventory_domains(&record.domains, primary) {
            Some(selector) => {
                info!(
                    domains = %record.domains,
                    days_remaining = remaining.num_days(),
                    "Certificate due for renewal"
                );
                due.push(selector);
            }
            None => {
                debug!(
                    domains = %record.domains,
                    "Skipping certificate outside the primary domain"
                );
            }
        }
    }

    due
}

/// Run the full scan-and-renew flow.
pub fn run_cron(
    settings: &Settings,
    runner: &dyn CommandRunner,
) -> Result<Vec<FlowReport>, CertbotError> {
    info!(threshold_days = settings.cron_days, "Running renewal scan");

    let client = CertbotClient::new(runner, settings.webroot.clone());
    let records = client.list_certificates()?;
    let due = select_due(&records, &settings.domain, settings.cron_days, Utc::now());

    let mut reports = Vec::with_capacity(due.len());
    for selector in due {
        let mut orchestrator = Orchestrator::new(settings, &selector, runner);
        reports.push(orchestrator.update());
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use certflow_common::{CommandOutput, ExecError};
    use certflow_config::SettingsPaths;
    use crate::flows::FlowStatus;
    use chrono::{FixedOffset, TimeZone};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn record(domains: &str, expiry: DateTime<FixedOffset>) -> CertificateRecord {
        CertificateRecord {
            name: domains.to_string(),
            serial_number: "01".to_string(),
            key_type: "ECDSA".to_string(),
            domains: domains.to_string(),
            expiry,
            certificate_path: PathBuf::from("/c.pem"),
            private_key_path: PathBuf::from("/k.pem"),
        }
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_select_within_threshold() {
        let records = vec![
            record("api.example.com", at(2026, 8, 9)),  // 3 days out
            record("example.com", at(2026, 9, 5)),      // 30 days out
        ];

        let due = select_due(&records, "example.com", 5, now());

        assert_eq!(due, vec![DomainSelector::Sub("api".to_string())]);
    }

    #[test]
    fn test_select_expired_certificate() {
        let records = vec![record("example.com", at(2026, 8, 1))];

        let due = select_due(&records, "example.com", 5, now());

        assert_eq!(due, vec![DomainSelector::Main]);
    }

    #[test]
    fn test_select_skips_unrelated_domains() {
        let records = vec![
            record("other.net", at(2026, 8, 7)),
            record("notexample.com", at(2026, 8, 7)),
        ];

        let due = select_due(&records, "example.com", 5, now());

        assert!(due.is_empty());
    }

    /// Runner that serves a canned inventory for `certbot certificates` and
    /// succeeds at everything else.
    struct InventoryRunner {
        inventory: String,
        calls: Mutex<Vec<String>>,
    }

    impl CommandRunner for InventoryRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {}", program, args.join(" ")));

            let stdout = if program == "certbot" && args == ["certificates"] {
                self.inventory.clone()
            } else {
                String::new()
            };

            Ok(CommandOutput {
                success: true,
                stdout,
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn test_run_cron_renews_due_domain() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("service.tmpl"),
            "server { proxy_pass http://127.0.0.1:{{PORT}}; }",
        )
        .unwrap();
        fs::write(
            dir.path().join("acme.tmpl"),
            "server { server_name {{DOMAIN}}; }",
        )
        .unwrap();
        let original = "server { server_name api.example.com; proxy_pass http://127.0.0.1:3000; }";
        fs::write(dir.path().join("api.example.com.conf"), original).unwrap();

        let settings = Settings {
            domain: "example.com".to_string(),
            email: "admin@example.com".to_string(),
            cron_days: 5,
            webroot: "/var/www/cert_bot".to_string(),
            paths: SettingsPaths {
                nginx: dir.path().to_path_buf(),
                template: dir.path().join("service.tmpl"),
                acme_template: dir.path().join("acme.tmpl"),
            },
        };

        // Expired long ago, so it is due regardless of the wall clock.
        let runner = InventoryRunner {
            inventory: "\
Certificate Name: api.example.com
Serial Number: 01
Key Type: ECDSA
Domains: api.example.com
Expiry Date: 2024-01-01 00:00:00+00:00 (INVALID: EXPIRED)
Certificate Path: /c.pem
Private Key Path: /k.pem
"
            .to_string(),
            calls: Mutex::new(Vec::new()),
        };

        let reports = run_cron(&settings, &runner).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].domain, "api.example.com");
        assert_eq!(reports[0].status, FlowStatus::Completed);
        assert_eq!(
            fs::read_to_string(dir.path().join("api.example.com.conf")).unwrap(),
            original
        );
        assert!(runner
            .calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.starts_with("certbot certonly")));
    }

    #[test]
    fn test_selection_preserves_inventory_order() {
        let records = vec![
            record("b.example.com", at(2026, 8, 7)),
            record("example.com", at(2026, 8, 7)),
            record("a.example.com", at(2026, 8, 7)),
        ];

        let due = select_due(&records, "example.com", 5, now());

        assert_eq!(
            due,
            vec![
                DomainSelector::Sub("b".to_string()),
                DomainSelector::Main,
                DomainSelector::Sub("a".to_string()),
            ]
        );
    }
}
