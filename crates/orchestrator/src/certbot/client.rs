//! Certbot invocation.

use certflow_common::CommandRunner;
use tracing::{debug, error, info, warn};

use super::error::CertbotError;
use super::inventory::{parse_inventory, CertificateRecord};

/// Client for the external certbot binary.
pub struct CertbotClient<'r> {
    runner: &'r dyn CommandRunner,
    webroot: String,
}

impl<'r> CertbotClient<'r> {
    /// Create a client that serves HTTP-01 challenge files from `webroot`.
    pub fn new(runner: &'r dyn CommandRunner, webroot: impl Into<String>) -> Self {
        Self {
            runner,
            webroot: webroot.into(),
        }
    }

    /// Request a certificate for `domain` non-interactively.
    ///
    /// Success is determined solely by the exit status. Certbot's own
    /// diagnostics go to the log on failure; callers only see the boolean,
    /// which the flows treat as recoverable.
    pub fn request_certificate(&self, domain: &str, email: &str) -> bool {
        let args = [
            "certonly",
            "--webroot",
            "-w",
            self.webroot.as_str(),
            "-d",
            domain,
            "--email",
            email,
            "--agree-tos",
            "--non-interactive",
        ];

        match self.runner.run("certbot", &args) {
            Ok(output) if output.success => {
                info!(domain = %domain, "Certificate obtained");
                true
            }
            Ok(output) => {
                error!(domain = %domain, "Failed to obtain certificate");
                error!(stderr = %output.stderr.trim(), "Certbot stderr");
                error!(stdout = %output.stdout.trim(), "Certbot stdout");
                false
            }
            Err(e) => {
                error!(domain = %domain, error = %e, "Failed to invoke certbot");
                false
            }
        }
    }

    /// List the current certificate inventory.
    pub fn list_certificates(&self) -> Result<Vec<CertificateRecord>, CertbotError> {
        let output = self.runner.run("certbot", &["certificates"])?;
        if !output.success {
            warn!(
                stderr = %output.stderr.trim(),
                "certbot certificates exited unsuccessfully, parsing output anyway"
            );
        }

        let records = parse_inventory(&output.stdout)?;
        debug!(count = records.len(), "Found existing certificate(s)");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certflow_common::{CommandOutput, ExecError};
    use std::sync::Mutex;

    struct ScriptedRunner {
        success: bool,
        stdout: String,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(success: bool, stdout: &str) -> Self {
            Self {
                success,
                stdout: stdout.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {}", program, args.join(" ")));
            Ok(CommandOutput {
                success: self.success,
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn test_request_certificate_command_shape() {
        let runner = ScriptedRunner::new(true, "");
        let client = CertbotClient::new(&runner, "/var/www/cert_bot");

        assert!(client.request_certificate("api.example.com", "admin@example.com"));

        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            ["certbot certonly --webroot -w /var/www/cert_bot -d api.example.com \
              --email admin@example.com --agree-tos --non-interactive"]
        );
    }

    #[test]
    fn test_request_certificate_failure_is_false() {
        let runner = ScriptedRunner::new(false, "");
        let client = CertbotClient::new(&runner, "/var/www/cert_bot");

        assert!(!client.request_certificate("api.example.com", "admin@example.com"));
    }

    #[test]
    fn test_list_certificates_parses_stdout() {
        let inventory = "\
Certificate Name: example.com
Serial Number: 01
Key Type: ECDSA
Domains: example.com
Expiry Date: 2026-09-10 12:00:00+00:00 (VALID: 35 days)
Certificate Path: /c.pem
Private Key Path: /k.pem
";
        let runner = ScriptedRunner::new(true, inventory);
        let client = CertbotClient::new(&runner, "/var/www/cert_bot");

        let records = client.list_certificates().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "example.com");
        assert_eq!(
            runner.calls.lock().unwrap().as_slice(),
            ["certbot certificates"]
        );
    }
}
