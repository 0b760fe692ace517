//! External proxy daemon control.

use certflow_common::{CommandRunner, ExecError};
use tracing::{debug, error, info};

/// Validate/reload capability for the external proxy daemon.
///
/// Stateless: both operations shell out through the injected
/// [`CommandRunner`], return `true` only on a success exit, and surface
/// captured output through the log rather than to the caller.
pub struct ProxyControl<'r> {
    runner: &'r dyn CommandRunner,
}

impl<'r> ProxyControl<'r> {
    /// Create a control handle over `runner`.
    pub fn new(runner: &'r dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run the daemon's config syntax check (`nginx -t`).
    pub fn validate(&self) -> bool {
        match self.runner.run("nginx", &["-t"]) {
            Ok(output) if output.success => {
                debug!("nginx configuration is valid");
                true
            }
            Ok(output) => {
                error!(stderr = %output.stderr.trim(), "nginx configuration test failed");
                false
            }
            Err(e) => {
                log_spawn_failure("nginx", &e);
                false
            }
        }
    }

    /// Reload the daemon (`systemctl reload nginx`).
    pub fn reload(&self) -> bool {
        match self.runner.run("systemctl", &["reload", "nginx"]) {
            Ok(output) if output.success => {
                info!("nginx reloaded");
                true
            }
            Ok(output) => {
                error!(stderr = %output.stderr.trim(), "Failed to reload nginx");
                false
            }
            Err(e) => {
                log_spawn_failure("systemctl", &e);
                false
            }
        }
    }
}

fn log_spawn_failure(program: &str, e: &ExecError) {
    error!(program = %program, error = %e, "Failed to invoke proxy control command");
}
