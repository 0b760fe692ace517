//! Flow execution.

use certflow_common::{CommandRunner, DomainSelector};
use certflow_config::Settings;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::plan::{FlowAction, FlowStep, Recovery, CREATE_PLAN, UPDATE_PLAN};
use crate::certbot::CertbotClient;
use crate::nginx::{NginxError, ProxyControl, SiteConfig};

/// Why a single flow step failed.
#[derive(Debug, Error)]
pub enum StepError {
    /// A config already exists for the domain (create conflict).
    #[error("config already exists for {0}")]
    Conflict(String),

    /// Config file management failed.
    #[error(transparent)]
    Nginx(#[from] NginxError),

    /// The proxy daemon rejected the staged config.
    #[error("proxy config validation failed")]
    Validation,

    /// The proxy daemon could not be reloaded.
    #[error("proxy reload failed")]
    Reload,

    /// The ACME client reported failure.
    #[error("certificate acquisition failed for {0}")]
    Certificate(String),

    /// No backup was available to restore.
    #[error("backup restore failed, no backup present")]
    Restore,

    /// The flow reached a config write without a resolved port.
    #[error("no upstream port available for service config")]
    PortUnavailable,
}

/// Outcome of one executed step.
#[derive(Debug)]
pub struct StepOutcome {
    pub action: FlowAction,
    /// `None` on success, otherwise the failure rendered for diagnostics.
    pub error: Option<String>,
}

/// Terminal state of a flow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    /// Every step succeeded.
    Completed,
    /// The flow ran to the end but a recoverable step failed along the way
    /// (certificate acquisition, or a reload inside the create flow's
    /// unconfigured window).
    CompletedWithWarnings,
    /// A step failed and its compensation stopped the flow.
    Aborted { failed: FlowAction },
    /// The flow stopped in a state that requires an operator: the config on
    /// disk round-tripped but the daemon may not have picked it up.
    NeedsAttention { failed: FlowAction },
}

/// Record of one flow run, consumed by the CLI summary and by tests.
#[derive(Debug)]
pub struct FlowReport {
    pub flow: &'static str,
    pub domain: String,
    pub steps: Vec<StepOutcome>,
    pub status: FlowStatus,
}

/// Sequences the lifecycle flows for one domain.
///
/// Holds the per-domain config manager plus the proxy and certbot
/// capabilities, and executes flow plans step by step, applying each failed
/// step's declared recovery. One orchestrator handles exactly one domain
/// transition; the cron scan constructs a fresh one per due domain.
pub struct Orchestrator<'r> {
    domain: String,
    email: String,
    site: SiteConfig,
    proxy: ProxyControl<'r>,
    certbot: CertbotClient<'r>,
    service_port: Option<String>,
}

impl<'r> Orchestrator<'r> {
    /// Build an orchestrator for the domain selected by `selector`.
    pub fn new(
        settings: &Settings,
        selector: &DomainSelector,
        runner: &'r dyn CommandRunner,
    ) -> Self {
        let domain = selector.resolve(&settings.domain);
        let site = SiteConfig::new(
            domain.clone(),
            &settings.paths.nginx,
            settings.paths.template.clone(),
            settings.paths.acme_template.clone(),
        );

        Self {
            domain,
            email: settings.email.clone(),
            site,
            proxy: ProxyControl::new(runner),
            certbot: CertbotClient::new(runner, settings.webroot.clone()),
            service_port: None,
        }
    }

    /// Renew the certificate for an existing domain.
    pub fn update(&mut self) -> FlowReport {
        info!(domain = %self.domain, "Updating certificate");
        self.execute("update", UPDATE_PLAN)
    }

    /// Set up a new domain with `port` as its upstream.
    pub fn create(&mut self, port: &str) -> FlowReport {
        info!(domain = %self.domain, port = %port, "Creating new domain");
        self.service_port = Some(port.to_string());
        self.execute("create", CREATE_PLAN)
    }

    fn execute(&mut self, flow: &'static str, plan: &[FlowStep]) -> FlowReport {
        let mut steps = Vec::with_capacity(plan.len());
        let mut warnings = 0usize;

        for step in plan {
            match self.perform(step.action) {
                Ok(()) => {
                    debug!(domain = %self.domain, action = ?step.action, "Step completed");
                    steps.push(StepOutcome {
                        action: step.action,
                        error: None,
                    });
                }
                Err(err) => {
                    steps.push(StepOutcome {
                        action: step.action,
                        error: Some(err.to_string()),
                    });

                    if let Some(status) = self.recover(flow, step, &err) {
                        return FlowReport {
                            flow,
                            domain: self.domain.clone(),
                            steps,
                            status,
                        };
                    }
                    warnings += 1;
                }
            }
        }

        let status = if warnings > 0 {
            FlowStatus::CompletedWithWarnings
        } else {
            FlowStatus::Completed
        };
        info!(domain = %self.domain, flow = flow, status = ?status, "Flow finished");

        FlowReport {
            flow,
            domain: self.domain.clone(),
            steps,
            status,
        }
    }

    /// Apply a failed step's declared recovery. Returns the terminal status
    /// when the flow must stop, `None` when it continues.
    fn recover(&mut self, flow: &str, step: &FlowStep, err: &StepError) -> Option<FlowStatus> {
        match step.on_failure {
            Recovery::Abort => {
                error!(
                    domain = %self.domain,
                    flow = flow,
                    action = ?step.action,
                    error = %err,
                    "Step failed, aborting"
                );
                Some(FlowStatus::Aborted {
                    failed: step.action,
                })
            }
            Recovery::RestoreBackup => {
                error!(
                    domain = %self.domain,
                    flow = flow,
                    action = ?step.action,
                    error = %err,
                    "Step failed, rolling back to backup"
                );
                if !self.site.restore_backup() {
                    warn!(domain = %self.domain, "Rollback found no backup to restore");
                }
                Some(FlowStatus::Aborted {
                    failed: step.action,
                })
            }
            Recovery::DeleteConfig => {
                error!(
                    domain = %self.domain,
                    flow = flow,
                    action = ?step.action,
                    error = %err,
                    "Step failed, deleting partial config"
                );
                self.site.delete_config();
                Some(FlowStatus::Aborted {
                    failed: step.action,
                })
            }
            Recovery::Continue => {
                warn!(
                    domain = %self.domain,
                    flow = flow,
                    action = ?step.action,
                    error = %err,
                    "Step failed, continuing with remaining steps"
                );
                None
            }
            Recovery::ManualAttention => {
                warn!(
                    domain = %self.domain,
                    flow = flow,
                    action = ?step.action,
                    error = %err,
                    "Step failed after rollback, manual attention required"
                );
                Some(FlowStatus::NeedsAttention {
                    failed: step.action,
                })
            }
        }
    }

    fn perform(&mut self, action: FlowAction) -> Result<(), StepError> {
        match action {
            FlowAction::EnsureAbsent => {
                if self.site.exists() {
                    Err(StepError::Conflict(self.domain.clone()))
                } else {
                    Ok(())
                }
            }
            FlowAction::ResolvePort => {
                let port = self.site.upstream_port()?;
                self.service_port = Some(port);
                Ok(())
            }
            FlowAction::CreateBackup => Ok(self.site.create_backup()?),
            FlowAction::StageChallenge => Ok(self.site.write_challenge_config()?),
            FlowAction::ValidateProxy => {
                if self.proxy.validate() {
                    Ok(())
                } else {
                    Err(StepError::Validation)
                }
            }
            FlowAction::ReloadProxy => {
                if self.proxy.reload() {
                    Ok(())
                } else {
                    Err(StepError::Reload)
                }
            }
            FlowAction::RequestCertificate => {
                if self.certbot.request_certificate(&self.domain, &self.email) {
                    Ok(())
                } else {
                    Err(StepError::Certificate(self.domain.clone()))
                }
            }
            FlowAction::RestoreBackup => {
                if self.site.restore_backup() {
                    Ok(())
                } else {
                    Err(StepError::Restore)
                }
            }
            FlowAction::DeleteConfig => {
                self.site.delete_config();
                Ok(())
            }
            FlowAction::WriteServiceConfig => {
                let port = self
                    .service_port
                    .clone()
                    .ok_or(StepError::PortUnavailable)?;
                Ok(self.site.write_service_config(&port)?)
            }
        }
    }
}
