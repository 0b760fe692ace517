//! Flow plans: ordered steps with declared compensations.
//!
//! Each lifecycle flow is a list of [`FlowStep`]s executed in order with
//! short-circuit on failure. The compensating action for every step is part
//! of the plan itself rather than hand-written failure branches, which keeps
//! the rollback behavior diagrammable and testable as data.

/// One primitive operation a flow can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Fail if a config already exists for the domain (create only).
    EnsureAbsent,
    /// Discover the upstream port from the existing config (update only).
    ResolvePort,
    /// Back up the live config.
    CreateBackup,
    /// Overwrite the live config with the ACME challenge variant.
    StageChallenge,
    /// Run the proxy daemon's syntax check.
    ValidateProxy,
    /// Reload the proxy daemon.
    ReloadProxy,
    /// Request a certificate from the ACME client.
    RequestCertificate,
    /// Restore the backed-up config and drop the backup.
    RestoreBackup,
    /// Delete the live config.
    DeleteConfig,
    /// Render and write the final service config.
    WriteServiceConfig,
}

/// What the executor does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Stop; nothing staged needs undoing.
    Abort,
    /// Restore the backup, then stop.
    RestoreBackup,
    /// Delete the partially staged config, then stop.
    DeleteConfig,
    /// Report and keep executing the remaining steps.
    Continue,
    /// Stop and flag the run for manual operator attention. Never retried.
    ManualAttention,
}

/// A flow step paired with its compensating action.
#[derive(Debug, Clone, Copy)]
pub struct FlowStep {
    pub action: FlowAction,
    pub on_failure: Recovery,
}

const fn step(action: FlowAction, on_failure: Recovery) -> FlowStep {
    FlowStep { action, on_failure }
}

/// Renew the certificate for a domain that already has a service config.
///
/// The certificate request itself is recoverable: whatever certbot reports,
/// the backup must be restored and the proxy reloaded afterwards. The final
/// reload failing leaves a restored config the daemon may not have picked
/// up, which is flagged rather than retried.
pub const UPDATE_PLAN: &[FlowStep] = &[
    step(FlowAction::ResolvePort, Recovery::Abort),
    step(FlowAction::CreateBackup, Recovery::Abort),
    step(FlowAction::StageChallenge, Recovery::RestoreBackup),
    step(FlowAction::ValidateProxy, Recovery::RestoreBackup),
    step(FlowAction::ReloadProxy, Recovery::RestoreBackup),
    step(FlowAction::RequestCertificate, Recovery::Continue),
    step(FlowAction::RestoreBackup, Recovery::Abort),
    step(FlowAction::ReloadProxy, Recovery::ManualAttention),
];

/// Set up a brand-new domain: challenge config first, certificate, then the
/// real service config with the caller-supplied port.
///
/// There is no backup in this flow; before the first write there is nothing
/// to protect, and afterwards the only sane compensation is deleting the
/// partial config. Between deleting the challenge config and writing the
/// service config the domain is briefly unconfigured; a reload failure in
/// that window is reported and the flow pushes on to stage the service
/// config anyway.
pub const CREATE_PLAN: &[FlowStep] = &[
    step(FlowAction::EnsureAbsent, Recovery::Abort),
    step(FlowAction::StageChallenge, Recovery::Abort),
    step(FlowAction::ValidateProxy, Recovery::DeleteConfig),
    step(FlowAction::ReloadProxy, Recovery::DeleteConfig),
    step(FlowAction::RequestCertificate, Recovery::Continue),
    step(FlowAction::DeleteConfig, Recovery::Abort),
    step(FlowAction::ReloadProxy, Recovery::Continue),
    step(FlowAction::WriteServiceConfig, Recovery::Abort),
    step(FlowAction::ValidateProxy, Recovery::DeleteConfig),
    step(FlowAction::ReloadProxy, Recovery::ManualAttention),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_plan_restores_around_mutation() {
        // Every step between staging the challenge and the certificate
        // request must roll back to the backup on failure.
        let mutating = &UPDATE_PLAN[2..5];
        assert!(mutating
            .iter()
            .all(|s| s.on_failure == Recovery::RestoreBackup));
    }

    #[test]
    fn test_update_plan_always_restores_after_certificate() {
        let cert_position = UPDATE_PLAN
            .iter()
            .position(|s| s.action == FlowAction::RequestCertificate)
            .unwrap();

        assert_eq!(UPDATE_PLAN[cert_position].on_failure, Recovery::Continue);
        assert!(UPDATE_PLAN[cert_position + 1..]
            .iter()
            .any(|s| s.action == FlowAction::RestoreBackup));
    }

    #[test]
    fn test_create_plan_has_no_backup_steps() {
        assert!(!CREATE_PLAN.iter().any(|s| {
            s.action == FlowAction::CreateBackup || s.action == FlowAction::RestoreBackup
        }));
    }

    #[test]
    fn test_both_plans_end_with_flagged_reload() {
        for plan in [UPDATE_PLAN, CREATE_PLAN] {
            let last = plan.last().unwrap();
            assert_eq!(last.action, FlowAction::ReloadProxy);
            assert_eq!(last.on_failure, Recovery::ManualAttention);
        }
    }
}
