//! Certificate lifecycle flows
//!
//! The orchestrator sequences config staging, backup, validation, reload,
//! certificate acquisition, and rollback for one domain per run. Three flows
//! exist:
//!
//! - **update** - renew the certificate for a domain that already has a
//!   service config, staging the challenge config behind a backup that is
//!   restored whatever happens downstream
//! - **create** - set up a brand-new domain from an explicit upstream port,
//!   deleting the partial config on failure
//! - **cron** - scan the certificate inventory and run the update flow for
//!   every certificate close enough to expiry
//!
//! # Flow Structure
//!
//! Each flow is an ordered list of `(action, compensating action)` pairs
//! ([`plan`]) executed with short-circuit on failure by the
//! [`Orchestrator`]. No step failure propagates without its declared
//! compensation running first, and nothing in the flows panics: step
//! failures end in a [`FlowReport`] describing what ran and how it ended.
//!
//! A failed final reload after a successful rollback leaves the proxy
//! daemon possibly out of sync with the (correct) config on disk. That is
//! reported as [`FlowStatus::NeedsAttention`] and never retried here.

mod cron;
mod engine;
mod plan;

pub use cron::{run_cron, select_due};
pub use engine::{FlowReport, FlowStatus, Orchestrator, StepError, StepOutcome};
pub use plan::{FlowAction, FlowStep, Recovery, CREATE_PLAN, UPDATE_PLAN};
