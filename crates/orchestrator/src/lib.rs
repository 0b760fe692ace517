//! Certflow Orchestrator Library
//!
//! Core components for automating TLS certificate issuance and renewal for
//! domains served through an nginx reverse proxy:
//!
//! - **Proxy config management**: per-domain config file lifecycle with
//!   templating, backup/restore, and upstream port discovery
//! - **Proxy control**: syntax validation and reload of the external daemon
//! - **Certbot boundary**: non-interactive certificate requests and
//!   inventory listing with a pure text parser
//! - **Lifecycle flows**: transactional create/update/cron sequences where
//!   every mutating step carries a declared compensating action
//!
//! The orchestrator never talks to a process directly; everything external
//! goes through the `CommandRunner` capability from `certflow-common`, which
//! is the seam used to test every flow without real binaries.

pub mod certbot;
pub mod flows;
pub mod nginx;

// Certbot boundary
pub use certbot::{CertbotClient, CertbotError, CertificateRecord};

// Proxy config management
pub use nginx::{NginxError, ProxyControl, SiteConfig};

// Lifecycle flows
pub use flows::{FlowAction, FlowReport, FlowStatus, Orchestrator, Recovery};
