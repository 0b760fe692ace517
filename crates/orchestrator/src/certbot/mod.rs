//! Certbot boundary
//!
//! Drives the external ACME client and parses its output. The ACME protocol
//! itself lives entirely inside certbot; this module only covers the two
//! operations the flows need:
//!
//! - [`CertbotClient::request_certificate`] - non-interactive certificate
//!   request, success determined solely by the exit status
//! - [`CertbotClient::list_certificates`] - inventory listing, parsed from
//!   certbot's human-oriented output into [`CertificateRecord`]s
//!
//! Parsing is isolated in [`inventory::parse_inventory`], a pure function
//! with no I/O, so field-order and annotation edge cases are unit-testable
//! without invoking anything.

mod client;
mod error;
mod inventory;

pub use client::CertbotClient;
pub use error::CertbotError;
pub use inventory::{parse_inventory, CertificateRecord};
