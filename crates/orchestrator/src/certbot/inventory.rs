//! Certificate inventory parsing.
//!
//! Certbot's `certificates` subcommand prints an indented, human-oriented
//! listing. [`parse_inventory`] turns that text into structured records:
//! lines are trimmed and scanned in order, `Certificate Name:` begins a new
//! record (flushing the previous one), recognized keys fill in fields in any
//! order, and everything else is ignored. Every record must supply all seven
//! fields before the next record starts or input ends.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use super::error::CertbotError;

/// Timestamp format certbot uses for expiry dates.
const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// One entry in the ACME client's certificate inventory.
///
/// Read-only snapshot constructed fresh on every inventory query; certbot
/// owns the underlying state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    /// Certificate lineage name.
    pub name: String,
    /// Serial number, verbatim.
    pub serial_number: String,
    /// Key type (e.g. `ECDSA`, `RSA`).
    pub key_type: String,
    /// Covered domains, preserved verbatim (possibly comma/space joined).
    pub domains: String,
    /// Expiry instant, timezone-aware.
    pub expiry: DateTime<FixedOffset>,
    /// Path of the certificate chain file.
    pub certificate_path: PathBuf,
    /// Path of the private key file.
    pub private_key_path: PathBuf,
}

#[derive(Debug, Default)]
struct RecordBuilder {
    name: Option<String>,
    serial_number: Option<String>,
    key_type: Option<String>,
    domains: Option<String>,
    expiry: Option<DateTime<FixedOffset>>,
    certificate_path: Option<PathBuf>,
    private_key_path: Option<PathBuf>,
}

impl RecordBuilder {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.serial_number.is_none()
            && self.key_type.is_none()
            && self.domains.is_none()
            && self.expiry.is_none()
            && self.certificate_path.is_none()
            && self.private_key_path.is_none()
    }

    fn build(self) -> Result<CertificateRecord, CertbotError> {
        fn missing(name: &Option<String>, field: &'static str) -> CertbotError {
            CertbotError::MissingField {
                name: name.clone(),
                field,
            }
        }

        let ctx = self.name.clone();
        Ok(CertificateRecord {
            name: self.name.ok_or_else(|| missing(&ctx, "Certificate Name"))?,
            serial_number: self
                .serial_number
                .ok_or_else(|| missing(&ctx, "Serial Number"))?,
            key_type: self.key_type.ok_or_else(|| missing(&ctx, "Key Type"))?,
            domains: self.domains.ok_or_else(|| missing(&ctx, "Domains"))?,
            expiry: self.expiry.ok_or_else(|| missing(&ctx, "Expiry Date"))?,
            certificate_path: self
                .certificate_path
                .ok_or_else(|| missing(&ctx, "Certificate Path"))?,
            private_key_path: self
                .private_key_path
                .ok_or_else(|| missing(&ctx, "Private Key Path"))?,
        })
    }
}

/// Parse the text output of `certbot certificates` into records.
///
/// Tolerates blank lines, extra whitespace, and fields appearing in any
/// order within a record. A record missing any field fails the whole
/// listing.
pub fn parse_inventory(output: &str) -> Result<Vec<CertificateRecord>, CertbotError> {
    let mut records = Vec::new();
    let mut pending = RecordBuilder::default();

    for raw in output.lines() {
        let line = raw.trim();

        if let Some(value) = line.strip_prefix("Certificate Name:") {
            if !pending.is_empty() {
                records.push(std::mem::take(&mut pending).build()?);
            }
            pending.name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Serial Number:") {
            pending.serial_number = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Key Type:") {
            pending.key_type = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Domains:") {
            pending.domains = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Expiry Date:") {
            pending.expiry = Some(parse_expiry(value)?);
        } else if let Some(value) = line.strip_prefix("Certificate Path:") {
            pending.certificate_path = Some(PathBuf::from(value.trim()));
        } else if let Some(value) = line.strip_prefix("Private Key Path:") {
            pending.private_key_path = Some(PathBuf::from(value.trim()));
        }
    }

    if !pending.is_empty() {
        records.push(pending.build()?);
    }

    Ok(records)
}

/// Parse an expiry value, discarding the trailing human-readable annotation
/// (`2026-09-10 12:00:00+00:00 (VALID: 35 days)`).
fn parse_expiry(value: &str) -> Result<DateTime<FixedOffset>, CertbotError> {
    let value = value.trim();
    let value = value.split_once(" (").map_or(value, |(head, _)| head).trim();

    DateTime::parse_from_str(value, EXPIRY_FORMAT).map_err(|source| CertbotError::BadExpiry {
        value: value.to_string(),
        source,
    })
}
