//! Error types for the certbot boundary.

use certflow_common::ExecError;
use thiserror::Error;

/// Errors raised while listing the certificate inventory.
///
/// A failed certificate *request* is not an error here: that operation
/// reports through a boolean because the flows treat it as recoverable.
#[derive(Debug, Error)]
pub enum CertbotError {
    /// The certbot binary could not be invoked.
    #[error("failed to invoke certbot: {0}")]
    Exec(#[from] ExecError),

    /// A record ended (next record started or input ended) with a field
    /// still unset. The whole listing is rejected; there is no
    /// partial-record recovery.
    #[error("certificate record {name:?} is missing field {field:?}")]
    MissingField {
        name: Option<String>,
        field: &'static str,
    },

    /// An expiry value did not match the expected timestamp format.
    #[error("unparseable expiry date {value:?}")]
    BadExpiry {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
