//! Certflow Common
//!
//! Shared primitives used across the certflow workspace:
//!
//! - **Command execution**: a single capability trait for invoking external
//!   binaries, so every component depends on an interface rather than on
//!   `std::process` directly
//! - **Domain resolution**: mapping between domain selectors (primary domain
//!   or subdomain) and fully-qualified hostnames

pub mod domain;
pub mod exec;

// Command execution
pub use exec::{CommandOutput, CommandRunner, ExecError, SystemRunner};

// Domain resolution
pub use domain::DomainSelector;
