//! Error types for the license client.

use thiserror::Error;

/// Result type for license client operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// License client errors.
///
/// Transport failures are not represented here: the orchestrator normalizes
/// them into return values. Only a broken caller contract or record
/// (de)serialization surfaces as an error.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The record factory did not supply a usable license record.
    #[error("record factory must supply a license record: {0}")]
    Contract(String),

    /// Record (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
