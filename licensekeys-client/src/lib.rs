//! Client-side license activation, validation, and deactivation against a
//! remote licensing service.
//!
//! This crate handles:
//! - Activation, remote validation, and deactivation round trips
//! - Local license state (`{settings, request, data}`) persisted between calls
//! - Bounded retry against an unreachable host during validation
//! - Falling back to the last known local state when the host stays down
//!
//! # Design Principles
//!
//! - **Injected transport**: HTTP mechanics live behind [`Transport`]; the
//!   orchestrator only sees normalized outcomes
//! - **Caller-owned persistence**: records are loaded through a factory
//!   closure and handed back, serialized, through a sink closure
//! - **Failures as values**: unreachable hosts, empty replies, and error
//!   responses resolve into return values; only a broken caller contract
//!   is raised as an error
//! - **Bounded retries**: at most one extra attempt per call, with the
//!   budget stored in the record so the ceiling spans invocations

mod client;
mod error;
mod record;
mod response;
mod retry;
mod transport;

pub use client::{LicenseClient, ValidateOptions, Validation};
pub use error::{LicenseError, LicenseResult};
pub use record::{CLIENT_VERSION, Frequency, LicenseRecord, Settings};
pub use response::{ApiResponse, Interpreted, interpret};
pub use retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
pub use transport::{Endpoint, RawResponse, Transport};

#[cfg(feature = "online")]
pub use transport::HttpTransport;
