//! The API orchestrator: activate, validate, and deactivate a license
//! against the remote service, updating and persisting local state.
//!
//! Each operation takes a record factory (loads the current
//! [`LicenseRecord`]) and a sink (receives the serialized record for
//! persistence). The factory runs before any I/O; a factory that cannot
//! supply a usable record is a broken caller contract, not a runtime
//! condition.

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use crate::response::{ApiResponse, Interpreted, interpret};
use crate::retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
use crate::transport::{Endpoint, RawResponse, Transport};
use tracing::{debug, warn};

/// Options for [`LicenseClient::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Retry once per call when the host is unreachable.
    pub retry: bool,
    /// Ceiling on the record's retry counter.
    pub max_retries: u32,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            retry: false,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ValidateOptions {
    /// Retry enabled with the default ceiling.
    #[must_use]
    pub fn with_retry() -> Self {
        Self {
            retry: true,
            ..Self::default()
        }
    }
}

/// Structured outcome of a validation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// The server confirmed the license.
    Valid(ApiResponse),
    /// The server replied with an application error.
    Rejected(ApiResponse),
    /// The host was reachable but returned no usable payload.
    NoResponse,
    /// No connection after the allowed attempts. `locally_valid` carries
    /// the record's last known local state so callers need not fail closed
    /// on a temporary outage.
    Unreachable { locally_valid: bool },
}

impl Validation {
    /// Collapses the outcome into the boolean the simple entry point
    /// returns: server-confirmed, or unexpired last known local state when
    /// the host cannot be reached.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Valid(_) => true,
            Self::Rejected(_) | Self::NoResponse => false,
            Self::Unreachable { locally_valid } => *locally_valid,
        }
    }
}

/// License API orchestrator over an injected [`Transport`].
#[derive(Debug, Clone)]
pub struct LicenseClient<T> {
    transport: T,
}

impl<T: Transport> LicenseClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Activates the license.
    ///
    /// Returns `None` when the service produced no usable reply, otherwise
    /// the parsed response. On success the response data is merged into the
    /// record and the serialized record reaches the sink exactly once; an
    /// error reply is returned unchanged with no local mutation.
    pub async fn activate<F, S>(
        &self,
        mut factory: F,
        sink: S,
    ) -> LicenseResult<Option<ApiResponse>>
    where
        F: FnMut() -> LicenseResult<LicenseRecord>,
        S: FnMut(&str),
    {
        let mut record = checked_record(&mut factory)?;
        self.round_trip(Endpoint::Activate, &mut record, sink, true).await
    }

    /// Releases the activation server-side.
    ///
    /// The sink is never invoked: deactivation clears remote state and
    /// leaves the local record alone.
    pub async fn deactivate<F, S>(
        &self,
        mut factory: F,
        sink: S,
    ) -> LicenseResult<Option<ApiResponse>>
    where
        F: FnMut() -> LicenseResult<LicenseRecord>,
        S: FnMut(&str),
    {
        let mut record = checked_record(&mut factory)?;
        self.round_trip(Endpoint::Deactivate, &mut record, sink, false).await
    }

    /// Validates the license, returning the boolean verdict.
    pub async fn validate<F, S>(
        &self,
        factory: F,
        sink: S,
        options: ValidateOptions,
    ) -> LicenseResult<bool>
    where
        F: FnMut() -> LicenseResult<LicenseRecord>,
        S: FnMut(&str),
    {
        Ok(self.validate_full(factory, sink, options).await?.is_valid())
    }

    /// Validates the license, returning the structured outcome for callers
    /// that need response detail or the unreachable/rejected distinction.
    pub async fn validate_full<F, S>(
        &self,
        mut factory: F,
        mut sink: S,
        options: ValidateOptions,
    ) -> LicenseResult<Validation>
    where
        F: FnMut() -> LicenseResult<LicenseRecord>,
        S: FnMut(&str),
    {
        let mut record = checked_record(&mut factory)?;
        let policy = RetryPolicy::new(options.max_retries);
        let mut retried = false;
        loop {
            let outcome = self.transport.perform(Endpoint::Validate, &record).await;
            match outcome {
                RawResponse::Unreachable(reason) => {
                    warn!(%reason, "licensing host unreachable during validation");
                    if options.retry && !retried && policy.should_retry(&record) {
                        // Persist the spent attempt so the ceiling holds
                        // across separate invocations.
                        policy.record_attempt(&mut record);
                        sink(&record.to_json()?);
                        retried = true;
                        debug!(retries = record.retries(), "retrying validation");
                        continue;
                    }
                    let locally_valid = record.is_locally_valid();
                    if options.retry && !policy.should_retry(&record) {
                        warn!(
                            retries = record.retries(),
                            locally_valid, "validation retry budget exhausted"
                        );
                    }
                    return Ok(Validation::Unreachable { locally_valid });
                }
                RawResponse::Empty => {
                    debug!("validation returned no usable payload");
                    return Ok(Validation::NoResponse);
                }
                RawResponse::Payload(raw) => {
                    return match interpret(&raw) {
                        Interpreted::Failure(response) => Ok(Validation::Rejected(response)),
                        Interpreted::Success(response) => {
                            record.apply_response(&response);
                            sink(&record.to_json()?);
                            Ok(Validation::Valid(response))
                        }
                    };
                }
            }
        }
    }

    /// Shared activate/deactivate round trip. `persist` controls whether a
    /// successful response mutates the record and reaches the sink.
    async fn round_trip<S>(
        &self,
        endpoint: Endpoint,
        record: &mut LicenseRecord,
        mut sink: S,
        persist: bool,
    ) -> LicenseResult<Option<ApiResponse>>
    where
        S: FnMut(&str),
    {
        debug!(action = endpoint.action(), "performing license api call");
        let outcome = self.transport.perform(endpoint, record).await;
        match outcome {
            RawResponse::Empty => Ok(None),
            RawResponse::Unreachable(reason) => {
                // Only validate retries; here an unreachable host reads as
                // "no response".
                warn!(%reason, action = endpoint.action(), "licensing host unreachable");
                Ok(None)
            }
            RawResponse::Payload(raw) => match interpret(&raw) {
                Interpreted::Failure(response) => Ok(Some(response)),
                Interpreted::Success(response) => {
                    if persist {
                        record.apply_response(&response);
                        sink(&record.to_json()?);
                    }
                    Ok(Some(response))
                }
            },
        }
    }
}

#[cfg(feature = "online")]
impl LicenseClient<crate::transport::HttpTransport> {
    /// Client backed by the default HTTP transport.
    #[must_use]
    pub fn http() -> Self {
        Self::new(crate::transport::HttpTransport::new())
    }
}

/// Runs the record factory and checks the caller contract before any I/O.
fn checked_record<F>(factory: &mut F) -> LicenseResult<LicenseRecord>
where
    F: FnMut() -> LicenseResult<LicenseRecord>,
{
    let record = factory().map_err(|e| match e {
        contract @ LicenseError::Contract(_) => contract,
        other => LicenseError::Contract(other.to_string()),
    })?;
    if record.settings.url.is_empty() {
        return Err(LicenseError::Contract("record has no endpoint url".into()));
    }
    Ok(record)
}
