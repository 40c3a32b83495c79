//! Transport capability: turns a license record into a remote call.
//!
//! The orchestrator consumes this as an injected capability and only sees
//! the normalized [`RawResponse`] outcomes. "No usable payload" and "could
//! not connect at all" are kept distinct because validation treats them
//! differently under retry.

use crate::record::LicenseRecord;
use std::future::Future;

/// Remote operations exposed by the licensing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Activate,
    Validate,
    Deactivate,
}

impl Endpoint {
    /// The `action` parameter the service dispatches on.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Activate => "license_key_activate",
            Self::Validate => "license_key_validate",
            Self::Deactivate => "license_key_deactivate",
        }
    }
}

/// Normalized transport outcome. Connection-level failures are carried as a
/// value, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// Host reachable but no usable payload: empty body, the literal `0`,
    /// or a non-success status.
    Empty,
    /// Raw response body.
    Payload(String),
    /// No connection could be established (DNS failure, refused, timeout).
    Unreachable(String),
}

/// Performs the remote call for an endpoint.
///
/// Timeout and cancellation policy belong to the implementation; the
/// orchestrator only distinguishes the three [`RawResponse`] outcomes.
pub trait Transport {
    fn perform(
        &self,
        endpoint: Endpoint,
        record: &LicenseRecord,
    ) -> impl Future<Output = RawResponse> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn perform(
        &self,
        endpoint: Endpoint,
        record: &LicenseRecord,
    ) -> impl Future<Output = RawResponse> + Send {
        T::perform(*self, endpoint, record)
    }
}

#[cfg(feature = "online")]
pub use http::HttpTransport;

#[cfg(feature = "online")]
mod http {
    use super::{Endpoint, RawResponse, Transport};
    use crate::record::LicenseRecord;
    use serde_json::Value;
    use std::future::Future;
    use tracing::debug;

    /// Default reqwest-backed transport: GET against the record's endpoint
    /// with the `action` and the record's request fields as query
    /// parameters.
    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        #[must_use]
        pub fn new() -> Self {
            Self {
                client: reqwest::Client::new(),
            }
        }

        /// Uses a caller-built client (custom timeouts, proxies, TLS).
        #[must_use]
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }

        fn build_request(
            &self,
            endpoint: Endpoint,
            record: &LicenseRecord,
        ) -> Result<reqwest::RequestBuilder, String> {
            let mut url = reqwest::Url::parse(&record.settings.url)
                .map_err(|e| format!("invalid endpoint url: {e}"))?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("action", endpoint.action());
                for (key, value) in &record.request {
                    match value {
                        Value::String(s) => pairs.append_pair(key, s),
                        other => pairs.append_pair(key, &other.to_string()),
                    };
                }
            }
            Ok(self.client.get(url))
        }
    }

    impl Transport for HttpTransport {
        fn perform(
            &self,
            endpoint: Endpoint,
            record: &LicenseRecord,
        ) -> impl Future<Output = RawResponse> + Send {
            // The query string carries the license key; log the action only.
            debug!(action = endpoint.action(), "dispatching license api request");
            let request = self.build_request(endpoint, record);
            async move {
                let request = match request {
                    Ok(request) => request,
                    Err(reason) => return RawResponse::Unreachable(reason),
                };
                let response = match request.send().await {
                    Ok(response) => response,
                    Err(e) => return RawResponse::Unreachable(e.to_string()),
                };
                if !response.status().is_success() {
                    return RawResponse::Empty;
                }
                match response.text().await {
                    Ok(body) => {
                        let body = body.trim();
                        // The service answers `0` for unknown actions.
                        if body.is_empty() || body == "0" {
                            RawResponse::Empty
                        } else {
                            RawResponse::Payload(body.to_string())
                        }
                    }
                    Err(_) => RawResponse::Empty,
                }
            }
        }
    }
}
