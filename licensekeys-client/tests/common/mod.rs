//! Shared test helpers for the license client tests.

#![allow(dead_code)]

use licensekeys_client::{Endpoint, LicenseRecord, RawResponse, Transport};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

/// Endpoint baked into the canned records below.
pub const STORE_URL: &str = "https://store.example/api";

/// Serialized record with empty request and data maps.
pub fn record_json() -> String {
    format!(
        r#"{{"settings":{{"url":"{STORE_URL}","frequency":"daily","retries":0}},"request":{{}},"data":{{}}}}"#
    )
}

/// Record with no prior server data.
pub fn record() -> LicenseRecord {
    LicenseRecord::from_json(&record_json()).unwrap()
}

/// Record whose last known server state is "not expired".
pub fn unexpired_record() -> LicenseRecord {
    LicenseRecord::from_json(&format!(
        r#"{{"settings":{{"url":"{STORE_URL}","frequency":"daily","retries":0}},"request":{{}},"data":{{"has_expired":false}}}}"#
    ))
    .unwrap()
}

/// Record with the retry counter already spent up to `retries`.
pub fn retried_record(retries: u32) -> LicenseRecord {
    LicenseRecord::from_json(&format!(
        r#"{{"settings":{{"url":"{STORE_URL}","frequency":"daily","retries":{retries}}},"request":{{}},"data":{{}}}}"#
    ))
    .unwrap()
}

/// Replays a scripted sequence of transport outcomes and records every
/// call. Once the script runs out, the host is permanently unreachable.
pub struct MockTransport {
    script: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl MockTransport {
    pub fn new(script: Vec<RawResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Transport that never connects.
    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    pub fn once(outcome: RawResponse) -> Self {
        Self::new(vec![outcome])
    }

    pub fn payload(body: &str) -> Self {
        Self::once(RawResponse::Payload(body.to_string()))
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn perform(
        &self,
        endpoint: Endpoint,
        _record: &LicenseRecord,
    ) -> impl Future<Output = RawResponse> + Send {
        self.calls.lock().unwrap().push(endpoint);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RawResponse::Unreachable("scripted host is down".to_string()));
        async move { outcome }
    }
}
