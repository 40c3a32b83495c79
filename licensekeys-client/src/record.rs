//! License record state: settings, the outbound request payload, and the
//! last known server response data.
//!
//! A record is the unit of persistence. Callers load one before each API
//! call and store the serialized form the sink hands back; the layout
//! (`{settings, request, data}`) is stable across client versions so stored
//! records reload after restarts and upgrades.

use crate::error::LicenseResult;
use crate::response::ApiResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client version tag stamped into newly created records.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often a stored license should be revalidated against the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    /// Returns the revalidation interval in seconds.
    #[must_use]
    pub fn interval_secs(&self) -> i64 {
        match self {
            Self::Hourly => 60 * 60,
            Self::Daily => 24 * 60 * 60,
            Self::Weekly => 7 * 24 * 60 * 60,
        }
    }
}

/// Client-side configuration persisted with the license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Remote licensing endpoint.
    #[serde(default)]
    pub url: String,
    /// Remote revalidation cadence.
    #[serde(default)]
    pub frequency: Frequency,
    /// Retry attempts already spent against an unreachable host.
    #[serde(default)]
    pub retries: u32,
    /// Version of the client that produced this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Next scheduled remote check, in seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_check: Option<i64>,
}

/// In-memory license state, mutated in place as responses are applied.
///
/// `data` only ever gains an `activation_id` through
/// [`LicenseRecord::apply_response`] on a successful server reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub settings: Settings,
    /// Outbound payload fields (license key, product id, domain, ...).
    /// Opaque to the client beyond being serializable.
    #[serde(default)]
    pub request: Map<String, Value>,
    /// Last known response fields from the server.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl LicenseRecord {
    /// Builds a fresh record for a license that has never been activated.
    pub fn create(
        url: impl Into<String>,
        store_code: &str,
        sku: &str,
        license_key: &str,
        domain: Option<&str>,
        frequency: Frequency,
    ) -> Self {
        let mut request = Map::new();
        request.insert("store_code".to_string(), Value::from(store_code));
        request.insert("sku".to_string(), Value::from(sku));
        request.insert("license_key".to_string(), Value::from(license_key));
        if let Some(domain) = domain {
            request.insert("domain".to_string(), Value::from(domain));
        }
        Self {
            settings: Settings {
                url: url.into(),
                frequency,
                retries: 0,
                version: Some(CLIENT_VERSION.to_string()),
                next_check: Some(Utc::now().timestamp()),
            },
            request,
            data: Map::new(),
        }
    }

    /// Loads a record from its serialized `{settings, request, data}` form.
    pub fn from_json(raw: &str) -> LicenseResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serializes the record into its persisted form.
    pub fn to_json(&self) -> LicenseResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The activation identifier assigned by the server, if any.
    #[must_use]
    pub fn activation_id(&self) -> Option<&Value> {
        self.data.get("activation_id")
    }

    /// Expiry timestamp reported by the server, in seconds since the epoch.
    #[must_use]
    pub fn expire(&self) -> Option<i64> {
        self.data.get("expire").and_then(Value::as_i64)
    }

    /// The server's last word on whether the license has expired.
    #[must_use]
    pub fn has_expired(&self) -> Option<bool> {
        self.data.get("has_expired").and_then(Value::as_bool)
    }

    /// Returns true once a successful activation response has been applied.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.data.contains_key("activation_id")
    }

    /// Local validation fallback: the last known server state, checked
    /// without touching the network. A record with no prior server data is
    /// never locally valid.
    #[must_use]
    pub fn is_locally_valid(&self) -> bool {
        if self.data.is_empty() {
            return false;
        }
        if self.has_expired() == Some(true) {
            return false;
        }
        match self.expire() {
            Some(expire) => Utc::now().timestamp() < expire,
            None => true,
        }
    }

    /// Schedules the next remote check one frequency interval from now.
    pub fn touch(&mut self) {
        self.settings.next_check =
            Some(Utc::now().timestamp() + self.settings.frequency.interval_secs());
    }

    /// Returns true when the next scheduled remote check is due.
    #[must_use]
    pub fn due_for_check(&self) -> bool {
        match self.settings.next_check {
            Some(at) => Utc::now().timestamp() >= at,
            None => true,
        }
    }

    /// Retry attempts spent so far against an unreachable host.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.settings.retries
    }

    /// Records one retry attempt against an unreachable host.
    pub fn record_retry_attempt(&mut self) {
        self.settings.retries += 1;
    }

    /// Merges a successful response into the record and clears the retry
    /// counter. The counter only grows during a validate attempt sequence.
    pub fn apply_response(&mut self, response: &ApiResponse) {
        if let Some(data) = &response.data {
            for (key, value) in data {
                self.data.insert(key.clone(), value.clone());
            }
        }
        self.settings.retries = 0;
    }
}
