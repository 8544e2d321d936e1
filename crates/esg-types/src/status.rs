use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Status tuple reported by the governance contract for one identifier.
///
/// Field order follows the contract's return tuple
/// `(bool registered, bool attested, bool passed, address attestor,
/// uint64 timestamp, string reason)`. An identifier that was never
/// registered reports the zero value of every field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatus {
    pub registered: bool,
    pub attested: bool,
    pub passed: bool,
    pub attestor: Address,
    /// Unix seconds of the attestation, 0 when unattested.
    pub timestamp: u64,
    pub reason: String,
}

impl ReportStatus {
    /// The status of an identifier the contract has never seen.
    pub fn unregistered() -> Self {
        Self::default()
    }

    /// Status right after a successful registration.
    pub fn registered() -> Self {
        Self {
            registered: true,
            ..Self::default()
        }
    }

    /// Attestation time, if any.
    pub fn attested_at(&self) -> Option<DateTime<Utc>> {
        if self.timestamp == 0 {
            return None;
        }
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Short human label: `unregistered`, `registered`, `passed`, or `failed`.
    pub fn label(&self) -> &'static str {
        match (self.registered, self.attested, self.passed) {
            (false, _, _) => "unregistered",
            (true, false, _) => "registered",
            (true, true, true) => "passed",
            (true, true, false) => "failed",
        }
    }
}
