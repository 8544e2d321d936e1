use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One simulated IoT reading.
///
/// Magnitudes are kept as two-decimal strings so the serialized form is
/// exactly what gets hashed. Field order is part of the hashed encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Carbon emissions reading, in [0, 100).
    pub carbon: String,
    /// Energy use reading, in [0, 500).
    pub energy: String,
    /// Water use reading, in [0, 50).
    pub water: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub ts: String,
}

impl TelemetrySample {
    /// Draw a sample stamped with the current time.
    pub fn generate() -> Self {
        Self::with_rng(&mut rand::thread_rng(), Utc::now())
    }

    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        Self {
            carbon: format!("{:.2}", rng.gen_range(0.0..100.0)),
            energy: format!("{:.2}", rng.gen_range(0.0..500.0)),
            water: format!("{:.2}", rng.gen_range(0.0..50.0)),
            ts: format_timestamp(now),
        }
    }
}

/// `2025-01-01T00:00:00.000Z` style timestamp.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
