use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw volume sample - one observed reading for one ticker at one instant
///
/// Fetched fresh from the store each run; never persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSample {
    /// Timestamp of the observation
    pub time: DateTime<Utc>,

    /// Ticker symbol the sample belongs to
    pub ticker: String,

    /// Observed volume, `None` when the store holds a null/blank value
    pub volume: Option<f64>,
}

impl VolumeSample {
    /// Create a new volume sample
    pub fn new(time: DateTime<Utc>, ticker: String, volume: Option<f64>) -> Self {
        Self {
            time,
            ticker,
            volume,
        }
    }
}
