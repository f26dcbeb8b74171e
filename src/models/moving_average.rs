use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::influx::line_protocol::Point;

/// Measurement name the derived series is written under
pub const MOVING_AVG_MEASUREMENT: &str = "10mav";

/// Field key carrying the computed average
pub const MOVING_AVG_FIELD: &str = "10_day_moving_avg";

/// Tag key identifying the ticker a point belongs to
pub const TICKER_TAG: &str = "ticker";

/// Derived moving-average point for one ticker
///
/// Produced once per ticker per run, timestamped with the latest raw
/// sample in that ticker's partition so re-running against unchanged data
/// overwrites the same point instead of appending a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    /// Ticker symbol the average was computed for
    pub ticker: String,

    /// Arithmetic mean over the trailing window
    pub value: f64,

    /// Timestamp of the partition's most recent sample
    pub time: DateTime<Utc>,
}

impl MovingAveragePoint {
    /// Create a new moving-average point
    pub fn new(ticker: String, value: f64, time: DateTime<Utc>) -> Self {
        Self {
            ticker,
            value,
            time,
        }
    }

    /// Convert to the wire-level point written to the store
    pub fn to_point(&self) -> Point {
        Point::new(MOVING_AVG_MEASUREMENT)
            .tag(TICKER_TAG, &self.ticker)
            .field(MOVING_AVG_FIELD, self.value)
            .timestamp(self.time)
    }
}
