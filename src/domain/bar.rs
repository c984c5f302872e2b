//! Raw price observation.

use crate::domain::error::MacdrankError;
use chrono::{DateTime, Utc};

/// One raw price observation. `time` is a unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, close: f64) -> Self {
        Bar { time, open, close }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// Check that `bars` is strictly increasing by time.
pub fn ensure_ordered(symbol: &str, bars: &[Bar]) -> Result<(), MacdrankError> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].time <= pair[0].time {
            return Err(MacdrankError::UnorderedBars {
                symbol: symbol.to_string(),
                index: i + 1,
            });
        }
    }
    Ok(())
}
