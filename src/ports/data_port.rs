//! Market data port trait.

use crate::domain::bar::Bar;
use crate::domain::error::MacdrankError;
use chrono::NaiveDate;

/// Inclusive calendar bounds on bar dates; open on either side when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, bar: &Bar) -> bool {
        let Some(date) = bar.datetime().map(|dt| dt.date_naive()) else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

pub type BatchResult = Vec<(String, Result<Vec<Bar>, MacdrankError>)>;

/// Source of raw bars keyed by symbol.
pub trait DataPort: Sync {
    /// Bars for `symbol` within `range`, ascending by time.
    fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>, MacdrankError>;

    /// Symbols this source can serve.
    fn list_symbols(&self) -> Result<Vec<String>, MacdrankError>;

    /// Fetch several symbols in one request. Per-symbol failures stay
    /// per-symbol. The default issues one `fetch_bars` per symbol.
    fn fetch_batch(&self, symbols: &[String], range: &DateRange) -> BatchResult {
        symbols
            .iter()
            .map(|symbol| (symbol.clone(), self.fetch_bars(symbol, range)))
            .collect()
    }
}
