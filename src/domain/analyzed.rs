//! Bars annotated with indicator values and signal state.

use crate::domain::bar::Bar;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Append-only history of the times at which the buy signal flipped.
///
/// Cloning shares the underlying storage. `appended` never touches the
/// receiver, so a log handed forward to later bars stays valid for every
/// reader that already holds it.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog(Arc<[i64]>);

impl ChangeLog {
    pub fn new() -> Self {
        ChangeLog(Arc::from(Vec::<i64>::new()))
    }

    pub fn appended(&self, time: i64) -> Self {
        let mut times = Vec::with_capacity(self.0.len() + 1);
        times.extend_from_slice(&self.0);
        times.push(time);
        ChangeLog(Arc::from(times))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<i64> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// True when both logs point at the same storage.
    pub fn shares_storage(&self, other: &ChangeLog) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ChangeLog {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedBar {
    pub bar: Bar,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd_fast: f64,
    pub macd_slow: f64,
    pub diff: f64,
    pub diff_adjusted: f64,
    pub buy_signal: bool,
    pub change_log: ChangeLog,
    /// Paper portfolio cash at this bar (filled by `paper::replay`).
    pub cash: f64,
    /// Paper portfolio share count at this bar (filled by `paper::replay`).
    pub shares: i64,
    pub next_price: f64,
    pub smma_up: f64,
    pub smma_down: f64,
    pub rsi: f64,
}

impl AnalyzedBar {
    /// A bar with flat indicators: both EMAs at the close, zero momentum,
    /// no signal and the close as next price.
    pub fn from_bar(bar: Bar) -> Self {
        AnalyzedBar {
            bar,
            ema_fast: bar.close,
            ema_slow: bar.close,
            macd_fast: 0.0,
            macd_slow: 0.0,
            diff: 0.0,
            diff_adjusted: 0.0,
            buy_signal: false,
            change_log: ChangeLog::new(),
            cash: 0.0,
            shares: 0,
            next_price: bar.close,
            smma_up: 0.0,
            smma_down: 0.0,
            rsi: 0.0,
        }
    }

    pub fn time(&self) -> i64 {
        self.bar.time
    }

    pub fn price(&self) -> f64 {
        self.bar.close
    }

    pub fn field(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.bar.open,
            BarField::Close => self.bar.close,
            BarField::EmaFast => self.ema_fast,
            BarField::EmaSlow => self.ema_slow,
            BarField::MacdFast => self.macd_fast,
            BarField::MacdSlow => self.macd_slow,
            BarField::Diff => self.diff,
            BarField::DiffAdjusted => self.diff_adjusted,
            BarField::NextPrice => self.next_price,
            BarField::SmmaUp => self.smma_up,
            BarField::SmmaDown => self.smma_down,
            BarField::Rsi => self.rsi,
            BarField::Cash => self.cash,
            BarField::Shares => self.shares as f64,
        }
    }
}

/// Numeric columns of an [`AnalyzedBar`] that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarField {
    Open,
    Close,
    EmaFast,
    EmaSlow,
    MacdFast,
    MacdSlow,
    Diff,
    DiffAdjusted,
    NextPrice,
    SmmaUp,
    SmmaDown,
    Rsi,
    Cash,
    Shares,
}

impl BarField {
    pub const ALL: [BarField; 14] = [
        BarField::Open,
        BarField::Close,
        BarField::EmaFast,
        BarField::EmaSlow,
        BarField::MacdFast,
        BarField::MacdSlow,
        BarField::Diff,
        BarField::DiffAdjusted,
        BarField::NextPrice,
        BarField::SmmaUp,
        BarField::SmmaDown,
        BarField::Rsi,
        BarField::Cash,
        BarField::Shares,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BarField::Open => "open",
            BarField::Close => "close",
            BarField::EmaFast => "ema_fast",
            BarField::EmaSlow => "ema_slow",
            BarField::MacdFast => "macd_fast",
            BarField::MacdSlow => "macd_slow",
            BarField::Diff => "diff",
            BarField::DiffAdjusted => "diff_adjusted",
            BarField::NextPrice => "next_price",
            BarField::SmmaUp => "smma_up",
            BarField::SmmaDown => "smma_down",
            BarField::Rsi => "rsi",
            BarField::Cash => "cash",
            BarField::Shares => "shares",
        }
    }
}

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bar field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for BarField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        BarField::ALL
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
