//! Crossover signal tracking.
//!
//! Bars up to and including the warm-up count are held in [`SignalState::Warmup`]
//! with no buy signal and an empty change log. After that the signal is
//! `macd_fast > macd_slow`; every flip appends the bar's time to a copy of
//! the previous change log, otherwise the previous log is shared forward.
//! Warm-up counts as "not buying", so leaving it straight into Buy is a change.

use crate::domain::analyzed::{AnalyzedBar, ChangeLog};
use std::fmt;

const OVERBOUGHT_RSI: f64 = 70.0;
const OVERSOLD_RSI: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Warmup,
    Sell,
    Buy,
}

impl SignalState {
    pub fn is_buy(&self) -> bool {
        matches!(self, SignalState::Buy)
    }
}

/// State for bar `index` given its MACD lines.
pub fn signal_state(index: usize, bar: &AnalyzedBar, warmup_count: usize) -> SignalState {
    if index <= warmup_count {
        SignalState::Warmup
    } else if bar.macd_fast > bar.macd_slow {
        SignalState::Buy
    } else {
        SignalState::Sell
    }
}

/// Set `buy_signal` and `change_log` on every bar.
pub fn apply_signals(bars: Vec<AnalyzedBar>, warmup_count: usize) -> Vec<AnalyzedBar> {
    let mut out: Vec<AnalyzedBar> = Vec::with_capacity(bars.len());
    for (i, mut bar) in bars.into_iter().enumerate() {
        let state = signal_state(i, &bar, warmup_count);
        bar.buy_signal = state.is_buy();
        bar.change_log = match (state, out.last()) {
            (_, None) => ChangeLog::new(),
            (SignalState::Warmup, Some(prev)) => prev.change_log.clone(),
            (_, Some(prev)) if prev.buy_signal != bar.buy_signal => {
                prev.change_log.appended(bar.time())
            }
            (_, Some(prev)) => prev.change_log.clone(),
        };
        out.push(bar);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Buy => write!(f, "BUY"),
            Decision::Sell => write!(f, "SELL"),
            Decision::Hold => write!(f, "HOLD"),
        }
    }
}

/// What a live trading collaborator needs from the latest bar of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSummary {
    pub decision: Decision,
    pub buy_signal: bool,
    pub diff_adjusted: f64,
    /// `|diff_adjusted| * 10000`
    pub strength: f64,
    pub rsi: f64,
    pub change_count: usize,
    pub last_change: Option<i64>,
    pub price: f64,
}

impl SignalSummary {
    pub fn from_bars(bars: &[AnalyzedBar]) -> Option<SignalSummary> {
        let last = bars.last()?;
        Some(SignalSummary {
            decision: latest_decision(bars),
            buy_signal: last.buy_signal,
            diff_adjusted: last.diff_adjusted,
            strength: last.diff_adjusted.abs() * 10_000.0,
            rsi: last.rsi,
            change_count: last.change_log.len(),
            last_change: last.change_log.last(),
            price: last.price(),
        })
    }
}

pub fn decide(bar: &AnalyzedBar) -> Decision {
    if bar.rsi > OVERBOUGHT_RSI && !bar.buy_signal {
        return Decision::Sell;
    }
    if bar.rsi < OVERSOLD_RSI && bar.buy_signal {
        return Decision::Buy;
    }
    if bar.buy_signal {
        Decision::Buy
    } else {
        Decision::Sell
    }
}

/// Decision for a possibly empty series; no bars means hold.
pub fn latest_decision(bars: &[AnalyzedBar]) -> Decision {
    bars.last().map_or(Decision::Hold, decide)
}
