//! Indicator engine.
//!
//! A single forward pass over a bar series producing EMA, MACD and RSI
//! values per bar. Each step depends only on the previous step's state, so
//! separate symbols can be analyzed concurrently with no shared state.

pub mod ema;
pub mod macd;
pub mod rsi;

use crate::domain::analyzed::{AnalyzedBar, ChangeLog};
use crate::domain::bar::{ensure_ordered, Bar};
use crate::domain::error::MacdrankError;
use macd::{MacdPoint, MacdState, DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use rsi::{RsiPoint, RsiState, DEFAULT_RSI_PERIOD};

/// Signals stay off for this many bars on end-of-day data.
pub const DEFAULT_WARMUP_COUNT: usize = 30;

/// Smoothing periods and signal warm-up, passed into every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub rsi_period: usize,
    pub warmup_count: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            fast_period: DEFAULT_FAST,
            slow_period: DEFAULT_SLOW,
            signal_period: DEFAULT_SIGNAL,
            rsi_period: DEFAULT_RSI_PERIOD,
            warmup_count: DEFAULT_WARMUP_COUNT,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), MacdrankError> {
        let periods = [
            ("fast_period", self.fast_period),
            ("slow_period", self.slow_period),
            ("signal_period", self.signal_period),
            ("rsi_period", self.rsi_period),
        ];
        for (key, value) in periods {
            if value == 0 {
                return Err(MacdrankError::invalid_config(key, "period must be positive"));
            }
        }
        Ok(())
    }
}

/// Run the indicator engine over `bars`.
///
/// The produced bars carry no signal yet (`buy_signal == false`, empty
/// change log); see [`crate::domain::signal::apply_signals`].
pub fn analyze_bars(
    symbol: &str,
    bars: &[Bar],
    config: &IndicatorConfig,
) -> Result<Vec<AnalyzedBar>, MacdrankError> {
    config.validate()?;
    let Some(first) = bars.first() else {
        return Err(MacdrankError::DataInsufficient {
            symbol: symbol.to_string(),
            bars: 0,
            minimum: 1,
        });
    };
    ensure_ordered(symbol, bars)?;

    let (mut macd, seed_macd) = MacdState::seed(
        config.fast_period,
        config.slow_period,
        config.signal_period,
        first.close,
    );
    let (mut rsi, seed_rsi) = RsiState::seed(config.rsi_period, first.close);

    let empty_log = ChangeLog::new();
    let mut out = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let (m, r) = if i == 0 {
            (seed_macd, seed_rsi)
        } else {
            (macd.step(bar.close), rsi.step(bar.close))
        };
        if bar.close == 0.0 {
            return Err(MacdrankError::DivisionByZero {
                symbol: symbol.to_string(),
                index: i,
                quantity: "close price".to_string(),
            });
        }
        let next_price = bars.get(i + 1).map_or(bar.close, |next| next.open);
        out.push(annotate(*bar, m, r, next_price, empty_log.clone()));
    }
    Ok(out)
}

fn annotate(
    bar: Bar,
    m: MacdPoint,
    r: RsiPoint,
    next_price: f64,
    change_log: ChangeLog,
) -> AnalyzedBar {
    AnalyzedBar {
        bar,
        ema_fast: m.ema_fast,
        ema_slow: m.ema_slow,
        macd_fast: m.macd_fast,
        macd_slow: m.macd_slow,
        diff: m.diff,
        diff_adjusted: m.diff / bar.close,
        buy_signal: false,
        change_log,
        cash: 0.0,
        shares: 0,
        next_price,
        smma_up: r.smma_up,
        smma_down: r.smma_down,
        rsi: r.rsi,
    }
}
