//! MACD (Moving Average Convergence Divergence), streaming form.
//!
//! MACD fast line = EMA(fast) - EMA(slow)
//! MACD slow line = EMA(signal) of the fast line, seeded at 0
//! Diff = fast line - slow line
//!
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::indicator::ema::Ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd_fast: f64,
    pub macd_slow: f64,
    pub diff: f64,
}

#[derive(Debug, Clone)]
pub struct MacdState {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl MacdState {
    /// Seed both EMAs with the first close; both MACD lines start at zero.
    pub fn seed(fast: usize, slow: usize, signal: usize, close: f64) -> (Self, MacdPoint) {
        let state = MacdState {
            fast: Ema::seeded(fast, close),
            slow: Ema::seeded(slow, close),
            signal: Ema::seeded(signal, 0.0),
        };
        let point = MacdPoint {
            ema_fast: close,
            ema_slow: close,
            macd_fast: 0.0,
            macd_slow: 0.0,
            diff: 0.0,
        };
        (state, point)
    }

    pub fn step(&mut self, close: f64) -> MacdPoint {
        let ema_fast = self.fast.update(close);
        let ema_slow = self.slow.update(close);
        let macd_fast = ema_fast - ema_slow;
        let macd_slow = self.signal.update(macd_fast);
        MacdPoint {
            ema_fast,
            ema_slow,
            macd_fast,
            macd_slow,
            diff: macd_fast - macd_slow,
        }
    }
}
