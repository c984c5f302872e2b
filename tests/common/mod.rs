#![allow(dead_code)]

use macdrank::domain::bar::Bar;
use macdrank::domain::error::MacdrankError;
use macdrank::domain::indicator::IndicatorConfig;
use macdrank::domain::series::{analyze_symbol, SymbolSeries};
use macdrank::domain::timeline::{align_series, AlignedSeries};
use macdrank::ports::data_port::{DataPort, DateRange};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DAY: i64 = 86_400;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub fetches: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>, MacdrankError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MacdrankError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| bars.iter().copied().filter(|b| range.contains(b)).collect())
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, MacdrankError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Daily bars with `open == close`, starting one day after the epoch.
pub fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(DAY * (i as i64 + 1), c, c))
        .collect()
}

/// Bars at arbitrary times with `open == close`.
pub fn bars_at(points: &[(i64, f64)]) -> Vec<Bar> {
    points.iter().map(|&(t, c)| Bar::new(t, c, c)).collect()
}

/// Fast 2, slow 3, signal 2, no warm-up.
pub fn short_config() -> IndicatorConfig {
    IndicatorConfig {
        fast_period: 2,
        slow_period: 3,
        signal_period: 2,
        warmup_count: 0,
        ..IndicatorConfig::default()
    }
}

pub const FLAT: [f64; 5] = [10.0, 10.0, 10.0, 10.0, 10.0];
pub const UP: [f64; 5] = [10.0, 11.0, 12.0, 13.0, 14.0];
pub const DOWN: [f64; 5] = [10.0, 9.0, 8.0, 7.0, 6.0];

/// The three synthetic symbols, analyzed with [`short_config`], in
/// FLAT, UP, DOWN order.
pub fn three_symbols() -> Vec<SymbolSeries> {
    [("FLAT", &FLAT), ("UP", &UP), ("DOWN", &DOWN)]
        .iter()
        .map(|(symbol, closes)| analyze_symbol(symbol, &daily_bars(*closes), &short_config()).unwrap())
        .collect()
}

pub fn three_aligned() -> Vec<AlignedSeries> {
    align_series(&three_symbols()).series
}

/// 40 flat bars at 100, then +1 x30, -1 x30, +1 x30.
pub fn zigzag_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 40];
    for _ in 0..30 {
        let last = *closes.last().unwrap();
        closes.push(last + 1.0);
    }
    for _ in 0..30 {
        let last = *closes.last().unwrap();
        closes.push(last - 1.0);
    }
    for _ in 0..30 {
        let last = *closes.last().unwrap();
        closes.push(last + 1.0);
    }
    closes
}

pub fn trending(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}
