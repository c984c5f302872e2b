//! Per-symbol analyzed series.

use crate::domain::analyzed::AnalyzedBar;
use crate::domain::bar::Bar;
use crate::domain::error::MacdrankError;
use crate::domain::indicator::{analyze_bars, IndicatorConfig};
use crate::domain::signal::{apply_signals, SignalSummary};
use std::collections::HashMap;
use std::sync::Arc;

/// A symbol and its analyzed bars, strictly increasing by time.
///
/// Bars are reference counted so the time aligner can repeat a bar without
/// copying it.
#[derive(Debug, Clone)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<Arc<AnalyzedBar>>,
    time_index: HashMap<i64, usize>,
}

impl SymbolSeries {
    pub fn new(symbol: String, bars: Vec<AnalyzedBar>) -> Self {
        Self::from_shared(symbol, bars.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(symbol: String, bars: Vec<Arc<AnalyzedBar>>) -> Self {
        let time_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.time(), i))
            .collect();
        SymbolSeries {
            symbol,
            bars,
            time_index,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get_bar(&self, time: i64) -> Option<&Arc<AnalyzedBar>> {
        self.time_index.get(&time).map(|&i| &self.bars[i])
    }

    pub fn last(&self) -> Option<&AnalyzedBar> {
        self.bars.last().map(Arc::as_ref)
    }

    pub fn summary(&self) -> Option<SignalSummary> {
        let last = self.last()?;
        SignalSummary::from_bars(std::slice::from_ref(last))
    }
}

/// Indicator engine followed by the signal tracker for one symbol.
///
/// Needs at least `warmup_count + 1` bars; anything shorter is rejected as
/// insufficient. At exactly that length every bar is still in warm-up, so the
/// series is analyzed but carries no signal.
pub fn analyze_symbol(
    symbol: &str,
    bars: &[Bar],
    config: &IndicatorConfig,
) -> Result<SymbolSeries, MacdrankError> {
    let minimum = config.warmup_count + 1;
    if bars.len() < minimum {
        return Err(MacdrankError::DataInsufficient {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum,
        });
    }
    let analyzed = analyze_bars(symbol, bars, config)?;
    let signaled = apply_signals(analyzed, config.warmup_count);
    Ok(SymbolSeries::new(symbol.to_string(), signaled))
}
