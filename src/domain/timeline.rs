//! Unified timeline and forward-fill alignment across symbols.

use crate::domain::analyzed::AnalyzedBar;
use crate::domain::error::{MacdrankError, SymbolFailure};
use crate::domain::series::SymbolSeries;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

/// Every distinct bar time across `series`, ascending.
pub fn build_unified_timeline(series: &[SymbolSeries]) -> Vec<i64> {
    let unique_times: BTreeSet<i64> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|bar| bar.time()))
        .collect();
    unique_times.into_iter().collect()
}

/// A series laid onto the shared axis.
///
/// `bars[k]` is the most recent bar known at `axis[k]`, shared with the
/// source series. Its own `time` is older than `axis[k]` when the symbol had
/// no bar at that time.
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    pub symbol: String,
    pub axis: Arc<[i64]>,
    pub bars: Vec<Arc<AnalyzedBar>>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn time(&self, k: usize) -> i64 {
        self.axis[k]
    }

    pub fn bar(&self, k: usize) -> &AnalyzedBar {
        &self.bars[k]
    }

    /// True when the symbol has a real observation at `axis[k]`.
    pub fn is_fresh(&self, k: usize) -> bool {
        self.bars[k].time() == self.axis[k]
    }
}

#[derive(Debug)]
pub struct Alignment {
    pub axis: Arc<[i64]>,
    pub series: Vec<AlignedSeries>,
    pub failures: Vec<SymbolFailure>,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }
}

/// Forward-fill every series onto the union of all bar times.
///
/// Before a symbol's first bar, its first bar is repeated. Empty series are
/// reported as failures and left out; the rest are still aligned.
pub fn align_series(series: &[SymbolSeries]) -> Alignment {
    let axis: Arc<[i64]> = Arc::from(build_unified_timeline(series));
    let mut aligned = Vec::with_capacity(series.len());
    let mut failures = Vec::new();

    for s in series {
        let Some(first) = s.bars.first() else {
            warn!(symbol = %s.symbol, "skipping symbol with no bars during alignment");
            failures.push(SymbolFailure {
                symbol: s.symbol.clone(),
                error: MacdrankError::DataInsufficient {
                    symbol: s.symbol.clone(),
                    bars: 0,
                    minimum: 1,
                },
            });
            continue;
        };

        let mut last_known = Arc::clone(first);
        let mut bars = Vec::with_capacity(axis.len());
        for &t in axis.iter() {
            if let Some(bar) = s.get_bar(t) {
                last_known = Arc::clone(bar);
            }
            bars.push(Arc::clone(&last_known));
        }
        aligned.push(AlignedSeries {
            symbol: s.symbol.clone(),
            axis: Arc::clone(&axis),
            bars,
        });
    }

    Alignment {
        axis,
        series: aligned,
        failures,
    }
}
