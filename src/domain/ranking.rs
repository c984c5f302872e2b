//! Cross-sectional ranking and best-candidate selection.

use crate::domain::timeline::AlignedSeries;

/// Gating thresholds a symbol must pass to be bought.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateFilter {
    /// `diff` must be strictly greater.
    pub min_buy_signal: f64,
    /// Close price must be strictly lower.
    pub max_share_price: f64,
    /// When set, close price must also be strictly lower than this cash amount.
    pub available_cash: Option<f64>,
    /// Only consider symbols with a real observation at the step.
    pub require_fresh: bool,
}

impl CandidateFilter {
    pub fn accepts(&self, series: &AlignedSeries, d: usize) -> bool {
        let bar = series.bar(d);
        let price = bar.price();
        bar.diff > self.min_buy_signal
            && price < self.max_share_price
            && bar.buy_signal
            && self.available_cash.is_none_or(|cash| price < cash)
            && (!self.require_fresh || series.is_fresh(d))
    }
}

/// Indices into `series` ordered by `diff_adjusted` at `d`, ascending.
/// Ties keep their input order.
pub fn rank_at(series: &[AlignedSeries], d: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..series.len()).collect();
    order.sort_by(|&a, &b| {
        series[a]
            .bar(d)
            .diff_adjusted
            .total_cmp(&series[b].bar(d).diff_adjusted)
    });
    order
}

/// Walk `ranked` from lowest to highest and keep the last accepted index,
/// i.e. the highest-ranked symbol passing every gate.
pub fn best_candidate(
    series: &[AlignedSeries],
    ranked: &[usize],
    d: usize,
    filter: &CandidateFilter,
) -> Option<usize> {
    let mut best = None;
    for &idx in ranked {
        if filter.accepts(&series[idx], d) {
            best = Some(idx);
        }
    }
    best
}
