//! Single-symbol paper portfolio replay.
//!
//! Walks one symbol's signaled bars with a private cash balance: when the buy
//! signal is on and nothing is held, buys as many whole units as the cash
//! covers at the bar's next price; when the signal is off and units are held,
//! sells them all at the close. Each produced bar carries the cash and share
//! count after its step. Input bars are never modified.

use crate::domain::analyzed::AnalyzedBar;
use crate::domain::series::SymbolSeries;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct PaperSummary {
    pub cash: f64,
    pub shares: i64,
    pub price: f64,
    pub trades: usize,
}

impl PaperSummary {
    pub fn equity(&self) -> f64 {
        self.cash + self.shares as f64 * self.price
    }
}

/// Replay `bars`, returning copies stamped with `cash` and `shares`.
pub fn replay<'a, I>(bars: I, starting_cash: f64) -> Vec<AnalyzedBar>
where
    I: IntoIterator<Item = &'a AnalyzedBar>,
{
    let mut cash = starting_cash;
    let mut shares: i64 = 0;

    bars.into_iter()
        .map(|bar| {
            if bar.buy_signal && shares == 0 && bar.next_price > 0.0 {
                let quantity = (cash / bar.next_price).floor() as i64;
                if quantity > 0 {
                    cash -= quantity as f64 * bar.next_price;
                    shares = quantity;
                }
            } else if !bar.buy_signal && shares > 0 {
                cash += shares as f64 * bar.price();
                shares = 0;
            }
            AnalyzedBar {
                cash,
                shares,
                ..bar.clone()
            }
        })
        .collect()
}

/// Replay a whole series into a new series.
pub fn replay_series(series: &SymbolSeries, starting_cash: f64) -> SymbolSeries {
    let replayed = replay(series.bars.iter().map(Arc::as_ref), starting_cash);
    SymbolSeries::new(series.symbol.clone(), replayed)
}

/// Final paper position of a replayed sequence.
pub fn summarize(bars: &[AnalyzedBar]) -> Option<PaperSummary> {
    let last = bars.last()?;
    let trades = bars
        .windows(2)
        .filter(|pair| pair[0].shares != pair[1].shares)
        .count()
        + usize::from(bars[0].shares != 0);
    Some(PaperSummary {
        cash: last.cash,
        shares: last.shares,
        price: last.price(),
        trades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use approx::assert_abs_diff_eq;

    fn bar(time: i64, close: f64, next_price: f64, buy_signal: bool) -> AnalyzedBar {
        AnalyzedBar {
            buy_signal,
            next_price,
            ..AnalyzedBar::from_bar(Bar::new(time, close, close))
        }
    }

    #[test]
    fn buys_at_next_price_and_sells_at_close() {
        let bars = vec![
            bar(1, 10.0, 10.0, false),
            bar(2, 10.0, 12.0, true),
            bar(3, 13.0, 14.0, true),
            bar(4, 15.0, 15.0, false),
        ];
        let out = replay(&bars, 100.0);

        assert_eq!(out[0].shares, 0);
        assert_abs_diff_eq!(out[0].cash, 100.0);
        // floor(100 / 12) = 8 units, 96 spent
        assert_eq!(out[1].shares, 8);
        assert_abs_diff_eq!(out[1].cash, 4.0);
        assert_eq!(out[2].shares, 8);
        assert_eq!(out[3].shares, 0);
        assert_abs_diff_eq!(out[3].cash, 4.0 + 8.0 * 15.0);

        let summary = summarize(&out).unwrap();
        assert_eq!(summary.trades, 2);
        assert_abs_diff_eq!(summary.equity(), 124.0);
    }

    #[test]
    fn input_is_untouched() {
        let bars = vec![bar(1, 10.0, 10.0, true)];
        let out = replay(&bars, 50.0);
        assert_eq!(bars[0].shares, 0);
        assert_eq!(out[0].shares, 5);
    }

    #[test]
    fn too_little_cash_buys_nothing() {
        let bars = vec![bar(1, 10.0, 20.0, true), bar(2, 10.0, 20.0, true)];
        let out = replay(&bars, 15.0);
        assert!(out.iter().all(|b| b.shares == 0));
        assert_abs_diff_eq!(summarize(&out).unwrap().equity(), 15.0);
    }

    #[test]
    fn open_position_marked_at_last_close() {
        let bars = vec![bar(1, 10.0, 10.0, true), bar(2, 11.0, 11.0, true)];
        let out = replay(&bars, 30.0);
        let summary = summarize(&out).unwrap();
        assert_eq!(summary.shares, 3);
        assert_abs_diff_eq!(summary.equity(), 33.0);
        assert_eq!(summary.trades, 1);
    }

    #[test]
    fn empty_replay() {
        assert!(replay(&[], 10.0).is_empty());
        assert!(summarize(&[]).is_none());
    }
}
