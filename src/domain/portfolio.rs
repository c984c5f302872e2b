//! Trial portfolio state and trade log.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub price: f64,
    pub time: i64,
}

impl TradeEvent {
    pub fn value(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: i64,
    pub cash: f64,
    pub holdings_value: f64,
}

impl EquityPoint {
    pub fn total(&self) -> f64 {
        self.cash + self.holdings_value
    }
}

/// Cash, holdings and trade log of one simulated trial.
///
/// Holdings are kept in symbol order so iteration is reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialState {
    pub cash: f64,
    pub holdings: BTreeMap<String, u64>,
    pub trade_log: Vec<TradeEvent>,
}

impl TrialState {
    pub fn new(starting_cash: f64) -> Self {
        TrialState {
            cash: starting_cash,
            holdings: BTreeMap::new(),
            trade_log: Vec::new(),
        }
    }

    pub fn quantity(&self, symbol: &str) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    pub fn buy(&mut self, symbol: &str, quantity: u64, price: f64, time: i64) {
        self.cash -= quantity as f64 * price;
        *self.holdings.entry(symbol.to_string()).or_insert(0) += quantity;
        self.trade_log.push(TradeEvent {
            symbol: symbol.to_string(),
            side: Side::Buy,
            quantity,
            price,
            time,
        });
    }

    /// Sell the entire holding of `symbol`; returns the quantity sold.
    pub fn sell_all(&mut self, symbol: &str, price: f64, time: i64) -> u64 {
        let quantity = self.holdings.remove(symbol).unwrap_or(0);
        if quantity == 0 {
            return 0;
        }
        self.cash += quantity as f64 * price;
        self.trade_log.push(TradeEvent {
            symbol: symbol.to_string(),
            side: Side::Sell,
            quantity,
            price,
            time,
        });
        quantity
    }

    /// Symbols with a positive holding, in symbol order.
    pub fn held_symbols(&self) -> Vec<String> {
        self.holdings
            .iter()
            .filter(|&(_, &q)| q > 0)
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn holdings_value(&self, price_map: &HashMap<String, f64>) -> f64 {
        self.holdings
            .iter()
            .filter_map(|(symbol, &q)| price_map.get(symbol).map(|&p| q as f64 * p))
            .sum()
    }

    pub fn total_assets(&self, price_map: &HashMap<String, f64>) -> f64 {
        self.cash + self.holdings_value(price_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn new_state() {
        let state = TrialState::new(1_000.0);
        assert_abs_diff_eq!(state.cash, 1_000.0);
        assert!(state.holdings.is_empty());
        assert!(state.trade_log.is_empty());
    }

    #[test]
    fn buy_deducts_cost_and_records_event() {
        let mut state = TrialState::new(1_000.0);
        state.buy("AAA", 83, 12.0, 5);
        assert_abs_diff_eq!(state.cash, 4.0);
        assert_eq!(state.quantity("AAA"), 83);
        assert_eq!(state.trade_log[0].side, Side::Buy);
        assert_abs_diff_eq!(state.trade_log[0].value(), 996.0);
    }

    #[test]
    fn repeated_buys_accumulate() {
        let mut state = TrialState::new(1_000.0);
        state.buy("AAA", 10, 10.0, 1);
        state.buy("AAA", 5, 10.0, 2);
        assert_eq!(state.quantity("AAA"), 15);
        assert_eq!(state.holdings.len(), 1);
    }

    #[test]
    fn sell_all_adds_proceeds_and_clears_holding() {
        let mut state = TrialState::new(100.0);
        state.buy("AAA", 10, 10.0, 1);
        let sold = state.sell_all("AAA", 12.0, 2);
        assert_eq!(sold, 10);
        assert_abs_diff_eq!(state.cash, 120.0);
        assert_eq!(state.quantity("AAA"), 0);
        assert_eq!(state.trade_log.len(), 2);
        assert_eq!(state.trade_log[1].side, Side::Sell);
    }

    #[test]
    fn selling_nothing_records_nothing() {
        let mut state = TrialState::new(100.0);
        assert_eq!(state.sell_all("AAA", 12.0, 2), 0);
        assert!(state.trade_log.is_empty());
    }

    #[test]
    fn total_assets_marks_to_price_map() {
        let mut state = TrialState::new(1_000.0);
        state.buy("AAA", 10, 50.0, 1);
        state.buy("BBB", 5, 20.0, 1);
        let prices = HashMap::from([("AAA".to_string(), 55.0), ("BBB".to_string(), 10.0)]);
        assert_abs_diff_eq!(state.total_assets(&prices), 400.0 + 550.0 + 50.0);
        assert_eq!(state.held_symbols(), vec!["AAA", "BBB"]);
    }
}
