//! Ticker list port trait.

use crate::domain::error::MacdrankError;

pub trait TickerPort {
    /// Upper-cased, de-duplicated symbols in listing order.
    fn load_tickers(&self) -> Result<Vec<String>, MacdrankError>;
}
