//! macdrank: MACD momentum ranking and Monte-Carlo backtesting.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod logging;
pub mod cli;
