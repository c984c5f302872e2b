//! Core domain types and logic.

pub mod bar;
pub mod analyzed;
pub mod indicator;
pub mod signal;
pub mod paper;
pub mod series;
pub mod timeline;
pub mod ranking;
pub mod portfolio;
pub mod simulation;
pub mod stats;
pub mod analysis;
pub mod config_validation;
pub mod error;
