//! Configuration validation.
//!
//! Reads the `[indicators]`, `[simulation]` and `[data]` sections through a
//! [`ConfigPort`] and builds typed, validated configuration values. Missing
//! keys take their defaults; present but malformed keys are rejected.

use crate::domain::analysis::AnalysisConfig;
use crate::domain::error::MacdrankError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::simulation::SimulationConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DateRange;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Every section of a configuration file, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub indicators: IndicatorConfig,
    pub simulation: SimulationConfig,
    pub analysis: AnalysisConfig,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<AppConfig, MacdrankError> {
    Ok(AppConfig {
        indicators: validate_indicator_config(config)?,
        simulation: validate_simulation_config(config)?,
        analysis: validate_analysis_config(config)?,
    })
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, MacdrankError> {
    let defaults = IndicatorConfig::default();
    let indicators = IndicatorConfig {
        fast_period: read_usize(config, "indicators", "fast_period", defaults.fast_period)?,
        slow_period: read_usize(config, "indicators", "slow_period", defaults.slow_period)?,
        signal_period: read_usize(config, "indicators", "signal_period", defaults.signal_period)?,
        rsi_period: read_usize(config, "indicators", "rsi_period", defaults.rsi_period)?,
        warmup_count: read_usize(config, "indicators", "warmup_count", defaults.warmup_count)?,
    };
    indicators.validate()?;
    Ok(indicators)
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, MacdrankError> {
    let defaults = SimulationConfig::default();
    let seed = match config.get_string("simulation", "seed") {
        None => None,
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            MacdrankError::invalid_config("seed", format!("expected an unsigned integer, got {raw:?}"))
        })?),
    };
    let simulation = SimulationConfig {
        iterations: read_usize(config, "simulation", "iterations", defaults.iterations)?,
        window_length: read_usize(config, "simulation", "window_length", defaults.window_length)?,
        starting_cash: read_f64(config, "simulation", "starting_cash", defaults.starting_cash)?,
        min_buy_signal: read_f64(config, "simulation", "min_buy_signal", defaults.min_buy_signal)?,
        max_share_price: read_f64(config, "simulation", "max_share_price", defaults.max_share_price)?,
        min_cash_limit: read_f64(config, "simulation", "min_cash_limit", defaults.min_cash_limit)?,
        require_affordable: config.get_bool(
            "simulation",
            "require_affordable",
            defaults.require_affordable,
        ),
        seed,
        parallel: config.get_bool("simulation", "parallel", defaults.parallel),
    };
    simulation.validate()?;
    Ok(simulation)
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, MacdrankError> {
    let defaults = AnalysisConfig::default();
    let analysis = AnalysisConfig {
        concurrency: read_usize(config, "data", "concurrency", defaults.concurrency)?,
        symbols_per_request: read_usize(
            config,
            "data",
            "symbols_per_request",
            defaults.symbols_per_request,
        )?,
        range: DateRange::new(
            read_date(config, "data", "start")?,
            read_date(config, "data", "end")?,
        ),
    };
    analysis.validate()?;
    Ok(analysis)
}

/// Locations of the bar directory and ticker list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub directory: PathBuf,
    pub tickers: PathBuf,
}

pub fn validate_data_paths(config: &dyn ConfigPort) -> Result<DataPaths, MacdrankError> {
    Ok(DataPaths {
        directory: required_string(config, "data", "directory")?.into(),
        tickers: required_string(config, "data", "tickers")?.into(),
    })
}

fn required_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, MacdrankError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(MacdrankError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, MacdrankError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| MacdrankError::invalid_config(key, format!("expected an integer, got {raw:?}")))?;
    usize::try_from(value)
        .map_err(|_| MacdrankError::invalid_config(key, format!("{key} must not be negative")))
}

fn read_f64(config: &dyn ConfigPort, section: &str, key: &str, default: f64) -> Result<f64, MacdrankError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| MacdrankError::invalid_config(key, format!("expected a number, got {raw:?}")))?;
    if !value.is_finite() {
        return Err(MacdrankError::invalid_config(key, format!("{key} must be finite")));
    }
    Ok(value)
}

fn read_date(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<NaiveDate>, MacdrankError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                MacdrankError::invalid_config(key, format!("invalid {key} format, expected YYYY-MM-DD"))
            }),
    }
}
