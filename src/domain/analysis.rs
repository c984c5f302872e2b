//! Batch analysis of a ticker universe.
//!
//! Tickers are split into request batches and fetched on a bounded rayon
//! pool. Each symbol runs through the indicator engine and signal tracker on
//! its own; a symbol that cannot be fetched or analyzed is logged, recorded
//! as a failure and left out, and the rest of the batch carries on.

use crate::domain::error::{MacdrankError, SymbolFailure};
use crate::domain::indicator::IndicatorConfig;
use crate::domain::series::{analyze_symbol, SymbolSeries};
use crate::ports::data_port::{DataPort, DateRange};
use rayon::prelude::*;
use tracing::{debug, info, warn};

type SymbolResult = (String, Result<SymbolSeries, MacdrankError>);

pub const DEFAULT_CONCURRENCY: usize = 3;
pub const DEFAULT_SYMBOLS_PER_REQUEST: usize = 101;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Worker threads fetching and analyzing batches.
    pub concurrency: usize,
    pub symbols_per_request: usize,
    pub range: DateRange,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            concurrency: DEFAULT_CONCURRENCY,
            symbols_per_request: DEFAULT_SYMBOLS_PER_REQUEST,
            range: DateRange::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), MacdrankError> {
        if self.concurrency == 0 {
            return Err(MacdrankError::invalid_config(
                "concurrency",
                "concurrency must be positive",
            ));
        }
        if self.symbols_per_request == 0 {
            return Err(MacdrankError::invalid_config(
                "symbols_per_request",
                "symbols_per_request must be positive",
            ));
        }
        if let (Some(start), Some(end)) = (self.range.start, self.range.end) {
            if start > end {
                return Err(MacdrankError::invalid_config(
                    "start",
                    "start must not be after end",
                ));
            }
        }
        Ok(())
    }
}

/// Analyzed series in ticker order, plus the symbols that were left out.
#[derive(Debug)]
pub struct AnalysisReport {
    pub series: Vec<SymbolSeries>,
    pub failures: Vec<SymbolFailure>,
}

/// Fetch and analyze every ticker.
///
/// Fails only on invalid configuration or when no symbol survives.
pub fn analyze_universe(
    source: &dyn DataPort,
    tickers: &[String],
    indicators: &IndicatorConfig,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, MacdrankError> {
    indicators.validate()?;
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency)
        .build()
        .map_err(|e| MacdrankError::invalid_config("concurrency", e.to_string()))?;

    info!(
        symbols = tickers.len(),
        batches = tickers.len().div_ceil(config.symbols_per_request),
        workers = config.concurrency,
        "analyzing universe"
    );

    let batches: Vec<Vec<SymbolResult>> = pool.install(|| {
        tickers
            .par_chunks(config.symbols_per_request)
            .map(|batch| {
                debug!(size = batch.len(), first = %batch[0], "fetching batch");
                source
                    .fetch_batch(batch, &config.range)
                    .into_iter()
                    .map(|(symbol, bars)| {
                        let analyzed = bars.and_then(|bars| analyze_symbol(&symbol, &bars, indicators));
                        (symbol, analyzed)
                    })
                    .collect::<Vec<SymbolResult>>()
            })
            .collect()
    });

    let mut series = Vec::with_capacity(tickers.len());
    let mut failures = Vec::new();
    for (symbol, result) in batches.into_iter().flatten() {
        match result {
            Ok(s) => {
                debug!(symbol = %symbol, bars = s.len(), "analyzed");
                series.push(s);
            }
            Err(error) => {
                warn!(symbol = %symbol, error = %error, "skipping symbol");
                failures.push(SymbolFailure { symbol, error });
            }
        }
    }

    if series.is_empty() {
        return Err(MacdrankError::DataInsufficient {
            symbol: "universe".to_string(),
            bars: 0,
            minimum: indicators.warmup_count + 1,
        });
    }

    if !failures.is_empty() {
        info!(
            analyzed = series.len(),
            requested = tickers.len(),
            "some symbols were skipped"
        );
    }

    Ok(AnalysisReport { series, failures })
}
