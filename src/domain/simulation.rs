//! Monte-Carlo backtest over random windows of aligned series.
//!
//! Each trial picks a start index, resets a [`TrialState`] and walks the
//! window one step at a time: rank the cross-section, buy the best candidate
//! at its next price while cash exceeds the limit, then sell every holding
//! whose buy signal is off at the step's close. Trials are independent and
//! may run on the rayon pool; steps within a trial are strictly sequential.

use crate::domain::error::{MacdrankError, TrialFailure};
use crate::domain::portfolio::{EquityPoint, TradeEvent, TrialState};
use crate::domain::ranking::{best_candidate, rank_at, CandidateFilter};
use crate::domain::stats::SimulationSummary;
use crate::domain::timeline::AlignedSeries;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub iterations: usize,
    /// Steps per trial.
    pub window_length: usize,
    pub starting_cash: f64,
    /// Minimum raw MACD diff for a buy.
    pub min_buy_signal: f64,
    pub max_share_price: f64,
    /// Buys only happen while cash is strictly above this.
    pub min_cash_limit: f64,
    /// Also require the close price to be below the current cash.
    pub require_affordable: bool,
    /// Master seed; a random one is drawn (and logged) when absent.
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            iterations: 50,
            window_length: 60,
            starting_cash: 2_000.0,
            min_buy_signal: 4.0,
            max_share_price: 1_000.0,
            min_cash_limit: 100.0,
            require_affordable: false,
            seed: None,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), MacdrankError> {
        if self.iterations == 0 {
            return Err(MacdrankError::invalid_config(
                "iterations",
                "iterations must be positive",
            ));
        }
        if self.window_length == 0 {
            return Err(MacdrankError::invalid_config(
                "window_length",
                "window_length must be positive",
            ));
        }
        if !(self.starting_cash.is_finite() && self.starting_cash > 0.0) {
            return Err(MacdrankError::invalid_config(
                "starting_cash",
                "starting_cash must be positive",
            ));
        }
        if !(self.max_share_price > 0.0) {
            return Err(MacdrankError::invalid_config(
                "max_share_price",
                "max_share_price must be positive",
            ));
        }
        if !(self.min_cash_limit >= 0.0) {
            return Err(MacdrankError::invalid_config(
                "min_cash_limit",
                "min_cash_limit must be non-negative",
            ));
        }
        Ok(())
    }

    fn candidate_filter(&self, cash: f64) -> CandidateFilter {
        CandidateFilter {
            min_buy_signal: self.min_buy_signal,
            max_share_price: self.max_share_price,
            available_cash: self.require_affordable.then_some(cash),
            require_fresh: true,
        }
    }
}

/// Source of trial start indices.
pub trait WindowSampler: Sync {
    /// Start index for `trial`, expected in `0..=max_start`.
    fn start_index(&self, trial: usize, max_start: usize) -> usize;
}

/// Uniform random starts, one independent stream per trial.
///
/// Per-trial seeds are drawn up front from the master seed, so the start of a
/// trial does not depend on which thread runs it or in what order.
#[derive(Debug, Clone)]
pub struct SeededWindows {
    master_seed: u64,
    trial_seeds: Vec<u64>,
}

impl SeededWindows {
    pub fn new(master_seed: u64, iterations: usize) -> Self {
        let mut master = StdRng::seed_from_u64(master_seed);
        let trial_seeds = (0..iterations).map(|_| master.next_u64()).collect();
        SeededWindows {
            master_seed,
            trial_seeds,
        }
    }

    pub fn rng_for(&self, trial: usize) -> StdRng {
        let seed = self
            .trial_seeds
            .get(trial)
            .copied()
            .unwrap_or_else(|| self.master_seed.wrapping_add(trial as u64));
        StdRng::seed_from_u64(seed)
    }
}

impl WindowSampler for SeededWindows {
    fn start_index(&self, trial: usize, max_start: usize) -> usize {
        self.rng_for(trial).gen_range(0..=max_start)
    }
}

/// Predetermined starts, cycled by trial index. Used to replay a window.
#[derive(Debug, Clone)]
pub struct FixedWindows(pub Vec<usize>);

impl WindowSampler for FixedWindows {
    fn start_index(&self, trial: usize, _max_start: usize) -> usize {
        if self.0.is_empty() {
            return 0;
        }
        self.0[trial % self.0.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub trial: usize,
    pub start_index: usize,
    pub start_time: i64,
    pub end_time: i64,
    pub trades: Vec<TradeEvent>,
    pub final_cash: f64,
    pub holdings: BTreeMap<String, u64>,
    pub total_assets: f64,
    /// Portfolio after each step, marked at that step's closes.
    pub equity_curve: Vec<EquityPoint>,
}

#[derive(Debug)]
pub struct SimulationReport {
    /// Master seed used for sampling, when sampling was seeded.
    pub seed: Option<u64>,
    pub summary: SimulationSummary,
    pub outcomes: Vec<TrialOutcome>,
    pub failures: Vec<TrialFailure>,
}

/// Run the simulation with seeded random windows.
pub fn run_simulation(
    series: &[AlignedSeries],
    config: &SimulationConfig,
) -> Result<SimulationReport, MacdrankError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    info!(seed, iterations = config.iterations, "seeding trial windows");
    let sampler = SeededWindows::new(seed, config.iterations);
    let mut report = run_simulation_with(series, config, &sampler)?;
    report.seed = Some(seed);
    Ok(report)
}

/// Run the simulation drawing trial starts from `sampler`.
pub fn run_simulation_with(
    series: &[AlignedSeries],
    config: &SimulationConfig,
    sampler: &dyn WindowSampler,
) -> Result<SimulationReport, MacdrankError> {
    config.validate()?;
    let ctx = TrialContext::new(series, config)?;

    info!(
        symbols = series.len(),
        steps = ctx.series_len,
        iterations = config.iterations,
        window = config.window_length,
        "running simulation"
    );

    let results: Vec<Result<TrialOutcome, MacdrankError>> = if config.parallel {
        (0..config.iterations)
            .into_par_iter()
            .map(|trial| ctx.run_trial(trial, sampler))
            .collect()
    } else {
        (0..config.iterations)
            .map(|trial| ctx.run_trial(trial, sampler))
            .collect()
    };

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (trial, result) in results.into_iter().enumerate() {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => {
                warn!(trial, error = %error, "trial aborted");
                failures.push(TrialFailure { trial, error });
            }
        }
    }

    if outcomes.is_empty() && !failures.is_empty() {
        let first = failures.swap_remove(0);
        return Err(MacdrankError::TrialFailed {
            trial: first.trial,
            source: Box::new(first.error),
        });
    }

    let totals: Vec<f64> = outcomes.iter().map(|o| o.total_assets).collect();
    let summary = SimulationSummary::compute(&totals, config.starting_cash, failures.len());

    Ok(SimulationReport {
        seed: None,
        summary,
        outcomes,
        failures,
    })
}

struct TrialContext<'a> {
    series: &'a [AlignedSeries],
    config: &'a SimulationConfig,
    index: HashMap<&'a str, usize>,
    series_len: usize,
    max_start: usize,
}

impl<'a> TrialContext<'a> {
    fn new(series: &'a [AlignedSeries], config: &'a SimulationConfig) -> Result<Self, MacdrankError> {
        let Some(first) = series.first() else {
            return Err(MacdrankError::DataInsufficient {
                symbol: "universe".to_string(),
                bars: 0,
                minimum: config.window_length.saturating_add(1),
            });
        };
        let series_len = first.len();
        if let Some(odd) = series.iter().find(|s| s.len() != series_len) {
            return Err(MacdrankError::Data {
                reason: format!(
                    "{} has {} steps, expected {} (series are not aligned)",
                    odd.symbol,
                    odd.len(),
                    series_len
                ),
            });
        }
        if series_len <= config.window_length {
            return Err(MacdrankError::DataInsufficient {
                symbol: first.symbol.clone(),
                bars: series_len,
                minimum: config.window_length.saturating_add(1),
            });
        }

        let index = series
            .iter()
            .enumerate()
            .map(|(i, s)| (s.symbol.as_str(), i))
            .collect();

        Ok(TrialContext {
            series,
            config,
            index,
            series_len,
            max_start: series_len - config.window_length - 1,
        })
    }

    fn time(&self, d: usize) -> i64 {
        self.series[0].time(d)
    }

    fn price_map(&self, state: &TrialState, d: usize) -> HashMap<String, f64> {
        state
            .holdings
            .keys()
            .filter_map(|symbol| {
                let idx = *self.index.get(symbol.as_str())?;
                Some((symbol.clone(), self.series[idx].bar(d).price()))
            })
            .collect()
    }

    fn run_trial(&self, trial: usize, sampler: &dyn WindowSampler) -> Result<TrialOutcome, MacdrankError> {
        let start = sampler.start_index(trial, self.max_start);
        if start > self.max_start {
            return Err(MacdrankError::invalid_config(
                "window_start",
                format!("start index {start} is beyond the last valid start {}", self.max_start),
            ));
        }
        let end = start + self.config.window_length - 1;

        let mut state = TrialState::new(self.config.starting_cash);
        let mut equity_curve = Vec::with_capacity(self.config.window_length);
        for d in start..=end {
            self.step(&mut state, d)?;
            let prices = self.price_map(&state, d);
            equity_curve.push(EquityPoint {
                time: self.time(d),
                cash: state.cash,
                holdings_value: state.holdings_value(&prices),
            });
        }

        let total_assets = state.total_assets(&self.price_map(&state, end));
        debug!(trial, start, total_assets, trades = state.trade_log.len(), "trial finished");

        Ok(TrialOutcome {
            trial,
            start_index: start,
            start_time: self.time(start),
            end_time: self.time(end),
            trades: state.trade_log,
            final_cash: state.cash,
            holdings: state.holdings,
            total_assets,
            equity_curve,
        })
    }

    fn step(&self, state: &mut TrialState, d: usize) -> Result<(), MacdrankError> {
        let time = self.time(d);
        let ranked = rank_at(self.series, d);

        if state.cash > self.config.min_cash_limit {
            let filter = self.config.candidate_filter(state.cash);
            if let Some(best) = best_candidate(self.series, &ranked, d, &filter) {
                let candidate = &self.series[best];
                let next_price = candidate.bar(d).next_price;
                if !(next_price > 0.0) {
                    return Err(MacdrankError::DivisionByZero {
                        symbol: candidate.symbol.clone(),
                        index: d,
                        quantity: "next price".to_string(),
                    });
                }
                let quantity = (state.cash / next_price).floor() as u64;
                if quantity > 0 {
                    state.buy(&candidate.symbol, quantity, next_price, time);
                    debug!(symbol = %candidate.symbol, quantity, price = next_price, step = d, "buy");
                }
            }
        }

        for symbol in state.held_symbols() {
            let Some(&idx) = self.index.get(symbol.as_str()) else {
                continue;
            };
            let bar = self.series[idx].bar(d);
            if !bar.buy_signal {
                let quantity = state.sell_all(&symbol, bar.price(), time);
                debug!(symbol = %symbol, quantity, price = bar.price(), step = d, "sell");
            }
        }
        Ok(())
    }
}
