//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::ticker_file_adapter::TickerFileAdapter;
use crate::domain::analysis::{analyze_universe, AnalysisReport};
use crate::domain::analyzed::BarField;
use crate::domain::config_validation::{validate_config, validate_data_paths, AppConfig, DataPaths};
use crate::domain::error::MacdrankError;
use crate::domain::paper;
use crate::domain::series::SymbolSeries;
use crate::domain::signal::SignalSummary;
use crate::domain::simulation::{run_simulation, SimulationReport};
use crate::domain::timeline::align_series;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::ticker_port::TickerPort;

#[derive(Parser, Debug)]
#[command(name = "macdrank", about = "MACD momentum ranking and Monte-Carlo backtesting")]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Where bars and tickers come from; flags override the `[data]` section.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory of <SYMBOL>.csv bar files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Ticker list file
    #[arg(long)]
    pub tickers: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the universe by the latest momentum signal
    Analyze {
        #[command(flatten)]
        data: DataArgs,
        /// Show only the strongest N symbols
        #[arg(long)]
        top: Option<usize>,
        /// Write one field CSV per symbol into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Fields to export (default: all)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<BarField>,
    },
    /// Run the Monte-Carlo backtest
    Simulate {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        window: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Write every trade of every trial to this CSV
        #[arg(long)]
        trades: Option<PathBuf>,
        /// Write per-step equity of every trial to this CSV
        #[arg(long)]
        equity: Option<PathBuf>,
    },
    /// List symbols available in the bar directory
    ListSymbols {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.kind());
            (&e).into()
        }
    }
}

/// Dispatch a parsed command line.
pub fn execute(cli: Cli) -> Result<(), MacdrankError> {
    match cli.command {
        Command::Analyze {
            data,
            top,
            export_dir,
            fields,
        } => run_analyze(&data, top, export_dir.as_deref(), &fields),
        Command::Simulate {
            data,
            iterations,
            window,
            seed,
            trades,
            equity,
        } => run_simulate(
            &data,
            SimulateOverrides {
                iterations,
                window,
                seed,
            },
            trades.as_deref(),
            equity.as_deref(),
        ),
        Command::ListSymbols { data } => run_list_symbols(&data),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, MacdrankError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Flags first, then the config file.
pub fn resolve_data_paths(args: &DataArgs, config: &dyn ConfigPort) -> Result<DataPaths, MacdrankError> {
    if let (Some(directory), Some(tickers)) = (&args.data_dir, &args.tickers) {
        return Ok(DataPaths {
            directory: directory.clone(),
            tickers: tickers.clone(),
        });
    }
    let mut paths = validate_data_paths(config)?;
    if let Some(directory) = &args.data_dir {
        paths.directory = directory.clone();
    }
    if let Some(tickers) = &args.tickers {
        paths.tickers = tickers.clone();
    }
    Ok(paths)
}

struct Workspace {
    config: AppConfig,
    report: AnalysisReport,
}

fn load_and_analyze(
    args: &DataArgs,
    adapter: &dyn ConfigPort,
    config: AppConfig,
) -> Result<Workspace, MacdrankError> {
    let paths = resolve_data_paths(args, adapter)?;

    let tickers = TickerFileAdapter::new(paths.tickers.clone()).load_tickers()?;
    info!(count = tickers.len(), path = %paths.tickers.display(), "loaded tickers");

    let source = CsvAdapter::new(paths.directory);
    let report = analyze_universe(&source, &tickers, &config.indicators, &config.analysis)?;
    if !report.failures.is_empty() {
        warn!(
            skipped = report.failures.len(),
            analyzed = report.series.len(),
            "symbols excluded from the cross-section"
        );
    }
    Ok(Workspace { config, report })
}

fn app_config(args: &DataArgs) -> Result<(FileConfigAdapter, AppConfig), MacdrankError> {
    let adapter = load_config(args.config.as_deref())?;
    let config = validate_config(&adapter)?;
    Ok((adapter, config))
}

fn run_analyze(
    args: &DataArgs,
    top: Option<usize>,
    export_dir: Option<&Path>,
    fields: &[BarField],
) -> Result<(), MacdrankError> {
    let (adapter, config) = app_config(args)?;
    let workspace = load_and_analyze(args, &adapter, config)?;
    let starting_cash = workspace.config.simulation.starting_cash;

    let mut rows: Vec<(&SymbolSeries, SignalSummary)> = workspace
        .report
        .series
        .iter()
        .filter_map(|s| s.summary().map(|summary| (s, summary)))
        .collect();
    rows.sort_by(|a, b| b.1.diff_adjusted.total_cmp(&a.1.diff_adjusted));
    if let Some(n) = top {
        rows.truncate(n);
    }

    println!(
        "{:<8} {:>10} {:<5} {:>12} {:>10} {:>7} {:>7} {:<10} {:>12}",
        "SYMBOL", "PRICE", "CALL", "DIFF_ADJ", "STRENGTH", "RSI", "FLIPS", "LAST_FLIP", "PAPER"
    );
    for (series, summary) in &rows {
        let replayed = paper::replay(series.bars.iter().map(|b| b.as_ref()), starting_cash);
        let paper_equity = paper::summarize(&replayed).map_or(starting_cash, |p| p.equity());
        let last_flip = summary
            .last_change
            .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>10.2} {:<5} {:>12.6} {:>10.2} {:>7.2} {:>7} {:<10} {:>12.2}",
            series.symbol,
            summary.price,
            summary.decision.to_string(),
            summary.diff_adjusted,
            summary.strength,
            summary.rsi,
            summary.change_count,
            last_flip,
            paper_equity
        );
    }

    if let Some(dir) = export_dir {
        fs::create_dir_all(dir)?;
        let fields: Vec<BarField> = if fields.is_empty() {
            BarField::ALL.to_vec()
        } else {
            fields.to_vec()
        };
        let reporter = CsvReportAdapter;
        for series in &workspace.report.series {
            let replayed = paper::replay_series(series, starting_cash);
            let path = dir.join(format!("{}.csv", series.symbol));
            reporter.write_series(&replayed, &fields, &path.to_string_lossy())?;
        }
    }

    Ok(())
}

struct SimulateOverrides {
    iterations: Option<usize>,
    window: Option<usize>,
    seed: Option<u64>,
}

fn run_simulate(
    args: &DataArgs,
    overrides: SimulateOverrides,
    trades_path: Option<&Path>,
    equity_path: Option<&Path>,
) -> Result<(), MacdrankError> {
    let (adapter, mut config) = app_config(args)?;
    if let Some(iterations) = overrides.iterations {
        config.simulation.iterations = iterations;
    }
    if let Some(window) = overrides.window {
        config.simulation.window_length = window;
    }
    if overrides.seed.is_some() {
        config.simulation.seed = overrides.seed;
    }
    config.simulation.validate()?;

    let workspace = load_and_analyze(args, &adapter, config)?;
    let alignment = align_series(&workspace.report.series);
    for failure in &alignment.failures {
        warn!(symbol = %failure.symbol, error = %failure.error, "not aligned");
    }
    info!(steps = alignment.len(), symbols = alignment.series.len(), "aligned universe");

    let report = run_simulation(&alignment.series, &workspace.config.simulation)?;
    print_summary(&report);

    let reporter = CsvReportAdapter;
    if let Some(path) = trades_path {
        reporter.write_trades(&report, &path.to_string_lossy())?;
    }
    if let Some(path) = equity_path {
        reporter.write_equity(&report, &path.to_string_lossy())?;
    }
    Ok(())
}

fn print_summary(report: &SimulationReport) {
    let s = &report.summary;
    if let Some(seed) = report.seed {
        println!("seed:              {seed}");
    }
    println!("trials:            {} completed, {} skipped", s.completed_trials, s.skipped_trials);
    println!("starting cash:     {:.2}", s.starting_cash);
    println!("losses:            {} ({:.1}%)", s.losses, s.loss_percent);
    println!("gains:             {}", s.gains);
    println!("doubled:           {} ({:.1}%)", s.doubled, s.doubled_percent);
    println!("tripled:           {} ({:.1}%)", s.tripled, s.tripled_percent);
    println!("tenfold:           {} ({:.1}%)", s.tenfold, s.tenfold_percent);
    println!("avg loss amount:   {:.2}", s.average_loss_amount);
    println!("avg gain amount:   {:.2}", s.average_gain_amount);
    println!("expected amount:   {:.2}", s.expected_amount);
    println!("expected return:   {:.2}%", s.expected_return * 100.0);
}

fn run_list_symbols(args: &DataArgs) -> Result<(), MacdrankError> {
    let adapter = load_config(args.config.as_deref())?;
    let directory = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => validate_data_paths(&adapter)?.directory,
    };
    let symbols = CsvAdapter::new(directory).list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), MacdrankError> {
    let adapter = load_config(Some(config_path))?;
    let config = validate_config(&adapter)?;
    let i = &config.indicators;
    let s = &config.simulation;
    println!(
        "indicators: fast={} slow={} signal={} rsi={} warmup={}",
        i.fast_period, i.slow_period, i.signal_period, i.rsi_period, i.warmup_count
    );
    println!(
        "simulation: iterations={} window={} cash={:.2} min_buy_signal={} max_price={:.2} min_cash={:.2}",
        s.iterations, s.window_length, s.starting_cash, s.min_buy_signal, s.max_share_price, s.min_cash_limit
    );
    println!(
        "data: concurrency={} symbols_per_request={}",
        config.analysis.concurrency, config.analysis.symbols_per_request
    );
    match validate_data_paths(&adapter) {
        Ok(paths) => println!(
            "paths: directory={} tickers={}",
            paths.directory.display(),
            paths.tickers.display()
        ),
        Err(e) => eprintln!("note: {e}"),
    }
    println!("configuration is valid");
    Ok(())
}
