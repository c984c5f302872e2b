//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading and path resolution
//! - `validate` with good and bad INI files on disk
//! - `analyze` and `simulate` end to end over CSV bar files
//! - Argument parsing of bar field lists

mod common;

use clap::Parser;
use common::*;
use macdrank::adapters::file_config_adapter::FileConfigAdapter;
use macdrank::cli::{self, Cli, DataArgs};
use macdrank::domain::error::MacdrankError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_bars(dir: &Path, symbol: &str, closes: &[f64]) {
    let mut content = String::from("time,open,close\n");
    for bar in daily_bars(closes) {
        content.push_str(&format!("{},{},{}\n", bar.time, bar.open, bar.close));
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let bars = dir.path().join("bars");
        fs::create_dir(&bars).unwrap();
        write_bars(&bars, "ZIG", &zigzag_closes());
        write_bars(&bars, "RISE", &trending(120, 20.0, 0.25));
        write_bars(&bars, "TINY", &[1.0, 2.0, 3.0]);
        fs::write(dir.path().join("tickers.txt"), "# universe\nzig\nrise\n\ntiny\n").unwrap();

        let ini = format!(
            "[indicators]\nwarmup_count = 30\n\n\
             [simulation]\niterations = 5\nwindow_length = 20\nmin_buy_signal = 0\nseed = 11\nparallel = false\n\n\
             [data]\ndirectory = {}\ntickers = {}\nconcurrency = 2\n",
            bars.display(),
            dir.path().join("tickers.txt").display()
        );
        fs::write(dir.path().join("macdrank.ini"), ini).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> String {
        self.path("macdrank.ini").display().to_string()
    }

    fn run(&self, args: &[&str]) -> Result<(), MacdrankError> {
        let mut argv = vec!["macdrank"];
        argv.extend_from_slice(args);
        cli::execute(Cli::try_parse_from(argv).unwrap())
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn no_config_path_gives_empty_adapter() {
        let adapter = cli::load_config(None).unwrap();
        let args = DataArgs::default();
        assert!(matches!(
            cli::resolve_data_paths(&args, &adapter),
            Err(MacdrankError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn flags_override_config_paths() {
        let adapter = FileConfigAdapter::from_string(
            "[data]\ndirectory = from_config\ntickers = tickers_from_config.txt\n",
        )
        .unwrap();
        let args = DataArgs {
            data_dir: Some(PathBuf::from("from_flag")),
            ..DataArgs::default()
        };
        let paths = cli::resolve_data_paths(&args, &adapter).unwrap();
        assert_eq!(paths.directory, PathBuf::from("from_flag"));
        assert_eq!(paths.tickers, PathBuf::from("tickers_from_config.txt"));
    }

    #[test]
    fn both_flags_need_no_config() {
        let args = DataArgs {
            data_dir: Some(PathBuf::from("bars")),
            tickers: Some(PathBuf::from("t.txt")),
            ..DataArgs::default()
        };
        let paths = cli::resolve_data_paths(&args, &FileConfigAdapter::empty()).unwrap();
        assert_eq!(paths.directory, PathBuf::from("bars"));
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        assert!(matches!(
            cli::load_config(Some(Path::new("/nonexistent/macdrank.ini"))),
            Err(MacdrankError::ConfigParse { .. })
        ));
    }
}

mod validate {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let fx = Fixture::new();
        fx.run(&["validate", "--config", &fx.config()]).unwrap();
    }

    #[test]
    fn zero_period_fails() {
        let fx = Fixture::new();
        let bad = fx.path("bad.ini");
        fs::write(&bad, "[indicators]\nslow_period = 0\n").unwrap();
        let err = fx
            .run(&["validate", "--config", &bad.display().to_string()])
            .unwrap_err();
        assert!(matches!(err, MacdrankError::InvalidConfiguration { ref key, .. } if key == "slow_period"));
    }
}

mod analyze {
    use super::*;

    #[test]
    fn exports_selected_fields_per_symbol() {
        let fx = Fixture::new();
        let export = fx.path("export");
        fx.run(&[
            "analyze",
            "--config",
            &fx.config(),
            "--export-dir",
            &export.display().to_string(),
            "--fields",
            "close,diff-adjusted,cash",
        ])
        .unwrap();

        let zig = fs::read_to_string(export.join("ZIG.csv")).unwrap();
        let mut lines = zig.lines();
        assert_eq!(lines.next(), Some("time,date,buy_signal,close,diff_adjusted,cash"));
        assert_eq!(lines.count(), 130);
        assert!(export.join("RISE.csv").exists());
        // too short for the warm-up, excluded from the cross-section
        assert!(!export.join("TINY.csv").exists());
    }

    #[test]
    fn flags_work_without_config() {
        let fx = Fixture::new();
        fx.run(&[
            "analyze",
            "--data-dir",
            &fx.path("bars").display().to_string(),
            "--tickers",
            &fx.path("tickers.txt").display().to_string(),
            "--top",
            "1",
        ])
        .unwrap();
    }

    #[test]
    fn missing_ticker_file_is_data_error() {
        let fx = Fixture::new();
        let err = fx
            .run(&[
                "analyze",
                "--config",
                &fx.config(),
                "--tickers",
                &fx.path("nope.txt").display().to_string(),
            ])
            .unwrap_err();
        assert!(matches!(err, MacdrankError::Data { .. }));
    }

    #[test]
    fn unknown_field_rejected_at_parse_time() {
        let result = Cli::try_parse_from(["macdrank", "analyze", "--fields", "close,volume"]);
        assert!(result.is_err());
    }
}

mod simulate {
    use super::*;

    #[test]
    fn writes_trades_and_equity() {
        let fx = Fixture::new();
        let trades = fx.path("trades.csv");
        let equity = fx.path("equity.csv");
        fx.run(&[
            "simulate",
            "--config",
            &fx.config(),
            "--trades",
            &trades.display().to_string(),
            "--equity",
            &equity.display().to_string(),
        ])
        .unwrap();

        let trades = fs::read_to_string(trades).unwrap();
        assert!(trades.starts_with("trial,symbol,side,quantity,price,value,time,date"));

        let equity = fs::read_to_string(equity).unwrap();
        // header + 5 trials x 20 steps
        assert_eq!(equity.lines().count(), 1 + 5 * 20);
    }

    #[test]
    fn flag_overrides_apply() {
        let fx = Fixture::new();
        let equity = fx.path("equity.csv");
        fx.run(&[
            "simulate",
            "--config",
            &fx.config(),
            "--iterations",
            "2",
            "--window",
            "10",
            "--seed",
            "3",
            "--equity",
            &equity.display().to_string(),
        ])
        .unwrap();
        let equity = fs::read_to_string(equity).unwrap();
        assert_eq!(equity.lines().count(), 1 + 2 * 10);
    }

    #[test]
    fn window_longer_than_history_fails() {
        let fx = Fixture::new();
        let err = fx
            .run(&["simulate", "--config", &fx.config(), "--window", "500"])
            .unwrap_err();
        assert!(matches!(err, MacdrankError::DataInsufficient { .. }));
    }
}

mod list_symbols {
    use super::*;

    #[test]
    fn lists_bar_files() {
        let fx = Fixture::new();
        fx.run(&["list-symbols", "--config", &fx.config()]).unwrap();
        fx.run(&["list-symbols", "--data-dir", &fx.path("bars").display().to_string()])
            .unwrap();
    }
}
