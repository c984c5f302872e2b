//! CSV report adapter: trade logs, equity curves and field series.

use crate::domain::analyzed::BarField;
use crate::domain::error::MacdrankError;
use crate::domain::series::SymbolSeries;
use crate::domain::simulation::SimulationReport;
use crate::ports::report_port::ReportPort;
use chrono::DateTime;
use std::fs::File;
use tracing::info;

pub struct CsvReportAdapter;

fn format_date(time: i64) -> String {
    DateTime::from_timestamp(time, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn open_writer(output_path: &str) -> Result<csv::Writer<File>, MacdrankError> {
    csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))
}

fn csv_error(output_path: &str, e: csv::Error) -> MacdrankError {
    MacdrankError::Data {
        reason: format!("failed to write {}: {}", output_path, e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(&self, report: &SimulationReport, output_path: &str) -> Result<(), MacdrankError> {
        let mut wtr = open_writer(output_path)?;
        let err = |e| csv_error(output_path, e);

        wtr.write_record(["trial", "symbol", "side", "quantity", "price", "value", "time", "date"])
            .map_err(err)?;
        let mut rows = 0usize;
        for outcome in &report.outcomes {
            for trade in &outcome.trades {
                wtr.write_record([
                    outcome.trial.to_string(),
                    trade.symbol.clone(),
                    trade.side.to_string(),
                    trade.quantity.to_string(),
                    format!("{:.4}", trade.price),
                    format!("{:.4}", trade.value()),
                    trade.time.to_string(),
                    format_date(trade.time),
                ])
                .map_err(err)?;
                rows += 1;
            }
        }
        wtr.flush()?;
        info!(path = output_path, rows, "wrote trade log");
        Ok(())
    }

    fn write_equity(&self, report: &SimulationReport, output_path: &str) -> Result<(), MacdrankError> {
        let mut wtr = open_writer(output_path)?;
        let err = |e| csv_error(output_path, e);

        wtr.write_record(["trial", "time", "date", "cash", "holdings_value", "total"])
            .map_err(err)?;
        for outcome in &report.outcomes {
            for point in &outcome.equity_curve {
                wtr.write_record([
                    outcome.trial.to_string(),
                    point.time.to_string(),
                    format_date(point.time),
                    format!("{:.4}", point.cash),
                    format!("{:.4}", point.holdings_value),
                    format!("{:.4}", point.total()),
                ])
                .map_err(err)?;
            }
        }
        wtr.flush()?;
        info!(path = output_path, trials = report.outcomes.len(), "wrote equity curves");
        Ok(())
    }

    fn write_series(
        &self,
        series: &SymbolSeries,
        fields: &[BarField],
        output_path: &str,
    ) -> Result<(), MacdrankError> {
        let mut wtr = open_writer(output_path)?;
        let err = |e| csv_error(output_path, e);

        let mut header = vec!["time".to_string(), "date".to_string(), "buy_signal".to_string()];
        header.extend(fields.iter().map(|f| f.name().to_string()));
        wtr.write_record(&header).map_err(err)?;

        for bar in &series.bars {
            let mut row = vec![
                bar.time().to_string(),
                format_date(bar.time()),
                bar.buy_signal.to_string(),
            ];
            row.extend(fields.iter().map(|&f| bar.field(f).to_string()));
            wtr.write_record(&row).map_err(err)?;
        }
        wtr.flush()?;
        info!(symbol = %series.symbol, path = output_path, bars = series.len(), "wrote series");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::indicator::IndicatorConfig;
    use crate::domain::series::analyze_symbol;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn series_export_has_selected_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("up.csv");
        let bars: Vec<Bar> = (0..3)
            .map(|i| Bar::new(86_400 * i, 10.0 + i as f64, 10.0 + i as f64))
            .collect();
        let config = IndicatorConfig {
            warmup_count: 0,
            ..IndicatorConfig::default()
        };
        let series = analyze_symbol("UP", &bars, &config).unwrap();

        CsvReportAdapter
            .write_series(&series, &[BarField::Close, BarField::Diff], path.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "time,date,buy_signal,close,diff");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0,1970-01-01 00:00:00,false,10,0"));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let series = SymbolSeries::new("NONE".into(), Vec::new());
        let result = CsvReportAdapter.write_series(&series, &[], path.to_str().unwrap());
        assert!(matches!(result, Err(MacdrankError::Data { .. })));
    }
}
