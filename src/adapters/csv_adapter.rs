//! CSV file data adapter.
//!
//! One file per symbol, `<SYMBOL>.csv`, with a header row. The `time` (or
//! `date`) column holds either a Unix timestamp in seconds or a `YYYY-MM-DD`
//! date; `open` and `close` are located by name, so extra columns such as
//! `high`, `low` or `volume` are ignored.

use crate::domain::bar::Bar;
use crate::domain::error::MacdrankError;
use crate::ports::data_port::{DataPort, DateRange};
use chrono::{DateTime, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    time: usize,
    open: usize,
    close: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn locate_columns(headers: &csv::StringRecord, path: &Path) -> Result<Columns, MacdrankError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let missing = |column: &str| MacdrankError::Data {
            reason: format!("{}: missing {} column", path.display(), column),
        };
        Ok(Columns {
            time: find(&["time", "date", "timestamp"]).ok_or_else(|| missing("time"))?,
            open: find(&["open"]).ok_or_else(|| missing("open"))?,
            close: find(&["close"]).ok_or_else(|| missing("close"))?,
        })
    }
}

/// Parse a bar time: integer seconds, a calendar date (midnight UTC) or an
/// RFC 3339 timestamp.
pub fn parse_time(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Some(seconds);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.timestamp())
}

fn parse_price(record: &csv::StringRecord, index: usize, column: &str, line: u64) -> Result<f64, MacdrankError> {
    record
        .get(index)
        .ok_or_else(|| MacdrankError::Data {
            reason: format!("line {}: missing {} value", line, column),
        })?
        .trim()
        .parse()
        .map_err(|e| MacdrankError::Data {
            reason: format!("line {}: invalid {} value: {}", line, column, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>, MacdrankError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| MacdrankError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| MacdrankError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Self::locate_columns(headers, &path)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| MacdrankError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let line = record.position().map_or(0, |p| p.line());

            let raw_time = record.get(columns.time).unwrap_or_default();
            let time = parse_time(raw_time).ok_or_else(|| MacdrankError::Data {
                reason: format!("line {}: invalid time value {:?}", line, raw_time),
            })?;
            let open = parse_price(&record, columns.open, "open", line)?;
            let close = parse_price(&record, columns.close, "close", line)?;

            let bar = Bar::new(time, open, close);
            if range.contains(&bar) {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MacdrankError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MacdrankError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MacdrankError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
