//! Ticker list file adapter.
//!
//! One symbol per line. Blank lines and lines starting with `#` are skipped;
//! symbols are trimmed and upper-cased; a repeated symbol is an error.

use crate::domain::error::MacdrankError;
use crate::ports::ticker_port::TickerPort;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerError {
    #[error("duplicate ticker {symbol} on line {line}")]
    Duplicate { symbol: String, line: usize },

    #[error("invalid ticker {symbol:?} on line {line}")]
    Invalid { symbol: String, line: usize },

    #[error("ticker list is empty")]
    Empty,
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.chars().any(char::is_whitespace) || trimmed.contains(',') {
            return Err(TickerError::Invalid {
                symbol: trimmed.to_string(),
                line,
            });
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(TickerError::Duplicate { symbol, line });
        }
        tickers.push(symbol);
    }

    if tickers.is_empty() {
        return Err(TickerError::Empty);
    }
    Ok(tickers)
}

pub struct TickerFileAdapter {
    path: PathBuf,
}

impl TickerFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TickerPort for TickerFileAdapter {
    fn load_tickers(&self) -> Result<Vec<String>, MacdrankError> {
        let content = fs::read_to_string(&self.path).map_err(|e| MacdrankError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        parse_tickers(&content).map_err(|e| MacdrankError::Data {
            reason: format!("{}: {}", self.path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_one_per_line() {
        assert_eq!(parse_tickers("AAPL\nMSFT\nGOOG\n").unwrap(), vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn skips_blanks_and_comments() {
        let input = "# watchlist\n\n  aapl  \n# msft\nspy\n";
        assert_eq!(parse_tickers(input).unwrap(), vec!["AAPL", "SPY"]);
    }

    #[test]
    fn duplicate_reports_line() {
        let err = parse_tickers("AAPL\nMSFT\naapl\n").unwrap_err();
        assert_eq!(
            err,
            TickerError::Duplicate {
                symbol: "AAPL".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn embedded_space_is_invalid() {
        assert!(matches!(
            parse_tickers("BRK B\n"),
            Err(TickerError::Invalid { line: 1, .. })
        ));
    }

    #[test]
    fn empty_list_is_an_error() {
        assert_eq!(parse_tickers("# nothing\n\n"), Err(TickerError::Empty));
    }

    #[test]
    fn adapter_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "aapl\nmsft\n").unwrap();
        let adapter = TickerFileAdapter::new(file.path().to_path_buf());
        assert_eq!(adapter.load_tickers().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn adapter_missing_file_is_data_error() {
        let adapter = TickerFileAdapter::new(PathBuf::from("/nonexistent/tickers.txt"));
        assert!(matches!(adapter.load_tickers(), Err(MacdrankError::Data { .. })));
    }
}
