//! Domain error types.

/// Top-level error type for macdrank.
#[derive(Debug, thiserror::Error)]
pub enum MacdrankError {
    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    DataInsufficient {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("division by zero for {symbol} at bar {index}: {quantity} is zero")]
    DivisionByZero {
        symbol: String,
        index: usize,
        quantity: String,
    },

    #[error("invalid configuration {key}: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    #[error("bars for {symbol} are not strictly increasing in time at bar {index}")]
    UnorderedBars { symbol: String, index: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("trial {trial} failed: {source}")]
    TrialFailed {
        trial: usize,
        #[source]
        source: Box<MacdrankError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MacdrankError {
    pub fn invalid_config(key: &str, reason: impl Into<String>) -> Self {
        MacdrankError::InvalidConfiguration {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Short kind name used in structured failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            MacdrankError::DataInsufficient { .. } => "DataInsufficient",
            MacdrankError::DivisionByZero { .. } => "DivisionByZero",
            MacdrankError::InvalidConfiguration { .. } => "InvalidConfiguration",
            MacdrankError::UnorderedBars { .. } => "UnorderedBars",
            MacdrankError::ConfigParse { .. } => "ConfigParse",
            MacdrankError::ConfigMissing { .. } => "ConfigMissing",
            MacdrankError::Data { .. } => "Data",
            MacdrankError::TrialFailed { source, .. } => source.kind(),
            MacdrankError::Io(_) => "Io",
        }
    }
}

/// A symbol excluded from a cross-section, and why.
#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: MacdrankError,
}

/// A simulated trial that was aborted, and why.
#[derive(Debug)]
pub struct TrialFailure {
    pub trial: usize,
    pub error: MacdrankError,
}

impl From<&MacdrankError> for std::process::ExitCode {
    fn from(err: &MacdrankError) -> Self {
        let code: u8 = match err {
            MacdrankError::Io(_) => 1,
            MacdrankError::ConfigParse { .. }
            | MacdrankError::ConfigMissing { .. }
            | MacdrankError::InvalidConfiguration { .. } => 2,
            MacdrankError::Data { .. } => 3,
            MacdrankError::DataInsufficient { .. } | MacdrankError::UnorderedBars { .. } => 5,
            MacdrankError::DivisionByZero { .. } | MacdrankError::TrialFailed { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
