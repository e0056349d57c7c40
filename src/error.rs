use thiserror::Error;

/// The CSV text cannot be turned into observations at all.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("required columns not found in CSV header: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("invalid CSV format: no data rows after the header")]
    EmptyData,
    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {location} failed: {detail}")]
    Http { location: String, detail: String },
    #[error("{location} answered with HTTP status {status}")]
    Status { location: String, status: u16 },
    #[error("cannot read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("every configured source failed")]
    Exhausted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
