//! Error types for the accident dataset pipeline.
//!
//! Fetching, archive reading, column typing and the region cache all report
//! through [`Error`] so callers can tell transient network trouble apart from
//! data-quality problems and corrupt cache files.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("reading archive {}: {source}", archive.display())]
    Zip {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("listing archives with {pattern:?}: {source}")]
    ArchivePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("archive file name {file:?} carries no year token")]
    ArchiveName { file: String },

    #[error("unknown region code {code:?}")]
    UnknownRegion { code: String },

    #[error("region {region}, column {column} ({name}), row {row}: cannot parse {value:?}: {reason}")]
    ColumnParse {
        region: String,
        column: usize,
        name: &'static str,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("cache file {} is corrupt: {source}; delete it to rebuild", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("cache entry does not match the dataset layout: {message}")]
    CacheLayout { message: String },

    #[error("region cache returned {got} batches for {expected} regions")]
    BatchCount { expected: usize, got: usize },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Error::Timeout {
                url: url.to_string(),
            }
        } else {
            Error::Fetch {
                url: url.to_string(),
                source,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_retryable() {
        let timeout = Error::Timeout {
            url: "http://localhost/".into(),
        };
        assert!(timeout.is_retryable());

        let unknown = Error::UnknownRegion { code: "XYZ".into() };
        assert!(!unknown.is_retryable());
    }

    #[test]
    fn column_parse_message_names_location() {
        let err = Error::ColumnParse {
            region: "MSK".into(),
            column: 14,
            name: "Usmrceno osob",
            row: 3,
            value: "abc".into(),
            reason: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MSK"));
        assert!(msg.contains("column 14"));
        assert!(msg.contains("row 3"));
    }

    #[test]
    fn corrupt_cache_message_is_not_a_config_error() {
        let err = Error::CacheCorrupt {
            path: PathBuf::from("data/data_MSK.parquet"),
            source: Box::new(Error::CacheLayout {
                message: "schema version None, expected 1".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("data_MSK.parquet"));
        assert!(msg.contains("dataset layout"));
        assert!(!msg.contains("Configuration"));
    }
}
