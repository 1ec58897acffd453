//! Error types for metric queries and collectors.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a platform metrics query.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed {}: {detail}", .path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        SourceError::Parse {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

/// Failure reported by a collector.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{query} query failed: {source}")]
    Source {
        query: &'static str,
        #[source]
        source: SourceError,
    },

    #[error("no data returned for {0}")]
    NoData(&'static str),

    #[error("{}", JoinedErrors(.0))]
    Multiple(Vec<CollectError>),
}

impl CollectError {
    pub fn query_failed(query: &'static str) -> impl FnOnce(SourceError) -> CollectError {
        move |source| CollectError::Source { query, source }
    }

    /// Folds the failures of independent sub-queries into one result.
    pub fn from_failures(mut failures: Vec<CollectError>) -> Result<(), CollectError> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(CollectError::Multiple(failures)),
        }
    }
}

struct JoinedErrors<'a>(&'a [CollectError]);

impl fmt::Display for JoinedErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}
