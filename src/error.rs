//! Error types for retagls.
//!
//! Region lookup and language selection are total and never fail; errors only
//! come from building scanners out of configuration and from settings I/O.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetagError {
    /// A region delimiter was configured as the empty string.
    #[error("{which} delimiter must not be empty")]
    EmptyDelimiter { which: &'static str },

    /// The delimiters could not be compiled into a scan pattern.
    #[error("invalid delimiter pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A settings or preferences file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Preferences could not be serialized.
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RetagResult<T> = Result<T, RetagError>;
