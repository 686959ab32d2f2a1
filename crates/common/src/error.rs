//! Error types for the Smashly harness

use thiserror::Error;

/// Result type alias using the harness Error
pub type Result<T> = std::result::Result<T, Error>;

/// Harness error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An expectation about the system under test did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for expectation mismatches, false for infrastructure failures
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::Assertion(_))
    }
}

/// Return an [`Error::Assertion`] from the enclosing function unless `cond` holds.
///
/// Works in any function whose error type converts from [`Error`].
#[macro_export]
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::Error::Assertion(format!($($arg)+)).into());
        }
    };
}
