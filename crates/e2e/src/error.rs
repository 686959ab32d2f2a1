//! Error types for browser E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    /// Every candidate backend failed; the suite cannot run
    #[error("No usable browser backend found (tried: {}). Install at least one of Chrome, Firefox, Edge or Safari with its WebDriver", .attempted.join("; "))]
    NoUsableBrowser { attempted: Vec<String> },

    #[error("{browser} failed to launch: {reason}")]
    BackendLaunch { browser: String, reason: String },

    #[error("WebDriver executable '{0}' not found. Put it on PATH or point {1} at it")]
    DriverNotFound(String, String),

    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Racket index {index} is out of bounds ({count} rows rendered)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Common(#[from] smashly_common::Error),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Environment errors abort the suite instead of failing one scenario
    pub fn is_environment(&self) -> bool {
        matches!(self, E2eError::NoUsableBrowser { .. })
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_usable_browser_lists_attempts() {
        let err = E2eError::NoUsableBrowser {
            attempted: vec!["chrome: not found".to_string(), "firefox: crashed".to_string()],
        };
        assert!(err.is_environment());
        assert!(err.to_string().contains("tried: chrome: not found; firefox: crashed"));
    }

    #[test]
    fn test_assertion_passes_through() {
        let err: E2eError = smashly_common::Error::Assertion("title missing".to_string()).into();
        assert!(!err.is_environment());
        assert_eq!(err.to_string(), "Assertion failed: title missing");
    }
}
