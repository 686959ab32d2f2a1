//! Smashly Common Library
//!
//! Configuration, error taxonomy, catalog data model and suite reporting
//! shared by the API and browser test harnesses.

pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use config::{BrowserConfig, HarnessConfig};
pub use error::{Error, Result};
pub use report::{ScenarioResult, SuiteRecorder, SuiteResult};
pub use types::{Envelope, HealthStatus, Racket};
