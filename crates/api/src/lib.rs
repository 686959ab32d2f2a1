//! Smashly API system tests
//!
//! Drives the catalog REST API (`/health`, `/rackets`, `/rackets/{id}`,
//! `/rackets/search`, `/rackets/bestsellers`) and checks status codes,
//! the response envelope and the shape of the returned records.

pub mod client;
pub mod scenarios;
pub mod suite;

pub use client::{ApiResponse, CatalogClient, ListQuery};
pub use scenarios::{ApiContext, ApiScenario, HarvestedRacket};
pub use suite::ApiSuite;
