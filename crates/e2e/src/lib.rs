//! Smashly E2E Test Framework
//!
//! Drives a real browser against the catalog frontend:
//! - Picks a browser backend for the host OS, falling back across Chrome,
//!   Firefox, Edge and Safari
//! - Spawns and supervises the matching WebDriver process
//! - Wraps the catalog page in a lenient page object
//! - Runs the ordered catalog scenarios and records their outcomes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  run_catalog_suite(config)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DriverResolver                                             │
//! │    ├── fallback_chain(requested, os) -> [BrowserKind]       │
//! │    ├── DriverProcess::spawn(chromedriver | geckodriver ..)  │
//! │    └── BrowserSession (configured WebDriver)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CatalogSuite<B: Browser>                                   │
//! │    └── CatalogScenario::run(&CatalogPage)                   │
//! │          ├── load(url)      readiness cascade               │
//! │          ├── item_count()   scoped, then page-wide          │
//! │          ├── displayed_total()                              │
//! │          └── item_info(i) -> RacketInfo (heuristic)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod driver_process;
pub mod error;
pub mod fake;
pub mod page;
pub mod racket_info;
pub mod resolver;
pub mod scenarios;
pub mod session;
pub mod suite;

pub use browser::{Browser, Locator, PageElement};
pub use error::{E2eError, E2eResult};
pub use page::CatalogPage;
pub use racket_info::RacketInfo;
pub use resolver::{fallback_chain, BrowserKind, DriverResolver, HostOs};
pub use scenarios::CatalogScenario;
pub use session::BrowserSession;
pub use suite::{run_catalog_suite, CatalogSuite};
