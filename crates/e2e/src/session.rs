//! A live browser session and the driver process behind it

use thirtyfour::WebDriver;
use tracing::{info, warn};

use smashly_common::BrowserConfig;

use crate::driver_process::DriverProcess;
use crate::error::E2eResult;
use crate::resolver::BrowserKind;

/// WebDriver session plus the local driver process, if one was spawned
pub struct BrowserSession {
    pub kind: BrowserKind,
    pub driver: WebDriver,
    process: Option<DriverProcess>,
}

impl BrowserSession {
    pub fn new(kind: BrowserKind, driver: WebDriver, process: Option<DriverProcess>) -> Self {
        Self { kind, driver, process }
    }

    /// Apply the implicit wait, the page load timeout and, with a visible
    /// window, maximize it
    pub async fn configure(&self, config: &BrowserConfig) -> E2eResult<()> {
        self.driver.set_implicit_wait_timeout(config.wait_timeout()).await?;
        self.driver.set_page_load_timeout(config.page_load_timeout()).await?;

        if !config.headless {
            self.driver.maximize_window().await?;
        }
        Ok(())
    }

    /// End the WebDriver session, then stop the driver process
    pub async fn quit(self) {
        let BrowserSession { kind, driver, process } = self;

        info!("Closing {} session", kind);
        if let Err(e) = driver.quit().await {
            warn!("Failed to quit {} session cleanly: {}", kind, e);
        }

        if let Some(mut process) = process {
            process.stop();
        }
    }
}
