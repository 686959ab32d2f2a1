//! Browser backend selection
//!
//! Picks an ordered list of backends from the requested browser and the host
//! OS, then tries them one at a time until a session comes up. A backend that
//! fails at any step (driver missing, driver crash, session refused, session
//! configuration) is logged and the next one is tried. Running out of
//! backends is fatal for the suite.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::{json, Map, Value};
use thirtyfour::WebDriver;
use tracing::{info, warn};

use smashly_common::BrowserConfig;

use crate::driver_process::{locate_driver, DriverProcess};
use crate::error::{E2eError, E2eResult};
use crate::session::BrowserSession;

pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;

/// Supported browser backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
    Safari,
}

impl BrowserKind {
    pub const ALL: [BrowserKind; 4] = [
        BrowserKind::Chrome,
        BrowserKind::Firefox,
        BrowserKind::Edge,
        BrowserKind::Safari,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
            BrowserKind::Safari => "safari",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chrome" | "google-chrome" | "chromium" => Some(BrowserKind::Chrome),
            "firefox" | "ff" | "gecko" => Some(BrowserKind::Firefox),
            "edge" | "msedge" | "microsoftedge" => Some(BrowserKind::Edge),
            "safari" => Some(BrowserKind::Safari),
            _ => None,
        }
    }

    /// WebDriver executable for this browser
    pub fn driver_executable(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chromedriver",
            BrowserKind::Firefox => "geckodriver",
            BrowserKind::Edge => "msedgedriver",
            BrowserKind::Safari => "safaridriver",
        }
    }

    /// Environment variable that pins the driver executable
    pub fn driver_env_var(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "CHROMEDRIVER",
            BrowserKind::Firefox => "GECKODRIVER",
            BrowserKind::Edge => "MSEDGEDRIVER",
            BrowserKind::Safari => "SAFARIDRIVER",
        }
    }

    /// Command line that makes the driver listen on `port`
    pub fn driver_args(&self, port: u16) -> Vec<String> {
        match self {
            BrowserKind::Chrome | BrowserKind::Edge => vec![format!("--port={}", port)],
            BrowserKind::Firefox | BrowserKind::Safari => vec!["--port".to_string(), port.to_string()],
        }
    }

    pub fn supports_headless(&self) -> bool {
        !matches!(self, BrowserKind::Safari)
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrowserKind::from_name(s).ok_or_else(|| format!("unknown browser '{}'", s))
    }
}

/// Host operating system family, as far as backend choice cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    MacOs,
    Windows,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Classify an OS name. "darwin" contains "win", so mac is checked first
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("mac") || name.contains("darwin") {
            HostOs::MacOs
        } else if name.contains("win") {
            HostOs::Windows
        } else {
            HostOs::Other
        }
    }
}

/// Backends to try, in order, for a requested browser on `os`
pub fn fallback_chain(requested: Option<&str>, os: HostOs) -> Vec<BrowserKind> {
    use BrowserKind::*;

    let requested = requested.map(str::trim).filter(|name| !name.is_empty());
    let Some(name) = requested else {
        return match os {
            HostOs::MacOs => vec![Safari, Chrome, Firefox],
            HostOs::Windows => vec![Edge, Chrome, Firefox],
            HostOs::Other => vec![Chrome, Firefox],
        };
    };

    let kind = BrowserKind::from_name(name).unwrap_or_else(|| {
        warn!("Unknown browser '{}', defaulting to chrome", name);
        Chrome
    });

    match kind {
        Chrome if os == HostOs::MacOs => vec![Chrome, Safari],
        Chrome => vec![Chrome, Firefox],
        Firefox if os == HostOs::MacOs => vec![Firefox, Chrome, Safari],
        Firefox => vec![Firefox, Chrome],
        Edge => vec![Edge, Chrome, Firefox],
        Safari => vec![Safari, Chrome, Firefox],
    }
}

/// Per-backend launch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub headless: bool,
    pub binary: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl LaunchOptions {
    pub fn new(headless: bool, binary: Option<PathBuf>) -> Self {
        Self {
            headless,
            binary,
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

fn chromium_args(options: &LaunchOptions) -> Vec<String> {
    let mut args = vec![
        "--remote-allow-origins=*".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        format!("--window-size={},{}", options.width, options.height),
    ];
    if options.headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// W3C capabilities for a new session
pub fn capabilities(kind: BrowserKind, options: &LaunchOptions) -> Map<String, Value> {
    let mut caps = Map::new();
    if options.headless && !kind.supports_headless() {
        warn!("{} does not support headless mode; running with a window", kind);
    }

    match kind {
        BrowserKind::Chrome | BrowserKind::Edge => {
            let (browser_name, options_key) = if kind == BrowserKind::Chrome {
                ("chrome", "goog:chromeOptions")
            } else {
                ("MicrosoftEdge", "ms:edgeOptions")
            };
            let mut browser_opts = json!({ "args": chromium_args(options) });
            if let Some(binary) = &options.binary {
                browser_opts["binary"] = json!(binary.to_string_lossy());
            }
            caps.insert("browserName".to_string(), json!(browser_name));
            caps.insert(options_key.to_string(), browser_opts);
        }
        BrowserKind::Firefox => {
            let mut args = vec![
                format!("--width={}", options.width),
                format!("--height={}", options.height),
            ];
            if options.headless {
                args.push("--headless".to_string());
            }
            let mut firefox_opts = json!({ "args": args });
            if let Some(binary) = &options.binary {
                firefox_opts["binary"] = json!(binary.to_string_lossy());
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), firefox_opts);
        }
        BrowserKind::Safari => {
            caps.insert("browserName".to_string(), json!("safari"));
            caps.insert("safari:automaticInspection".to_string(), json!(false));
            caps.insert("safari:useTechnologyPreview".to_string(), json!(false));
        }
    }

    caps
}

/// Environment variables that may point at a browser binary
fn binary_env_vars(kind: BrowserKind) -> &'static [&'static str] {
    match kind {
        BrowserKind::Chrome => &["CHROME_PATH", "GOOGLE_CHROME_SHIM"],
        BrowserKind::Firefox => &["FIREFOX_PATH"],
        BrowserKind::Edge | BrowserKind::Safari => &[],
    }
}

/// Usual install locations of a browser binary
fn well_known_binaries(kind: BrowserKind, os: HostOs) -> &'static [&'static str] {
    match (kind, os) {
        (BrowserKind::Chrome, HostOs::MacOs) => &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ],
        (BrowserKind::Chrome, HostOs::Windows) => &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ],
        (BrowserKind::Chrome, HostOs::Other) => &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ],
        (BrowserKind::Firefox, HostOs::MacOs) => &["/Applications/Firefox.app/Contents/MacOS/firefox"],
        (BrowserKind::Firefox, HostOs::Windows) => &[
            r"C:\Program Files\Mozilla Firefox\firefox.exe",
            r"C:\Program Files (x86)\Mozilla Firefox\firefox.exe",
        ],
        (BrowserKind::Firefox, HostOs::Other) => &["/usr/bin/firefox", "/snap/bin/firefox"],
        _ => &[],
    }
}

/// Explicit browser binary to launch, if one can be found.
///
/// Checks the binary environment variables, then the configured
/// `chrome.binary` / `firefox.binary`, then the usual install locations.
/// Candidates that do not exist are skipped. `None` leaves discovery to the
/// driver.
pub fn locate_browser_binary<E, X>(
    kind: BrowserKind,
    config: &BrowserConfig,
    os: HostOs,
    env: E,
    exists: X,
) -> Option<PathBuf>
where
    E: Fn(&str) -> Option<String>,
    X: Fn(&Path) -> bool,
{
    let from_env = binary_env_vars(kind)
        .iter()
        .filter_map(|var| env(var))
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);

    let configured = match kind {
        BrowserKind::Chrome => config.chrome_binary.clone(),
        BrowserKind::Firefox => config.firefox_binary.clone(),
        BrowserKind::Edge | BrowserKind::Safari => None,
    };

    let well_known = well_known_binaries(kind, os).iter().map(PathBuf::from);

    from_env
        .chain(configured)
        .chain(well_known)
        .find(|candidate| exists(candidate.as_path()))
}

/// Try `chain` in order and return the first backend `acquire` brings up.
///
/// Every failure is logged and recorded; if all fail the result is
/// [`E2eError::NoUsableBrowser`] listing each attempt.
pub async fn first_available<T, F, Fut>(chain: &[BrowserKind], mut acquire: F) -> E2eResult<(BrowserKind, T)>
where
    F: FnMut(BrowserKind) -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let mut attempted = Vec::with_capacity(chain.len());

    for &kind in chain {
        info!("Trying {} backend", kind);
        match acquire(kind).await {
            Ok(value) => {
                info!("Using {} backend", kind);
                return Ok((kind, value));
            }
            Err(e) => {
                warn!("{} WebDriver initialization failed: {}", kind, e);
                attempted.push(format!("{}: {}", kind, e));
            }
        }
    }

    Err(E2eError::NoUsableBrowser { attempted })
}

/// Resolves a configured browser session with OS-aware fallback
pub struct DriverResolver {
    config: BrowserConfig,
    os: HostOs,
}

impl DriverResolver {
    pub fn new(config: BrowserConfig) -> Self {
        Self::for_os(config, HostOs::current())
    }

    pub fn for_os(config: BrowserConfig, os: HostOs) -> Self {
        Self { config, os }
    }

    /// Backends that [`resolve`](Self::resolve) will try, in order
    pub fn plan(&self) -> Vec<BrowserKind> {
        fallback_chain(self.config.name.as_deref(), self.os)
    }

    /// Bring up the first backend in the plan that works
    pub async fn resolve(&self) -> E2eResult<BrowserSession> {
        let plan = self.plan();
        info!(
            "Resolving browser (requested: {}, os: {:?}, plan: {:?})",
            self.config.name.as_deref().unwrap_or("auto"),
            self.os,
            plan
        );

        let (_, session) = first_available(&plan, |kind| self.acquire(kind)).await?;
        Ok(session)
    }

    fn launch_options(&self, kind: BrowserKind) -> LaunchOptions {
        let binary = locate_browser_binary(
            kind,
            &self.config,
            self.os,
            |var| std::env::var(var).ok(),
            Path::exists,
        );
        match &binary {
            Some(path) => info!("Using {} binary {}", kind, path.display()),
            None => info!("No explicit {} binary; relying on driver discovery", kind),
        }
        LaunchOptions::new(self.config.headless, binary)
    }

    /// One backend attempt: driver endpoint, session, then session settings
    async fn acquire(&self, kind: BrowserKind) -> E2eResult<BrowserSession> {
        let (server_url, process) = match &self.config.webdriver_url {
            Some(url) => (url.clone(), None),
            None => {
                let executable = locate_driver(kind.driver_executable(), kind.driver_env_var())?;
                let process = DriverProcess::spawn(&executable, |port| kind.driver_args(port)).await?;
                (process.url.clone(), Some(process))
            }
        };

        let caps = capabilities(kind, &self.launch_options(kind));
        let driver = WebDriver::new(server_url.as_str(), caps)
            .await
            .map_err(|e| E2eError::BackendLaunch {
                browser: kind.to_string(),
                reason: e.to_string(),
            })?;

        let session = BrowserSession::new(kind, driver, process);
        if let Err(e) = session.configure(&self.config).await {
            session.quit().await;
            return Err(e);
        }
        Ok(session)
    }
}
