//! Harness configuration
//!
//! Values are resolved in layers: built-in defaults, then an optional TOML
//! file, then named properties (looked up in the environment), then whatever
//! the command line overrides on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Path prefix of every catalog API endpoint
pub const API_PATH_PREFIX: &str = "/api";

/// Route of the catalog page on the frontend
pub const CATALOG_ROUTE: &str = "/catalog";

pub const DEFAULT_API_URL: &str = "http://localhost:443";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_HEADLESS: bool = true;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Page loads get this many wait timeouts
pub const PAGE_LOAD_TIMEOUT_FACTOR: u32 = 3;

/// Property names understood by [`HarnessConfig::apply_properties`]
pub mod props {
    pub const API_URL: &str = "test.api.url";
    pub const API_URL_FALLBACK: &str = "api.url";
    pub const FRONTEND_URL: &str = "frontend.url";
    pub const FRONTEND_URL_FALLBACK: &str = "test.base.url";
    pub const BROWSER: &str = "test.browser";
    pub const HEADLESS: &str = "test.headless";
    pub const TIMEOUT: &str = "test.timeout";
    pub const CHROME_BINARY: &str = "chrome.binary";
    pub const FIREFOX_BINARY: &str = "firefox.binary";
    pub const WEBDRIVER_URL: &str = "webdriver.url";
}

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Backend API base URL, without the `/api` prefix
    pub api_url: String,

    /// Frontend base URL, without the catalog route
    pub frontend_url: String,

    /// Browser configuration
    pub browser: BrowserConfig,

    /// Directory where suite results are written
    pub output_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            browser: BrowserConfig::default(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Browser selection and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Requested browser name (chrome, firefox, edge, safari). None = pick by OS
    pub name: Option<String>,

    /// Run without a visible window
    pub headless: bool,

    /// Implicit element wait, in seconds
    pub timeout_secs: u64,

    /// Explicit Chrome binary path
    pub chrome_binary: Option<PathBuf>,

    /// Explicit Firefox binary path
    pub firefox_binary: Option<PathBuf>,

    /// Remote WebDriver endpoint. When set, no local driver process is spawned
    pub webdriver_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            name: None,
            headless: DEFAULT_HEADLESS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            chrome_binary: None,
            firefox_binary: None,
            webdriver_url: None,
        }
    }
}

impl BrowserConfig {
    /// Implicit element wait timeout
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Page load timeout, a fixed multiple of the wait timeout
    pub fn page_load_timeout(&self) -> Duration {
        self.wait_timeout() * PAGE_LOAD_TIMEOUT_FACTOR
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve configuration from defaults, an optional file and the environment.
    ///
    /// A file that was asked for by name must exist.
    pub fn resolve(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) if !path.exists() => {
                return Err(Error::Config(format!(
                    "configuration file {} does not exist",
                    path.display()
                )))
            }
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_properties(env_property)?;
        Ok(config)
    }

    /// Overlay named properties on top of the current values.
    ///
    /// For each URL the primary property wins over its fallback; absent or
    /// blank properties leave the current value untouched.
    pub fn apply_properties<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(props::API_URL).or_else(|| get(props::API_URL_FALLBACK)) {
            self.api_url = url;
        }
        if let Some(url) = get(props::FRONTEND_URL).or_else(|| get(props::FRONTEND_URL_FALLBACK)) {
            self.frontend_url = url;
        }
        if let Some(name) = get(props::BROWSER) {
            self.browser.name = Some(name);
        }
        if let Some(raw) = get(props::HEADLESS) {
            self.browser.headless = parse_bool(&raw);
        }
        if let Some(raw) = get(props::TIMEOUT) {
            self.browser.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds, got '{}'", props::TIMEOUT, raw))
            })?;
        }
        if let Some(path) = get(props::CHROME_BINARY) {
            self.browser.chrome_binary = Some(PathBuf::from(path));
        }
        if let Some(path) = get(props::FIREFOX_BINARY) {
            self.browser.firefox_binary = Some(PathBuf::from(path));
        }
        if let Some(url) = get(props::WEBDRIVER_URL) {
            self.browser.webdriver_url = Some(url);
        }
        Ok(())
    }

    /// Full API base: `<api_url>/api`
    pub fn api_base(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), API_PATH_PREFIX)
    }

    /// Full catalog page URL: `<frontend_url>/catalog`
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.frontend_url.trim_end_matches('/'), CATALOG_ROUTE)
    }
}

/// Environment variable carrying a dotted property (`test.api.url` -> `TEST_API_URL`)
pub fn property_env_name(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

fn env_property(key: &str) -> Option<String> {
    std::env::var(property_env_name(key)).ok()
}

/// Anything other than a case-insensitive "true" is false
fn parse_bool(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.api_base(), "http://localhost:443/api");
        assert_eq!(config.catalog_url(), "http://localhost:5173/catalog");
        assert!(config.browser.headless);
        assert_eq!(config.browser.wait_timeout(), Duration::from_secs(20));
        assert_eq!(config.browser.page_load_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_primary_property_wins_over_fallback() {
        let mut config = HarnessConfig::default();
        config
            .apply_properties(lookup(&[
                ("test.api.url", "http://api.primary"),
                ("api.url", "http://api.fallback"),
                ("test.base.url", "http://front.fallback/"),
            ]))
            .unwrap();
        assert_eq!(config.api_url, "http://api.primary");
        assert_eq!(config.catalog_url(), "http://front.fallback/catalog");
    }

    #[test]
    fn test_fallback_property_used_when_primary_blank() {
        let mut config = HarnessConfig::default();
        config
            .apply_properties(lookup(&[("test.api.url", "  "), ("api.url", "http://api.fallback")]))
            .unwrap();
        assert_eq!(config.api_url, "http://api.fallback");
    }

    #[test]
    fn test_browser_properties() {
        let mut config = HarnessConfig::default();
        config
            .apply_properties(lookup(&[
                ("test.browser", "firefox"),
                ("test.headless", "FALSE"),
                ("test.timeout", "5"),
                ("chrome.binary", "/opt/chrome/chrome"),
            ]))
            .unwrap();
        assert_eq!(config.browser.name.as_deref(), Some("firefox"));
        assert!(!config.browser.headless);
        assert_eq!(config.browser.page_load_timeout(), Duration::from_secs(15));
        assert_eq!(config.browser.chrome_binary, Some(PathBuf::from("/opt/chrome/chrome")));
    }

    #[test]
    fn test_invalid_timeout_is_config_error() {
        let mut config = HarnessConfig::default();
        let err = config
            .apply_properties(lookup(&[("test.timeout", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_property_env_name() {
        assert_eq!(property_env_name("test.api.url"), "TEST_API_URL");
        assert_eq!(property_env_name("chrome.binary"), "CHROME_BINARY");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smashly.toml");
        std::fs::write(
            &path,
            r#"
api_url = "https://api.smashly.test"

[browser]
name = "edge"
timeout_secs = 8
"#,
        )
        .unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.api_url, "https://api.smashly.test");
        assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
        assert_eq!(config.browser.name.as_deref(), Some("edge"));
        assert_eq!(config.browser.timeout_secs, 8);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_resolve_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = HarnessConfig::resolve(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
