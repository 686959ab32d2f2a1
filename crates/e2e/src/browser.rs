//! Browser abstraction used by page objects
//!
//! Page objects talk to [`Browser`] and [`PageElement`] rather than to a
//! WebDriver session directly, so the same page logic runs against a live
//! browser or the in-memory DOM in [`crate::fake`].

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::{By, WebDriver, WebElement};
use tracing::debug;

use crate::error::E2eResult;

/// How often explicit waits poll the page
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Element lookup strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Elements with the given tag name
    Tag(String),

    /// Elements inside `<body>` (of `tag`, or any tag) whose own text contains `text`
    TextContains { tag: Option<String>, text: String },

    /// Elements inside `<body>` whose whitespace-normalized own text equals `text`
    TextEquals(String),
}

impl Locator {
    pub fn tag(tag: &str) -> Self {
        Locator::Tag(tag.to_string())
    }

    pub fn text(text: &str) -> Self {
        Locator::TextContains { tag: None, text: text.to_string() }
    }

    pub fn tag_with_text(tag: &str, text: &str) -> Self {
        Locator::TextContains { tag: Some(tag.to_string()), text: text.to_string() }
    }

    pub fn exact_text(text: &str) -> Self {
        Locator::TextEquals(text.to_string())
    }

    /// XPath for the text-based strategies. Both stay under `<body>` so the
    /// document `<title>` never matches.
    pub fn xpath(&self) -> Option<String> {
        match self {
            Locator::Tag(_) => None,
            Locator::TextContains { tag, text } => Some(format!(
                "//body//{}[contains(text(), {})]",
                tag.as_deref().unwrap_or("*"),
                xpath_literal(text)
            )),
            Locator::TextEquals(text) => Some(format!(
                "//body//*[normalize-space(text())={}]",
                xpath_literal(text)
            )),
        }
    }

    fn to_by(&self) -> By {
        match self {
            Locator::Tag(tag) => By::Tag(tag.as_str()),
            other => By::XPath(other.xpath().unwrap_or_default().as_str()),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Tag(tag) => write!(f, "<{}>", tag),
            Locator::TextContains { tag, text } => {
                write!(f, "<{}> containing '{}'", tag.as_deref().unwrap_or("*"), text)
            }
            Locator::TextEquals(text) => write!(f, "text '{}'", text),
        }
    }
}

/// Quote a string as an XPath 1.0 literal
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// A rendered element
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    /// Rendered text of the element and its descendants
    async fn rendered_text(&self) -> E2eResult<String>;

    async fn displayed(&self) -> E2eResult<bool>;

    /// Descendants matching `locator`
    async fn locate_all(&self, locator: &Locator) -> E2eResult<Vec<Self>>;

    async fn parent_element(&self) -> E2eResult<Self>;
}

/// A browser tab that can navigate and look up elements
#[async_trait]
pub trait Browser: Send + Sync {
    type Element: PageElement;

    async fn navigate(&self, url: &str) -> E2eResult<()>;

    async fn url(&self) -> E2eResult<String>;

    /// Elements anywhere on the page matching `locator`
    async fn locate_all(&self, locator: &Locator) -> E2eResult<Vec<Self::Element>>;

    /// First match, or `None`. Lookup errors count as absence.
    async fn locate_first(&self, locator: &Locator) -> Option<Self::Element> {
        match self.locate_all(locator).await {
            Ok(found) => found.into_iter().next(),
            Err(e) => {
                debug!("Lookup of {} failed: {}", locator, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageElement for WebElement {
    async fn rendered_text(&self) -> E2eResult<String> {
        Ok(self.text().await?)
    }

    async fn displayed(&self) -> E2eResult<bool> {
        Ok(self.is_displayed().await?)
    }

    async fn locate_all(&self, locator: &Locator) -> E2eResult<Vec<Self>> {
        Ok(self.find_all(locator.to_by()).await?)
    }

    async fn parent_element(&self) -> E2eResult<Self> {
        Ok(self.find(By::XPath("..")).await?)
    }
}

#[async_trait]
impl Browser for WebDriver {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> E2eResult<()> {
        debug!("Navigating to {}", url);
        Ok(self.goto(url).await?)
    }

    async fn url(&self) -> E2eResult<String> {
        Ok(self.current_url().await?.to_string())
    }

    async fn locate_all(&self, locator: &Locator) -> E2eResult<Vec<Self::Element>> {
        Ok(self.find_all(locator.to_by()).await?)
    }
}

/// Poll until at least one element matches. Returns false on timeout.
pub async fn wait_for_present<B: Browser>(browser: &B, locator: &Locator, timeout: Duration) -> bool {
    let poll = async {
        loop {
            if let Ok(found) = browser.locate_all(locator).await {
                if !found.is_empty() {
                    return;
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    let present = tokio::time::timeout(timeout, poll).await.is_ok();
    if !present {
        debug!("Timed out after {:?} waiting for {}", timeout, locator);
    }
    present
}

/// Poll until no matching element is displayed. Returns false on timeout.
pub async fn wait_for_hidden<B: Browser>(browser: &B, locator: &Locator, timeout: Duration) -> bool {
    let poll = async {
        loop {
            if !any_displayed(browser, locator).await {
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.is_ok()
}

/// True if some element matching `locator` is displayed. Absence is false.
pub async fn any_displayed<B: Browser>(browser: &B, locator: &Locator) -> bool {
    let Ok(found) = browser.locate_all(locator).await else {
        return false;
    };
    for element in &found {
        if element.displayed().await.unwrap_or(false) {
            return true;
        }
    }
    false
}
