//! Catalog page object
//!
//! Wraps the rendered catalog behind semantic queries. Lookups are lenient:
//! an element that is missing or not rendered yet turns into an empty or
//! negative answer instead of an error, because absent banners and empty
//! lists are legitimate page states. The only error a query raises on its
//! own is an out-of-range row index.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::browser::{any_displayed, wait_for_hidden, wait_for_present, Browser, Locator, PageElement};
use crate::error::{E2eError, E2eResult};
use crate::racket_info::RacketInfo;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

pub const TITLE_TAG: &str = "h1";
pub const LIST_TAG: &str = "ul";
pub const ROW_TAG: &str = "li";
pub const CATALOG_LABEL: &str = "Catálogo";
pub const TOTAL_LABEL: &str = "Total de palas mostradas";
pub const LOADING_RACKETS: &str = "Cargando palas";
pub const LOADING_CATALOG: &str = "Cargando catálogo";
pub const ERROR_LABEL: &str = "Error:";
pub const EMPTY_LABEL: &str = "No se encontraron palas";
pub const RACKETS_STAT_LABEL: &str = "Palas";

/// Rows inspected by [`CatalogPage::verify_row_data`]
pub const VERIFIED_ROWS: usize = 5;

/// Stat parents longer than this are page copy, not a stat block
const MAX_STAT_TEXT_LEN: usize = 50;

/// Which readiness signal ended [`CatalogPage::load`]'s wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadySignal {
    Heading,
    CatalogText,
    ListItems,
}

/// Page object for the catalog route
pub struct CatalogPage<'a, B: Browser> {
    browser: &'a B,
    wait: Duration,
}

impl<'a, B: Browser> CatalogPage<'a, B> {
    pub fn new(browser: &'a B, wait: Duration) -> Self {
        Self { browser, wait }
    }

    pub fn browser(&self) -> &'a B {
        self.browser
    }

    /// Navigate to `url` and wait until the page looks ready.
    ///
    /// Tries the heading, then the catalog label, then any list row, each for
    /// the full wait timeout. If none shows up the page is used as is and the
    /// assertions that follow decide. Navigation errors are returned.
    pub async fn load(&self, url: &str) -> E2eResult<Option<ReadySignal>> {
        self.browser.navigate(url).await?;

        let signal = self.wait_until_ready().await;
        match signal {
            Some(signal) => debug!("Page ready ({:?})", signal),
            None => info!("No readiness signal on {}; continuing", url),
        }

        // Loading banners may never appear when data arrives quickly
        wait_for_hidden(self.browser, &Locator::tag_with_text("div", LOADING_RACKETS), self.wait).await;
        wait_for_hidden(self.browser, &Locator::text(LOADING_CATALOG), self.wait).await;

        Ok(signal)
    }

    async fn wait_until_ready(&self) -> Option<ReadySignal> {
        let cascade = [
            (ReadySignal::Heading, Locator::tag(TITLE_TAG)),
            (ReadySignal::CatalogText, Locator::text(CATALOG_LABEL)),
            (ReadySignal::ListItems, Locator::tag(ROW_TAG)),
        ];
        for (signal, locator) in cascade {
            if wait_for_present(self.browser, &locator, self.wait).await {
                return Some(signal);
            }
            debug!("Readiness signal {:?} not seen, trying the next one", signal);
        }
        None
    }

    /// Heading text, empty if there is no heading
    pub async fn title(&self) -> String {
        self.text_of(&Locator::tag(TITLE_TAG)).await
    }

    /// Catalog rows, scoped to the list container when there is one
    pub async fn rows(&self) -> Vec<B::Element> {
        let list = Locator::tag(LIST_TAG);
        let row = Locator::tag(ROW_TAG);

        if wait_for_present(self.browser, &list, self.wait).await {
            if let Some(container) = self.browser.locate_first(&list).await {
                if let Ok(rows) = container.locate_all(&row).await {
                    return rows;
                }
            }
        }

        debug!("List container not found, counting rows page-wide");
        if wait_for_present(self.browser, &row, self.wait).await {
            self.browser.locate_all(&row).await.unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    /// Number of rendered catalog rows
    pub async fn item_count(&self) -> usize {
        self.rows().await.len()
    }

    /// Text of the "Total de palas mostradas" summary, empty if absent
    pub async fn total_count_text(&self) -> String {
        let locator = Locator::tag_with_text("p", TOTAL_LABEL);
        if !wait_for_present(self.browser, &locator, self.wait).await {
            return String::new();
        }
        self.text_of(&locator).await
    }

    /// First number in the summary text, zero if there is none
    pub async fn displayed_total(&self) -> u64 {
        first_number(&self.total_count_text().await).unwrap_or(0)
    }

    /// Parsed contents of row `index`
    pub async fn item_info(&self, index: usize) -> E2eResult<RacketInfo> {
        let rows = self.rows().await;
        let Some(row) = rows.get(index) else {
            return Err(E2eError::IndexOutOfRange { index, count: rows.len() });
        };
        Ok(RacketInfo::parse(&row.rendered_text().await?))
    }

    /// The first rows each read as a name plus a brand or a price
    pub async fn verify_row_data(&self) -> bool {
        let rows = self.rows().await;
        if rows.is_empty() {
            return false;
        }

        for (i, row) in rows.iter().take(VERIFIED_ROWS).enumerate() {
            let text = row.rendered_text().await.unwrap_or_default();
            if text.trim().is_empty() {
                debug!("Row {} has no text", i);
                return false;
            }
            let info = RacketInfo::parse(&text);
            if !info.is_plausible() {
                debug!("Row {} does not look like a racket: {:?}", i, text);
                return false;
            }
        }
        true
    }

    pub async fn is_list_visible(&self) -> bool {
        self.is_visible(&Locator::tag(LIST_TAG)).await
    }

    pub async fn is_error_visible(&self) -> bool {
        self.is_visible(&Locator::tag_with_text("div", ERROR_LABEL)).await
    }

    /// Error banner text, empty if absent
    pub async fn error_message(&self) -> String {
        self.text_of(&Locator::tag_with_text("div", ERROR_LABEL)).await
    }

    pub async fn is_empty_message_visible(&self) -> bool {
        self.is_visible(&Locator::text(EMPTY_LABEL)).await
    }

    pub async fn is_loading_visible(&self) -> bool {
        self.is_visible(&Locator::text(LOADING_CATALOG)).await
    }

    /// Number shown next to a header stat label such as "Palas", zero if absent.
    ///
    /// First looks for an element whose whole text is the label and reads its
    /// parent. Failing that, takes the first short parent of any element that
    /// mentions the label.
    pub async fn stat_count(&self, label: &str) -> u64 {
        let exact = Locator::exact_text(label);
        if wait_for_present(self.browser, &exact, self.wait).await {
            if let Some(element) = self.browser.locate_first(&exact).await {
                if let Some(n) = self.parent_number(&element, label, usize::MAX).await {
                    return n;
                }
            }
        }

        let candidates = self.browser.locate_all(&Locator::text(label)).await.unwrap_or_default();
        for candidate in &candidates {
            if let Some(n) = self.parent_number(candidate, label, MAX_STAT_TEXT_LEN).await {
                return n;
            }
        }
        0
    }

    async fn parent_number(&self, element: &B::Element, label: &str, max_len: usize) -> Option<u64> {
        let parent = element.parent_element().await.ok()?;
        let text = parent.rendered_text().await.ok()?;
        let text = text.trim();
        if text.chars().count() > max_len || !text.contains(label) {
            return None;
        }
        first_number(text)
    }

    async fn is_visible(&self, locator: &Locator) -> bool {
        any_displayed(self.browser, locator).await
    }

    async fn text_of(&self, locator: &Locator) -> String {
        match self.browser.locate_first(locator).await {
            Some(element) => element.rendered_text().await.unwrap_or_default(),
            None => String::new(),
        }
    }
}

/// First run of digits in `text`
pub fn first_number(text: &str) -> Option<u64> {
    DIGITS.find(text).and_then(|m| m.as_str().parse().ok())
}
