//! Ordered catalog page scenarios
//!
//! Every scenario reloads the catalog page before asserting, so each one
//! reads fresh state from the shared browser session.

use tracing::info;

use smashly_common::check;

use crate::browser::Browser;
use crate::error::E2eResult;
use crate::page::{CatalogPage, CATALOG_LABEL, TOTAL_LABEL, VERIFIED_ROWS};

/// Rows the catalog renders on its first page
pub const MAX_RENDERED_ROWS: usize = 20;

/// Shortest acceptable racket name
const MIN_NAME_LEN: usize = 4;

/// E2E scenarios in their declared execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogScenario {
    LoadsCatalog,
    DisplaysRackets,
    ValidRacketInfo,
    EmptyState,
    ExpectedRowCount,
    ResponsiveElements,
}

impl CatalogScenario {
    pub const ALL: [CatalogScenario; 6] = [
        CatalogScenario::LoadsCatalog,
        CatalogScenario::DisplaysRackets,
        CatalogScenario::ValidRacketInfo,
        CatalogScenario::EmptyState,
        CatalogScenario::ExpectedRowCount,
        CatalogScenario::ResponsiveElements,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CatalogScenario::LoadsCatalog => "loads_catalog",
            CatalogScenario::DisplaysRackets => "displays_rackets",
            CatalogScenario::ValidRacketInfo => "valid_racket_info",
            CatalogScenario::EmptyState => "empty_state",
            CatalogScenario::ExpectedRowCount => "expected_row_count",
            CatalogScenario::ResponsiveElements => "responsive_elements",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CatalogScenario::LoadsCatalog => "Catalog page loads with its title",
            CatalogScenario::DisplaysRackets => "Rackets from the API are rendered",
            CatalogScenario::ValidRacketInfo => "Rendered rows carry racket information",
            CatalogScenario::EmptyState => "Empty catalog shows the empty-state message",
            CatalogScenario::ExpectedRowCount => "No more than one page of rackets is rendered",
            CatalogScenario::ResponsiveElements => "Key page elements are visible",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Load `catalog_url` and run the scenario's assertions against it
    pub async fn run<B: Browser>(&self, page: &CatalogPage<'_, B>, catalog_url: &str) -> E2eResult<()> {
        page.load(catalog_url).await?;

        match self {
            CatalogScenario::LoadsCatalog => loads_catalog(page).await,
            CatalogScenario::DisplaysRackets => displays_rackets(page).await,
            CatalogScenario::ValidRacketInfo => valid_racket_info(page).await,
            CatalogScenario::EmptyState => empty_state(page).await,
            CatalogScenario::ExpectedRowCount => expected_row_count(page).await,
            CatalogScenario::ResponsiveElements => responsive_elements(page).await,
        }
    }
}

async fn loads_catalog<B: Browser>(page: &CatalogPage<'_, B>) -> E2eResult<()> {
    let url = page.browser().url().await?;
    check!(url.contains("/catalog"), "URL should contain /catalog, got {}", url);

    let title = page.title().await;
    check!(!title.is_empty(), "page should have a title");
    check!(
        title.to_lowercase().contains(&CATALOG_LABEL.to_lowercase()),
        "title should mention '{}', got '{}'",
        CATALOG_LABEL,
        title
    );

    info!("Catalog loaded with title '{}'", title);
    Ok(())
}

async fn displays_rackets<B: Browser>(page: &CatalogPage<'_, B>) -> E2eResult<()> {
    check!(
        !page.is_error_visible().await,
        "no error should be displayed, got '{}'",
        page.error_message().await
    );
    check!(!page.is_loading_visible().await, "loading banner should be gone after page load");
    check!(page.is_list_visible().await, "rackets list should be displayed");

    let count = page.item_count().await;
    check!(
        (1..=MAX_RENDERED_ROWS).contains(&count),
        "should display between 1 and {} rackets, got {}",
        MAX_RENDERED_ROWS,
        count
    );

    let total = page.displayed_total().await;
    check!(
        total == count as u64,
        "displayed total {} should match the {} rendered rackets",
        total,
        count
    );

    info!("{} rackets rendered", count);
    Ok(())
}

async fn valid_racket_info<B: Browser>(page: &CatalogPage<'_, B>) -> E2eResult<()> {
    check!(page.verify_row_data().await, "racket rows should contain valid information");

    let to_check = page.item_count().await.min(VERIFIED_ROWS);
    for index in 0..to_check {
        let racket = page.item_info(index).await?;
        check!(racket.has_name(), "racket {} should have a name", index);
        check!(
            racket.name.chars().count() >= MIN_NAME_LEN,
            "racket {} name should be longer than 3 characters, got '{}'",
            index,
            racket.name
        );
        info!("Racket {}: {}", index, racket);
    }
    Ok(())
}

async fn empty_state<B: Browser>(page: &CatalogPage<'_, B>) -> E2eResult<()> {
    if page.item_count().await == 0 {
        check!(
            page.is_empty_message_visible().await,
            "empty-state message should be displayed when there are no rackets"
        );
        info!("Empty catalog handled");
    } else {
        info!("Catalog has data; empty state not applicable");
    }
    Ok(())
}

async fn expected_row_count<B: Browser>(page: &CatalogPage<'_, B>) -> E2eResult<()> {
    let count = page.item_count().await;
    check!(
        count <= MAX_RENDERED_ROWS,
        "should display at most {} rackets, got {}",
        MAX_RENDERED_ROWS,
        count
    );
    info!("{} rackets rendered", count);
    Ok(())
}

async fn responsive_elements<B: Browser>(page: &CatalogPage<'_, B>) -> E2eResult<()> {
    check!(!page.title().await.is_empty(), "page title should be present");

    if page.item_count().await > 0 {
        check!(page.is_list_visible().await, "rackets list should be visible when data is present");
        let total_text = page.total_count_text().await;
        check!(
            total_text.contains(TOTAL_LABEL),
            "total label should contain '{}', got '{}'",
            TOTAL_LABEL,
            total_text
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::E2eError;
    use crate::fake::{FakeBrowser, BODY};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_millis(30);
    const URL: &str = "http://localhost:5173/catalog";

    async fn run(browser: &FakeBrowser, scenario: CatalogScenario) -> E2eResult<()> {
        let page = CatalogPage::new(browser, WAIT);
        scenario.run(&page, URL).await
    }

    fn assertion_message(result: E2eResult<()>) -> String {
        match result {
            Err(E2eError::Common(e)) if e.is_assertion() => e.to_string(),
            other => panic!("expected an assertion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_names_are_unique_and_ordered() {
        let names: Vec<_> = CatalogScenario::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names[0], "loads_catalog");
        assert_eq!(names[5], "responsive_elements");
        for scenario in CatalogScenario::ALL {
            assert_eq!(CatalogScenario::from_name(scenario.name()), Some(scenario));
        }
        assert_eq!(CatalogScenario::from_name("nope"), None);
    }

    #[tokio::test]
    async fn test_every_scenario_passes_on_healthy_catalog() {
        let browser = FakeBrowser::catalog(&[
            "Vertex 04 - Bullpadel - 219,95 €",
            "AT10 Genius - NOX - 189,90 €",
        ]);
        for scenario in CatalogScenario::ALL {
            run(&browser, scenario).await.unwrap();
        }
        assert_eq!(browser.navigations(), CatalogScenario::ALL.len());
    }

    #[tokio::test]
    async fn test_wrong_route_fails_loads_catalog() {
        let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
        let page = CatalogPage::new(&browser, WAIT);
        let msg = assertion_message(CatalogScenario::LoadsCatalog.run(&page, "http://localhost:5173/").await);
        assert!(msg.contains("/catalog"));
    }

    #[tokio::test]
    async fn test_total_mismatch_fails_displays_rackets() {
        let browser = FakeBrowser::new();
        browser.append(BODY, "h1", "Catálogo de Palas");
        let list = browser.append(BODY, "ul", "");
        browser.append(list, "li", "Vertex 04 - Bullpadel - 219,95 €");
        browser.append(BODY, "p", "Total de palas mostradas: 7");

        let msg = assertion_message(run(&browser, CatalogScenario::DisplaysRackets).await);
        assert!(msg.contains("displayed total 7"));
    }

    #[tokio::test]
    async fn test_error_banner_fails_displays_rackets() {
        let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
        browser.append(BODY, "div", "Error: backend unavailable");

        let msg = assertion_message(run(&browser, CatalogScenario::DisplaysRackets).await);
        assert!(msg.contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_too_many_rows() {
        let rows: Vec<String> = (0..21).map(|i| format!("Pala {} - NOX - 100 €", i)).collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let browser = FakeBrowser::catalog(&rows);

        assertion_message(run(&browser, CatalogScenario::ExpectedRowCount).await);
        assertion_message(run(&browser, CatalogScenario::DisplaysRackets).await);
    }

    #[tokio::test]
    async fn test_short_name_fails_valid_racket_info() {
        let browser = FakeBrowser::catalog(&["X1 - NOX - 100 €"]);
        let msg = assertion_message(run(&browser, CatalogScenario::ValidRacketInfo).await);
        assert!(msg.contains("longer than 3"));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let browser = FakeBrowser::catalog(&[]);
        assertion_message(run(&browser, CatalogScenario::EmptyState).await);

        browser.append(BODY, "p", "No se encontraron palas");
        run(&browser, CatalogScenario::EmptyState).await.unwrap();
        run(&browser, CatalogScenario::ExpectedRowCount).await.unwrap();
        run(&browser, CatalogScenario::ResponsiveElements).await.unwrap();
    }
}
