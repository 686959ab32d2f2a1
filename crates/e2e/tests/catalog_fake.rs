//! Catalog suite against the in-memory DOM
//!
//! Exercises the whole scenario list through the public API, the way the
//! binary drives it, without a browser.

use std::time::Duration;

use smashly_common::SuiteResult;
use smashly_e2e::fake::{FakeBrowser, BODY};
use smashly_e2e::{CatalogPage, CatalogScenario, CatalogSuite, E2eError};

const WAIT: Duration = Duration::from_millis(30);
const CATALOG_URL: &str = "http://localhost:5173/catalog";

fn twenty_rackets() -> Vec<String> {
    let brands = ["NOX", "Bullpadel", "Head", "Babolat", "Adidas"];
    (0..20)
        .map(|i| format!("Modelo {:02} - {} - {},95 €", i, brands[i % brands.len()], 150 + i))
        .collect()
}

async fn run_all(browser: &FakeBrowser) -> SuiteResult {
    CatalogSuite::new(browser, CATALOG_URL, WAIT).run_all().await
}

#[tokio::test]
async fn full_page_of_rackets_passes() {
    let rows = twenty_rackets();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let browser = FakeBrowser::catalog(&rows);

    let result = run_all(&browser).await;
    assert!(result.all_passed(), "failures: {:?}", result.results);
    assert_eq!(result.total, CatalogScenario::ALL.len());
}

#[tokio::test]
async fn results_are_written_as_json() {
    let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
    let result = run_all(&browser).await;

    let dir = tempfile::tempdir().unwrap();
    let path = result.write_to(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "e2e-results.json");

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["suite"], "e2e");
    assert_eq!(json["results"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn loading_banner_that_never_clears_fails_only_display_check() {
    let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
    browser.append(BODY, "div", "Cargando catálogo...");

    let result = run_all(&browser).await;
    let failed: Vec<&str> = result
        .results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(failed, vec!["displays_rackets"]);
}

#[tokio::test]
async fn unrendered_page_fails_without_erroring_out() {
    let browser = FakeBrowser::new();

    let result = run_all(&browser).await;
    let passed: Vec<&str> = result
        .results
        .iter()
        .filter(|r| r.success)
        .map(|r| r.name.as_str())
        .collect();

    // An empty page is a legitimate state for the row-count check only
    assert_eq!(passed, vec!["expected_row_count"]);
    assert_eq!(result.failed, 5);
}

#[tokio::test]
async fn item_info_out_of_range_is_a_bounds_error() {
    let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
    let page = CatalogPage::new(&browser, WAIT);
    page.load(CATALOG_URL).await.unwrap();

    let err = page.item_info(5).await.unwrap_err();
    assert!(matches!(err, E2eError::IndexOutOfRange { index: 5, count: 1 }));
    assert!(!err.is_environment());
}
