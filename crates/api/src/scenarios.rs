//! Ordered API scenarios
//!
//! Each scenario issues one call or a small fixed sequence of calls and
//! checks status, envelope and payload shape. The only state shared between
//! scenarios is the [`ApiContext`] fixture, passed explicitly.

use reqwest::StatusCode;
use tracing::{info, warn};

use smashly_common::{check, Envelope, Racket, Result};

use crate::client::{ApiResponse, CatalogClient, ListQuery};

/// Id that no catalog is expected to contain
pub const MISSING_RACKET_ID: i64 = 999_999;

/// Brands and models common enough that at least one must match
pub const SEARCH_TERMS: [&str; 5] = ["NOX", "BULLPADEL", "HEAD", "BABOLAT", "Vertex"];

/// Shorter than the backend's two-character minimum
pub const SHORT_SEARCH_TERM: &str = "a";

/// A record picked from a listing for reuse by later scenarios
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestedRacket {
    pub id: i64,
    pub name: Option<String>,
}

/// State threaded through the suite
pub struct ApiContext {
    pub client: CatalogClient,
    pub harvested: Option<HarvestedRacket>,
}

impl ApiContext {
    pub fn new(client: CatalogClient) -> Self {
        Self { client, harvested: None }
    }

    /// The harvested id, or one re-derived from a single-record listing
    async fn racket_id(&mut self) -> Result<i64> {
        if let Some(harvested) = &self.harvested {
            return Ok(harvested.id);
        }
        let resp = self.client.list(ListQuery::limit(1)).await?;
        let rackets = expect_racket_list(&resp, StatusCode::OK)?;
        let harvested = harvest(rackets)?;
        let id = harvested.id;
        self.harvested = Some(harvested);
        Ok(id)
    }
}

/// API scenarios in their declared execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiScenario {
    Health,
    ListRackets,
    RequiredFields,
    RacketById,
    MissingRacket,
    Search,
    ShortSearchRejected,
    Pagination,
    Bestsellers,
    CatalogCoverage,
}

impl ApiScenario {
    pub const ALL: [ApiScenario; 10] = [
        ApiScenario::Health,
        ApiScenario::ListRackets,
        ApiScenario::RequiredFields,
        ApiScenario::RacketById,
        ApiScenario::MissingRacket,
        ApiScenario::Search,
        ApiScenario::ShortSearchRejected,
        ApiScenario::Pagination,
        ApiScenario::Bestsellers,
        ApiScenario::CatalogCoverage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ApiScenario::Health => "health",
            ApiScenario::ListRackets => "list_rackets",
            ApiScenario::RequiredFields => "required_fields",
            ApiScenario::RacketById => "racket_by_id",
            ApiScenario::MissingRacket => "missing_racket",
            ApiScenario::Search => "search",
            ApiScenario::ShortSearchRejected => "short_search_rejected",
            ApiScenario::Pagination => "pagination",
            ApiScenario::Bestsellers => "bestsellers",
            ApiScenario::CatalogCoverage => "catalog_coverage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ApiScenario::Health => "Server reports healthy",
            ApiScenario::ListRackets => "Catalog listing returns rackets",
            ApiScenario::RequiredFields => "Rackets carry their required fields",
            ApiScenario::RacketById => "Racket retrieved by id",
            ApiScenario::MissingRacket => "Unknown id returns not found",
            ApiScenario::Search => "Search finds common brands",
            ApiScenario::ShortSearchRejected => "One-character search is rejected",
            ApiScenario::Pagination => "Listing honours limit and page",
            ApiScenario::Bestsellers => "Bestseller endpoint returns only bestsellers",
            ApiScenario::CatalogCoverage => "Catalog records are populated",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub async fn run(&self, ctx: &mut ApiContext) -> Result<()> {
        match self {
            ApiScenario::Health => health(ctx).await,
            ApiScenario::ListRackets => list_rackets(ctx).await,
            ApiScenario::RequiredFields => required_fields(ctx).await,
            ApiScenario::RacketById => racket_by_id(ctx).await,
            ApiScenario::MissingRacket => missing_racket(ctx).await,
            ApiScenario::Search => search(ctx).await,
            ApiScenario::ShortSearchRejected => short_search_rejected(ctx).await,
            ApiScenario::Pagination => pagination(ctx).await,
            ApiScenario::Bestsellers => bestsellers(ctx).await,
            ApiScenario::CatalogCoverage => catalog_coverage(ctx).await,
        }
    }
}

async fn health(ctx: &mut ApiContext) -> Result<()> {
    let resp = ctx.client.health().await?;
    expect_json_status(&resp, StatusCode::OK)?;
    expect_success(&resp.body)?;

    let data = resp.body.data.as_ref();
    let status = data.and_then(|d| d.status.as_deref());
    check!(status.is_some(), "field 'data.status' must be present");
    check!(status == Some("OK"), "status must be 'OK', got {:?}", status);
    check!(
        data.and_then(|d| d.timestamp.as_ref()).is_some(),
        "field 'data.timestamp' must be present"
    );
    Ok(())
}

async fn list_rackets(ctx: &mut ApiContext) -> Result<()> {
    let resp = ctx.client.list(ListQuery::limit(50)).await?;
    let rackets = expect_racket_list(&resp, StatusCode::OK)?;
    check!(resp.body.timestamp.is_some(), "response must carry a timestamp");
    check!(!rackets.is_empty(), "the catalog must contain at least one racket");

    let harvested = harvest(rackets)?;
    info!("Harvested racket {} ({:?}) for later scenarios", harvested.id, harvested.name);
    ctx.harvested = Some(harvested);
    Ok(())
}

async fn required_fields(ctx: &mut ApiContext) -> Result<()> {
    let resp = ctx.client.list(ListQuery::limit(10)).await?;
    check!(resp.status == StatusCode::OK, "expected status 200, got {}", resp.status);
    let rackets = resp.body.data.as_deref().unwrap_or_default();
    check!(!rackets.is_empty(), "there must be rackets to validate");

    let racket = &rackets[0];
    expect_required_fields(racket)?;

    if !racket.pricing_is_complete() {
        warn!("Racket {:?} reports partial pricing", racket.id);
    }
    match racket.current_price {
        Some(price) => info!("Racket {:?} priced at {} ({:?})", racket.id, price, racket.source),
        None => info!("Racket {:?} has no pricing data", racket.id),
    }
    Ok(())
}

async fn racket_by_id(ctx: &mut ApiContext) -> Result<()> {
    let id = ctx.racket_id().await?;

    let resp = ctx.client.racket(id).await?;
    expect_json_status(&resp, StatusCode::OK)?;
    expect_success(&resp.body)?;

    let racket = resp.body.data.as_ref();
    check!(racket.is_some(), "response must contain the racket");
    let racket = racket.cloned().unwrap_or_default();

    check!(racket.id == Some(id), "id must match the requested {}, got {:?}", id, racket.id);
    check!(racket.name.is_some(), "racket must have a name");
    check!(racket.is_bestseller.is_some(), "racket must have the bestseller flag");
    check!(racket.on_sale.is_some(), "racket must have the on-sale flag");
    Ok(())
}

async fn missing_racket(ctx: &mut ApiContext) -> Result<()> {
    let resp = ctx.client.racket(MISSING_RACKET_ID).await?;
    expect_json_status(&resp, StatusCode::NOT_FOUND)?;

    check!(resp.body.success.is_some(), "field 'success' must be present");
    check!(resp.body.success == Some(false), "response must signal failure");
    check!(resp.body.message.is_some(), "response must include an error message");
    Ok(())
}

async fn search(ctx: &mut ApiContext) -> Result<()> {
    let mut any_results = false;

    for term in SEARCH_TERMS {
        let resp = ctx.client.search(term).await?;
        let results = expect_racket_list(&resp, StatusCode::OK)?;

        match results.first() {
            Some(first) => {
                any_results = true;
                if first.mentions(term) {
                    info!("'{}': {} result(s), first matches", term, results.len());
                } else {
                    // The term may match fields other than name, brand or model
                    info!("'{}': {} result(s), first does not mention the term", term, results.len());
                }
            }
            None => info!("'{}': no results", term),
        }
    }

    check!(any_results, "at least one common brand search must return results");
    Ok(())
}

async fn short_search_rejected(ctx: &mut ApiContext) -> Result<()> {
    let status = ctx.client.search_status(SHORT_SEARCH_TERM).await?;
    check!(
        status == StatusCode::BAD_REQUEST,
        "search for '{}' must be rejected with 400, got {}",
        SHORT_SEARCH_TERM,
        status
    );
    Ok(())
}

async fn pagination(ctx: &mut ApiContext) -> Result<()> {
    let limit = 5;
    let resp = ctx.client.list(ListQuery::limit(limit)).await?;
    check!(resp.status == StatusCode::OK, "expected status 200, got {}", resp.status);
    let rackets = resp.body.data.as_ref();
    check!(rackets.is_some(), "listing must return data");
    let count = rackets.map(Vec::len).unwrap_or(0);
    check!(count >= 1, "listing must return at least one racket");
    check!(count <= limit as usize, "limit={} returned {} rackets", limit, count);

    // The backend may ignore `page`; only the shape of the response is checked
    let page2 = ctx.client.list(ListQuery::limit(10).page(2)).await?;
    check!(page2.status == StatusCode::OK, "expected status 200 for page 2, got {}", page2.status);
    check!(page2.body.data.is_some(), "page 2 must return a list");
    info!("page=2&limit=10 returned {} racket(s)", page2.body.data.as_ref().map(Vec::len).unwrap_or(0));
    Ok(())
}

async fn bestsellers(ctx: &mut ApiContext) -> Result<()> {
    let resp = ctx.client.bestsellers().await?;
    let rackets = expect_racket_list(&resp, StatusCode::OK)?;

    if rackets.is_empty() {
        info!("No bestsellers in the catalog");
    }
    expect_all_bestsellers(rackets)
}

async fn catalog_coverage(ctx: &mut ApiContext) -> Result<()> {
    let resp = ctx.client.list(ListQuery::limit(20)).await?;
    check!(resp.status == StatusCode::OK, "expected status 200, got {}", resp.status);
    let rackets = resp.body.data.as_deref().unwrap_or_default();
    check!(!rackets.is_empty(), "the catalog must contain rackets");

    let coverage = CatalogCoverage::of(rackets);
    coverage.log();
    check!(coverage.with_brand > 0, "at least one racket must have a brand");
    Ok(())
}

/// Status must match and the body must be JSON
pub fn expect_json_status<T>(resp: &ApiResponse<T>, expected: StatusCode) -> Result<()> {
    check!(resp.status == expected, "expected status {}, got {}", expected, resp.status);
    check!(
        resp.is_json(),
        "expected a JSON response, got content type {:?}",
        resp.content_type
    );
    Ok(())
}

/// The success flag must be present and true
pub fn expect_success<T>(body: &Envelope<T>) -> Result<()> {
    check!(body.success.is_some(), "field 'success' must be present");
    check!(body.is_success(), "response must be successful: {:?}", body.message);
    Ok(())
}

/// A successful JSON listing whose data is a list
pub fn expect_racket_list(resp: &ApiResponse<Vec<Racket>>, status: StatusCode) -> Result<&[Racket]> {
    expect_json_status(resp, status)?;
    expect_success(&resp.body)?;
    match resp.body.data.as_deref() {
        Some(rackets) => Ok(rackets),
        None => Err(smashly_common::Error::Assertion("response must contain data".to_string())),
    }
}

/// Identity, display name and both boolean flags must be present
pub fn expect_required_fields(racket: &Racket) -> Result<()> {
    check!(racket.id.is_some(), "field 'id' is required");
    check!(racket.name.is_some(), "field 'name' is required on racket {:?}", racket.id);
    check!(racket.has_name(), "name must not be empty on racket {:?}", racket.id);
    check!(racket.is_bestseller.is_some(), "bestseller flag is required on racket {:?}", racket.id);
    check!(racket.on_sale.is_some(), "on-sale flag is required on racket {:?}", racket.id);
    Ok(())
}

/// Every record must be flagged as bestseller
pub fn expect_all_bestsellers(rackets: &[Racket]) -> Result<()> {
    for racket in rackets {
        check!(
            racket.is_bestseller == Some(true),
            "racket {:?} is returned as bestseller but not flagged as one",
            racket.id
        );
    }
    Ok(())
}

/// First record of a listing, for reuse by id
pub fn harvest(rackets: &[Racket]) -> Result<HarvestedRacket> {
    let first = rackets.first();
    check!(first.is_some(), "cannot harvest a racket from an empty listing");
    let first = first.cloned().unwrap_or_default();
    match first.id {
        Some(id) => Ok(HarvestedRacket { id, name: first.name }),
        None => Err(smashly_common::Error::Assertion("first racket has no id".to_string())),
    }
}

/// Field population statistics over a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogCoverage {
    pub total: usize,
    pub with_brand: usize,
    pub with_price: usize,
    pub with_image: usize,
    pub with_characteristics: usize,
    pub bestsellers: usize,
    pub on_sale: usize,
}

impl CatalogCoverage {
    pub fn of(rackets: &[Racket]) -> Self {
        let count = |f: fn(&Racket) -> bool| rackets.iter().filter(|r| f(r)).count();
        Self {
            total: rackets.len(),
            with_brand: count(Racket::has_brand),
            with_price: count(Racket::has_price),
            with_image: count(|r| r.image.is_some()),
            with_characteristics: count(Racket::has_characteristics),
            bestsellers: count(|r| r.is_bestseller == Some(true)),
            on_sale: count(|r| r.on_sale == Some(true)),
        }
    }

    fn percent(&self, n: usize) -> usize {
        if self.total == 0 {
            0
        } else {
            n * 100 / self.total
        }
    }

    pub fn log(&self) {
        info!("Analysed {} racket(s)", self.total);
        info!("  with brand: {} ({}%)", self.with_brand, self.percent(self.with_brand));
        info!("  with price: {} ({}%)", self.with_price, self.percent(self.with_price));
        info!("  with image: {} ({}%)", self.with_image, self.percent(self.with_image));
        info!(
            "  with characteristics: {} ({}%)",
            self.with_characteristics,
            self.percent(self.with_characteristics)
        );
        info!("  bestsellers: {}, on sale: {}", self.bestsellers, self.on_sale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn racket(id: i64, bestseller: bool) -> Racket {
        Racket {
            id: Some(id),
            name: Some(format!("Racket {}", id)),
            is_bestseller: Some(bestseller),
            on_sale: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_order_and_names() {
        let names: Vec<_> = ApiScenario::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&"health"));
        assert_eq!(names.last(), Some(&"catalog_coverage"));
        let by_id = names.iter().position(|n| *n == "racket_by_id").unwrap();
        let listing = names.iter().position(|n| *n == "list_rackets").unwrap();
        assert!(listing < by_id);
        assert_eq!(ApiScenario::from_name("search"), Some(ApiScenario::Search));
        assert_eq!(ApiScenario::from_name("nope"), None);
    }

    #[test]
    fn test_required_fields() {
        assert!(expect_required_fields(&racket(1, false)).is_ok());

        let blank = Racket { name: Some("  ".to_string()), ..racket(2, false) };
        assert!(expect_required_fields(&blank).unwrap_err().is_assertion());

        let no_flag = Racket { on_sale: None, ..racket(3, false) };
        assert!(expect_required_fields(&no_flag).is_err());
    }

    #[test]
    fn test_all_bestsellers() {
        assert!(expect_all_bestsellers(&[]).is_ok());
        assert!(expect_all_bestsellers(&[racket(1, true), racket(2, true)]).is_ok());
        let err = expect_all_bestsellers(&[racket(1, true), racket(2, false)]).unwrap_err();
        assert!(err.to_string().contains("Some(2)"));
    }

    #[test]
    fn test_harvest_first_racket() {
        let harvested = harvest(&[racket(11, false), racket(12, false)]).unwrap();
        assert_eq!(harvested.id, 11);
        assert_eq!(harvested.name.as_deref(), Some("Racket 11"));
        assert!(harvest(&[]).is_err());
    }

    #[test]
    fn test_coverage() {
        let rackets = vec![
            Racket { brand: Some("NOX".to_string()), current_price: Some(99.0), ..racket(1, true) },
            Racket { shape: Some("Redonda".to_string()), ..racket(2, false) },
        ];
        let coverage = CatalogCoverage::of(&rackets);
        assert_eq!(coverage.total, 2);
        assert_eq!(coverage.with_brand, 1);
        assert_eq!(coverage.with_price, 1);
        assert_eq!(coverage.with_characteristics, 1);
        assert_eq!(coverage.bestsellers, 1);
        assert_eq!(coverage.percent(coverage.with_brand), 50);
    }

    #[test]
    fn test_expect_json_status() {
        let resp = ApiResponse::<Vec<Racket>> {
            status: StatusCode::NOT_FOUND,
            content_type: Some("text/html".to_string()),
            body: Envelope { success: Some(false), data: None, message: None, error: None, timestamp: None },
        };
        assert!(expect_json_status(&resp, StatusCode::OK).is_err());
        let err = expect_json_status(&resp, StatusCode::NOT_FOUND).unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }
}
