//! Product catalog endpoints.

use reqwest::StatusCode;
use tracing::debug;

use super::{error_from_response, ApiClient};
use crate::{error::ApiError, models::Product};

/// Result of a catalog search. "No matches" is a display state of its own,
/// distinct from both a transport failure and a valid empty catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Products matching the query, in backend order. May be empty.
    Found(Vec<Product>),
    /// Backend reported no products for the query (HTTP 404).
    NoMatches,
}

impl ApiClient {
    /// Fetch the full product catalog via `GET /products`.
    ///
    /// An empty list is a valid zero-result catalog; errors are reported
    /// separately so the frontend can show "could not load" instead.
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        debug!("fetching product catalog");
        let response = self.http().get(self.url("/products")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_products(status, &body)
    }

    /// Server-side product search via `GET /products/search?value=<query>`.
    pub async fn search_products(&self, query: &str) -> Result<SearchOutcome, ApiError> {
        debug!(query, "searching products");
        let response = self
            .http()
            .get(self.url("/products/search"))
            .query(&[("value", query)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_search(status, &body)
    }
}

fn interpret_products(status: StatusCode, body: &str) -> Result<Vec<Product>, ApiError> {
    if !status.is_success() {
        return Err(error_from_response(status, body));
    }
    Ok(serde_json::from_str(body)?)
}

fn interpret_search(status: StatusCode, body: &str) -> Result<SearchOutcome, ApiError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(SearchOutcome::NoMatches);
    }
    if !status.is_success() {
        return Err(error_from_response(status, body));
    }
    Ok(SearchOutcome::Found(serde_json::from_str(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PRODUCTS: &str = r#"[
        {"name": "iPhone XR", "category": "Phones", "cost": 100,
         "rating": 4, "image": "https://i.imgur.com/lulqWzW.jpg", "_id": "v4sLtEcMpzabRyfx"},
        {"name": "Basketball", "category": "Sports", "cost": 100,
         "rating": 5, "image": "https://i.imgur.com/lulqWzW.jpg", "_id": "upLK9JbQ4rMhTwt4"}
    ]"#;

    #[test]
    fn catalog_parses_a_product_list() {
        let products = interpret_products(StatusCode::OK, TWO_PRODUCTS).expect("valid list");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "v4sLtEcMpzabRyfx");
        assert_eq!(products[1].name, "Basketball");
    }

    #[test]
    fn empty_catalog_is_not_an_error() {
        let products = interpret_products(StatusCode::OK, "[]").expect("empty is valid");
        assert!(products.is_empty());
    }

    #[test]
    fn catalog_server_error_is_an_error_not_an_empty_list() {
        let body = r#"{"success": false, "message": "Something went wrong. Check the backend console for more details"}"#;
        let err = interpret_products(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500 }));
    }

    #[test]
    fn search_not_found_is_the_no_matches_state() {
        assert_eq!(
            interpret_search(StatusCode::NOT_FOUND, "").expect("404 is a state"),
            SearchOutcome::NoMatches
        );
    }

    #[test]
    fn search_no_matches_is_distinct_from_a_transport_class_failure() {
        // 404 drives the "no products found" display state.
        let no_matches = interpret_search(StatusCode::NOT_FOUND, "");
        assert!(matches!(no_matches, Ok(SearchOutcome::NoMatches)));

        // A 5xx is a real error: prior results stay visible and the
        // frontend shows a notification instead.
        let failure = interpret_search(StatusCode::BAD_GATEWAY, "");
        assert!(failure.is_err());
    }

    #[test]
    fn search_returns_matches_in_backend_order() {
        let outcome = interpret_search(StatusCode::OK, TWO_PRODUCTS).expect("valid list");
        match outcome {
            SearchOutcome::Found(products) => {
                assert_eq!(products.len(), 2);
                assert_eq!(products[0].name, "iPhone XR");
            }
            SearchOutcome::NoMatches => panic!("expected matches"),
        }
    }
}
