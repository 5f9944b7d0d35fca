//! Cart endpoints. Both return the full cart; the backend is the source of
//! truth and callers replace their local state wholesale.

use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use super::{error_from_response, ApiClient};
use crate::{error::ApiError, models::CartRecord};

#[derive(Debug, Serialize)]
struct UpsertBody<'a> {
    #[serde(rename = "productId")]
    product_id: &'a str,
    qty: u32,
}

impl ApiClient {
    /// Fetch the raw cart for the authenticated user via `GET /cart`.
    pub async fn cart(&self, token: &str) -> Result<Vec<CartRecord>, ApiError> {
        debug!("fetching cart");
        let response = self
            .http()
            .get(self.url("/cart"))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_cart(status, &body)
    }

    /// Create or update one cart line via `POST /cart`. A quantity of zero
    /// removes the line server-side. The response is the full updated cart.
    pub async fn upsert_cart(
        &self,
        token: &str,
        product_id: &str,
        qty: u32,
    ) -> Result<Vec<CartRecord>, ApiError> {
        debug!(product_id, qty, "upserting cart line");
        let response = self
            .http()
            .post(self.url("/cart"))
            .bearer_auth(token)
            .json(&UpsertBody { product_id, qty })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_cart(status, &body)
    }
}

fn interpret_cart(status: StatusCode, body: &str) -> Result<Vec<CartRecord>, ApiError> {
    if !status.is_success() {
        return Err(error_from_response(status, body));
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_parses_backend_records() {
        let body = r#"[{"productId": "v4sLtEcMpzabRyfx", "qty": 2}]"#;
        let records = interpret_cart(StatusCode::OK, body).expect("valid cart");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_id, "v4sLtEcMpzabRyfx");
        assert_eq!(records[0].qty, 2);
    }

    #[test]
    fn unauthenticated_cart_access_surfaces_the_backend_message() {
        let body = r#"{"success": false, "message": "Protected route, Oauth2 Bearer token not found"}"#;
        let err = interpret_cart(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert_eq!(
            err.user_message(),
            "Protected route, Oauth2 Bearer token not found"
        );
    }

    #[test]
    fn upsert_body_uses_the_wire_field_names() {
        let body = UpsertBody {
            product_id: "upLK9JbQ4rMhTwt4",
            qty: 0,
        };
        let raw = serde_json::to_string(&body).expect("serialize body");
        assert_eq!(raw, r#"{"productId":"upLK9JbQ4rMhTwt4","qty":0}"#);
    }
}
