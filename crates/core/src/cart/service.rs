//! Cart state owner: executes planned mutations and applies the
//! server-authoritative replacement policy.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{plan_add, reconcile, AddKind, CartAction};
use crate::{
    api::ApiClient,
    error::ApiError,
    models::{CartLineItem, CartRecord, Product},
};

/// Outcome of an attempted cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    /// The backend accepted the change and the local cart was replaced
    /// wholesale from its response.
    Updated,
    /// Rejected locally: no session token. No network call was made.
    MustAuthenticate,
    /// Rejected locally: plain add of an item already in the cart. No
    /// network call was made.
    Duplicate,
}

/// Owns the client-side cart state.
///
/// Every successful mutation replaces the whole record list from the
/// response payload; client and server cart state are never hand-merged.
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartService {
    api: ApiClient,
    records: Arc<RwLock<Vec<CartRecord>>>,
}

impl CartService {
    /// Create an empty cart backed by the given client.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of the current raw records.
    pub fn records(&self) -> Vec<CartRecord> {
        self.records.read().clone()
    }

    /// Display-ready line items for the current records, in record order.
    pub fn line_items(&self, products: &[Product]) -> Vec<CartLineItem> {
        reconcile(&self.records.read(), products)
    }

    /// Total cost of the cart against the given catalog.
    pub fn total_cost(&self, products: &[Product]) -> i64 {
        self.line_items(products)
            .iter()
            .map(CartLineItem::line_cost)
            .sum()
    }

    /// Replace local state from `GET /cart`. On failure the previous state
    /// is kept.
    pub async fn refresh(&self, token: &str) -> Result<(), ApiError> {
        let records = self.api.cart(token).await?;
        debug!(lines = records.len(), "cart refreshed from backend");
        *self.records.write() = records;
        Ok(())
    }

    /// Attempt an add or quantity set. Requests rejected locally (guest
    /// user, duplicate plain add) return an outcome without touching the
    /// network; a backend failure propagates as an error and leaves local
    /// state unchanged.
    pub async fn add(
        &self,
        token: Option<&str>,
        products: &[Product],
        product_id: &str,
        qty: u32,
        kind: AddKind,
    ) -> Result<CartOutcome, ApiError> {
        let items = self.line_items(products);
        match plan_add(token, &items, product_id, qty, kind) {
            CartAction::MustAuthenticate => Ok(CartOutcome::MustAuthenticate),
            CartAction::Duplicate => Ok(CartOutcome::Duplicate),
            CartAction::Upsert { product_id, qty } => {
                // plan_add only emits Upsert when a token is present.
                let token = token.unwrap_or_default();
                let records = self.api.upsert_cart(token, &product_id, qty).await?;
                debug!(lines = records.len(), "cart replaced from upsert response");
                *self.records.write() = records;
                Ok(CartOutcome::Updated)
            }
        }
    }

    /// Forget local cart state, e.g. on logout.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}
