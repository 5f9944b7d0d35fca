//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product available to buy, as served by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name (e.g. `iPhone XR`).
    pub name: String,
    /// Category the product belongs to.
    pub category: String,
    /// Price in wallet currency units.
    pub cost: i64,
    /// Aggregate rating, an integer out of five.
    pub rating: u8,
    /// URL of the product image.
    pub image: String,
}

/// Backend-persisted cart entry: a product reference plus a quantity.
///
/// One record exists per product per user; a quantity of zero removes the
/// record server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    /// Id of the referenced [`Product`].
    #[serde(rename = "productId")]
    pub product_id: String,
    /// Number of units in the cart.
    pub qty: u32,
}

/// Display-ready cart entry joining a [`CartRecord`] to full product data.
///
/// Line items only exist for products present in the catalog; records whose
/// product id has no match are dropped during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    /// Full product data for the line.
    pub product: Product,
    /// Number of units in the cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// Line total in wallet currency units.
    pub fn line_cost(&self) -> i64 {
        self.product.cost * i64::from(self.quantity)
    }
}

/// The authenticated user's token, username and wallet balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated API calls.
    pub token: String,
    /// Username the session belongs to.
    pub username: String,
    /// Wallet balance at login time.
    pub balance: i64,
    /// When the session was created locally.
    pub logged_in_at: DateTime<Utc>,
}
