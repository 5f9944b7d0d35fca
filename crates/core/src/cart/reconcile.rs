//! Pure cart logic: joining backend records against the catalog, and
//! deciding what an add-to-cart request should do before anything touches
//! the network.

use std::collections::HashMap;

use crate::models::{CartLineItem, CartRecord, Product};

/// Join raw cart records against the catalog, producing display-ready line
/// items in record order.
///
/// The product index is built once per call, so each record lookup is
/// constant time. A record whose product id is missing from the catalog is
/// silently dropped; the cart and catalog can briefly disagree after a
/// catalog change, and stale references must never produce a line item.
pub fn reconcile(records: &[CartRecord], products: &[Product]) -> Vec<CartLineItem> {
    let index: HashMap<&str, &Product> = products
        .iter()
        .map(|product| (product.id.as_str(), product))
        .collect();

    records
        .iter()
        .filter_map(|record| {
            index.get(record.product_id.as_str()).map(|product| CartLineItem {
                product: (*product).clone(),
                quantity: record.qty,
            })
        })
        .collect()
}

/// How an add-to-cart request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddKind {
    /// Plain add from a product card; an item already in the cart is
    /// rejected and the user is pointed at the quantity controls.
    Add,
    /// Explicit quantity set from the cart sidebar controls.
    SetQuantity,
}

/// Decision produced by [`plan_add`]. Only `Upsert` results in a network
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// No session token is present.
    MustAuthenticate,
    /// The product already has a line item and this was a plain add.
    Duplicate,
    /// Send `{productId, qty}` to the backend.
    Upsert {
        /// Product to create or update.
        product_id: String,
        /// New absolute quantity for the line.
        qty: u32,
    },
}

/// Decide what an add-to-cart request does, given the current line items.
pub fn plan_add(
    token: Option<&str>,
    items: &[CartLineItem],
    product_id: &str,
    qty: u32,
    kind: AddKind,
) -> CartAction {
    if token.map(str::trim).filter(|token| !token.is_empty()).is_none() {
        return CartAction::MustAuthenticate;
    }

    let already_in_cart = items.iter().any(|item| item.product.id == product_id);
    if already_in_cart && kind == AddKind::Add {
        return CartAction::Duplicate;
    }

    CartAction::Upsert {
        product_id: product_id.to_string(),
        qty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Misc".to_string(),
            cost: 100,
            rating: 4,
            image: String::new(),
        }
    }

    fn record(product_id: &str, qty: u32) -> CartRecord {
        CartRecord {
            product_id: product_id.to_string(),
            qty,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p1", "iPhone XR"),
            product("p2", "Basketball"),
            product("p3", "OnePlus 6"),
        ]
    }

    #[test]
    fn output_follows_record_order() {
        let records = vec![record("p3", 1), record("p1", 2)];
        let items = reconcile(&records, &catalog());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product.id, "p3");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].product.id, "p1");
        assert_eq!(items[1].quantity, 2);
    }

    #[test]
    fn stale_records_are_dropped_and_output_stays_within_the_catalog() {
        let records = vec![record("p2", 1), record("deleted", 5), record("p1", 1)];
        let products = catalog();
        let items = reconcile(&records, &products);

        // output ⊆ catalog and |output| ≤ |records|
        assert!(items.len() <= records.len());
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| products.iter().any(|p| p.id == item.product.id)));
    }

    #[test]
    fn reconciling_twice_yields_identical_output() {
        let records = vec![record("p1", 2), record("p2", 1)];
        let products = catalog();
        assert_eq!(reconcile(&records, &products), reconcile(&records, &products));
    }

    #[test]
    fn empty_inputs_reconcile_to_an_empty_cart() {
        assert!(reconcile(&[], &catalog()).is_empty());
        assert!(reconcile(&[record("p1", 1)], &[]).is_empty());
    }

    #[test]
    fn add_without_a_token_never_reaches_the_network() {
        let items = reconcile(&[record("p1", 1)], &catalog());
        assert_eq!(
            plan_add(None, &items, "p2", 1, AddKind::Add),
            CartAction::MustAuthenticate
        );
        assert_eq!(
            plan_add(Some("   "), &items, "p2", 1, AddKind::Add),
            CartAction::MustAuthenticate
        );
    }

    #[test]
    fn plain_add_of_an_existing_item_is_a_duplicate() {
        let items = reconcile(&[record("p1", 1)], &catalog());
        assert_eq!(
            plan_add(Some("token"), &items, "p1", 1, AddKind::Add),
            CartAction::Duplicate
        );
    }

    #[test]
    fn explicit_quantity_set_bypasses_the_duplicate_check() {
        let items = reconcile(&[record("p1", 1)], &catalog());
        assert_eq!(
            plan_add(Some("token"), &items, "p1", 3, AddKind::SetQuantity),
            CartAction::Upsert {
                product_id: "p1".to_string(),
                qty: 3,
            }
        );
    }

    #[test]
    fn adding_a_new_item_plans_an_upsert() {
        let items = reconcile(&[record("p1", 1)], &catalog());
        assert_eq!(
            plan_add(Some("token"), &items, "p2", 1, AddKind::Add),
            CartAction::Upsert {
                product_id: "p2".to_string(),
                qty: 1,
            }
        );
    }

    #[test]
    fn quantity_zero_still_plans_an_upsert_for_removal() {
        let items = reconcile(&[record("p1", 1)], &catalog());
        assert_eq!(
            plan_add(Some("token"), &items, "p1", 0, AddKind::SetQuantity),
            CartAction::Upsert {
                product_id: "p1".to_string(),
                qty: 0,
            }
        );
    }
}
