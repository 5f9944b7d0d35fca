//! Cart reconciliation and mutation planning.

mod reconcile;
mod service;

pub use reconcile::{plan_add, reconcile, AddKind, CartAction};
pub use service::{CartOutcome, CartService};
