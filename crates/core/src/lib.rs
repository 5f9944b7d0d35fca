#![warn(clippy::all, missing_docs)]

//! Core domain logic for the QKart terminal client.
//!
//! This crate hosts the data models, configuration handling,
//! backend REST client, cart reconciliation, session persistence,
//! and search debouncing used by the terminal UI and any future
//! frontends.

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod session;
pub mod validate;

pub use api::{ApiClient, SearchOutcome};
pub use cart::{CartOutcome, CartService};
pub use config::AppConfig;
pub use error::ApiError;
pub use models::{CartLineItem, CartRecord, Product, Session};
pub use session::SessionStore;
