//! Session persistence and the authentication flows.

mod store;

pub use store::SessionStore;
