//! Async client and domain store for a landlord (property-management) API.
//!
//! The crate mirrors server-owned collections — realms, tenants, properties,
//! leases, rents, templates — in per-collection stores, and carries the pure
//! derivation logic the pages need: rent balance computation, notice status,
//! diacritic-insensitive search filtering, and settlement payload
//! normalization.

pub mod api;
pub mod config;
pub mod error;
pub mod schemas;
pub mod services;
pub mod store;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use store::Store;
