//! # Customer Service Database Crate
//!
//! This crate is the only place that knows the relational layout of the
//! customer store. It turns the flattened `customers` row and the normalized
//! purchase tables back into one nested `Customer`.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: open the SQLite pool and apply the embedded schema.
//! - `DbRepository::fetch_customer`: the tagged lookup (`CustomerLookup`).
//! - `mapping`: the column-to-field table used for reconstruction.
//! - `seed_sample_data`: loads the fixed sample data set.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod seed;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{CustomerLookup, DbPurchase, DbPurchaseItem, DbRepository};
pub use seed::{SAMPLE_CUSTOMER_ID, SeedSummary, seed_sample_data};
