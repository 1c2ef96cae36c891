pub mod error;
pub mod ids;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use ids::CustomerId;
pub use structs::{Address, CommunicationPreferences, Customer, GardenProfile, Product, Purchase};
