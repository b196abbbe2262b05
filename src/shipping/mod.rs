//! Shipping Module
//! Mission: Shipping order records and their API surface

pub mod api;
pub mod models;
pub mod store;

pub use store::ShippingStore;
