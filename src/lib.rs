//! Shipway Backend Library
//!
//! Exposes core modules for use by the server binary and tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod middleware;
pub mod router;
pub mod shipping;
pub mod state;
pub mod validate;
