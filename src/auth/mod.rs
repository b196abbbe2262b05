//! Authentication Module
//! Mission: Secure API access with JWT session cookies and RBAC

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{authenticate, authenticate_optional, require_role};
pub use user_store::UserStore;
