//! Shared Application State
//! Mission: Hand every handler the stores, token service, mailer and config

use crate::auth::jwt::JwtHandler;
use crate::auth::user_store::UserStore;
use crate::config::Config;
use crate::mail::Mailer;
use crate::shipping::store::ShippingStore;
use std::sync::Arc;

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub shipping: Arc<ShippingStore>,
    pub jwt: Arc<JwtHandler>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}
