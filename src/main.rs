//! Shipway - Shipping Order Backend
//! Mission: Account management and shipping order tracking over HTTP

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shipway_backend::{
    auth::{JwtHandler, UserStore},
    config::Config,
    db::Database,
    mail::{LogMailer, Mailer, SmtpMailer},
    router::router,
    shipping::ShippingStore,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🚀 Shipway backend starting");

    let config = Config::from_env()?;
    info!("⚙️  Runtime posture: {:?}", config.mode);

    let db = Database::open(&config.database_path)?;
    let users = Arc::new(UserStore::new(db.clone()));
    let shipping = Arc::new(ShippingStore::new(db));
    let jwt = Arc::new(JwtHandler::new(config.jwt_secret.clone()));

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!("📧 SMTP relay configured: {}", smtp.host);
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            warn!("⚠️  SMTP not configured - recovery mail will only be logged");
            Arc::new(LogMailer)
        }
    };

    let port = config.port;
    let state = AppState {
        users,
        shipping,
        jwt,
        mailer,
        config: Arc::new(config),
    };

    let app = router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

/// Initialize tracing with enhanced observability
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipway_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate directory .env (common when running with
    // --manifest-path from elsewhere)
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}
