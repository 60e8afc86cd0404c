use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use vendra_api::dispatch::{DEFAULT_QUEUE_CAPACITY, WelcomeDispatcher};
use vendra_api::notifier::{DEFAULT_FROM_EMAIL, DisabledNotifier, Notifier, ResendNotifier};
use vendra_api::rate_limit::{self, RateLimiter};
use vendra_api::signup::SignupWorkflow;
use vendra_api::store::WaitlistStore;
use vendra_api::waitlist::{self, AppState, AppStateInner};
use vendra_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vendra=debug,vendra_api=debug,vendra_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let db_path = std::env::var("VENDRA_DB_PATH").unwrap_or_else(|_| "vendra.db".into());
    let host = std::env::var("VENDRA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("VENDRA_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let sweep_secs: u64 = std::env::var("VENDRA_RATE_LIMIT_SWEEP_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);
    let resend_api_key = std::env::var("RESEND_API_KEY").unwrap_or_default();
    let from_email =
        std::env::var("RESEND_FROM_EMAIL").unwrap_or_else(|_| DEFAULT_FROM_EMAIL.into());

    // Init database
    let db = Database::open(&PathBuf::from(&db_path))?;
    let store: Arc<dyn WaitlistStore> = Arc::new(db);

    // Welcome email delivery
    let notifier: Arc<dyn Notifier> = if resend_api_key.is_empty() {
        warn!("RESEND_API_KEY not set, welcome emails are disabled");
        Arc::new(DisabledNotifier)
    } else {
        Arc::new(ResendNotifier::new(resend_api_key, from_email)?)
    };
    let welcome = WelcomeDispatcher::spawn(notifier, DEFAULT_QUEUE_CAPACITY);

    // Background sweep bounding the rate limit table
    let limiter = Arc::new(RateLimiter::new());
    tokio::spawn(rate_limit::run_sweep_loop(
        limiter.clone(),
        Duration::from_secs(sweep_secs.max(1)),
    ));

    let state: AppState = Arc::new(AppStateInner {
        signup: SignupWorkflow::new(limiter, store, welcome),
    });

    let app = Router::new()
        .merge(waitlist::routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Vendra waitlist listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
