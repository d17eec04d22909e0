//! dining-orders server binary.
//!
//! Loads configuration, connects to PostgreSQL, wires the adapters into the
//! axum application and serves until Ctrl-C or SIGTERM.

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dining_orders::adapters::auth::JwtSessionValidator;
use dining_orders::adapters::http::{build_app, AppState, HttpSettings};
use dining_orders::adapters::postgres::{
    self, PostgresOrderRepository, PostgresPaymentRepository,
};
use dining_orders::adapters::stripe::StripePaymentAdapter;
use dining_orders::config::AppConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "Starting dining-orders"
    );

    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Stripe calls must finish inside the request deadline.
    let stripe_client = reqwest::Client::builder()
        .timeout(config.server.request_timeout())
        .build()?;

    let state = AppState::new(
        Arc::new(PostgresOrderRepository::new(pool.clone())),
        Arc::new(PostgresPaymentRepository::new(pool)),
        Arc::new(StripePaymentAdapter::with_client(
            config.payment.stripe_config(),
            stripe_client,
        )),
    )
    .with_websocket_settings(config.websocket.settings());

    let validator = Arc::new(JwtSessionValidator::new(config.auth.jwt_config()));

    let settings = HttpSettings {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = build_app(state, validator, &settings);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured filter when set.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
