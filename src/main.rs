//! Entry point: load config, wire dependencies, and run the server.

use formcms::auth::JwtSecret;
use formcms::config::Config;
use formcms::db;
use formcms::{create_app, AppState};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    if config.run_migrations {
        db::run_migrations(&db_pool).await?;
        tracing::info!("migrations applied");
    }

    let jwt_secret = JwtSecret::new(config.jwt_secret.clone(), config.jwt_ttl_hours);
    let state = AppState::new(db_pool, jwt_secret);

    let mut app = create_app(state);
    if config.cors_allow_any {
        app = app.layer(CorsLayer::permissive());
    }

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
