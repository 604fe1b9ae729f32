use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

mod components;
mod config;
mod controllers;
mod display;
mod errors;
mod filter;
mod htmx;
mod loader;
mod middleware;
mod models;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        spreadsheet = %config.spreadsheet_id,
        sheet = %config.sheet_name,
        "serving property sheet"
    );

    let sheets = loader::GoogleSheets::new(
        &config.sheets_endpoint,
        &config.spreadsheet_id,
        &config.sheet_name,
        config.credentials.clone(),
        config.fetch_timeout,
    )?;
    let state = models::AppState {
        loader: loader::Loader::new(sheets),
    };
    let app = routes::app(state);

    info!("listening on {}", config.bind);
    axum::Server::bind(&config.bind)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let log_json = env::var("PMS_LOG_JSON")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "could not listen for shutdown signal");
    }
    info!("shutting down");
}
