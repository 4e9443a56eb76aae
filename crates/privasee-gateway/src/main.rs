//! Privasee Gateway - records API server.
//!
//! This is the main entry point for the gateway service.
//!
//! # Storage
//!
//! Records are kept in Airtable (`AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`).
//! Pass `--in-memory` (or set `IN_MEMORY=true`) to keep them in process
//! memory instead, for local development.
//!
//! # Users
//!
//! Set `AUTH0_DOMAIN` and `AUTH0_API_ACCESS_TOKEN` to serve the Auth0 user
//! list at `/api/users`. Without them the list is empty.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use privasee_gateway::{create_router, Cli, GatewayState};
use privasee_identity::{Auth0Directory, StaticDirectory, UserDirectory};
use privasee_store::{AirtableTable, MemoryTable, Table, TableRecordStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,privasee=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Privasee Gateway");

    let gateway_config = cli.gateway_config();
    let airtable_config = cli.airtable_config()?;
    let auth0_config = cli.auth0_config();

    tracing::info!(
        listen_addr = %gateway_config.listen_addr,
        cors_origins = ?gateway_config.cors_origins,
        airtable = ?airtable_config,
        auth0 = ?auth0_config,
        "Gateway configuration loaded"
    );

    // Initialize record table
    let table: Arc<dyn Table> = if let Some(config) = airtable_config {
        tracing::info!(base_id = %config.base_id, table = %config.table, "Using Airtable store");
        Arc::new(AirtableTable::new(&config)?)
    } else {
        tracing::warn!("IN-MEMORY MODE - records are lost on exit");
        Arc::new(MemoryTable::new())
    };
    let store = Arc::new(TableRecordStore::new(table));

    // Initialize user directory
    let directory: Arc<dyn UserDirectory> = if let Some(config) = auth0_config {
        tracing::info!(domain = %config.domain, "Auth0 user directory enabled");
        Arc::new(Auth0Directory::new(config)?)
    } else {
        tracing::warn!("No AUTH0_DOMAIN/AUTH0_API_ACCESS_TOKEN set - user list will be empty");
        Arc::new(StaticDirectory::empty())
    };

    let listen_addr = gateway_config.listen_addr.clone();
    let state = GatewayState::new(store, directory, gateway_config);

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
