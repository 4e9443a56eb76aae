//! HTTP API for privasee question/answer records.
//!
//! This crate provides the public-facing API used by the frontend. It handles:
//!
//! - REST endpoints for record CRUD and bulk assignment
//! - The assignable user list, proxied from Auth0
//! - Request validation and error rendering
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Frontend                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTP
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    privasee-gateway                          │
//! │        ┌─────────────┐          ┌─────────────┐             │
//! │        │   Router    │          │  ApiError   │             │
//! │        │  + Handlers │          │  rendering  │             │
//! │        └─────────────┘          └─────────────┘             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                  ┌───────────┴───────────┐
//!                  ▼                       ▼
//!           ┌─────────────┐         ┌─────────────┐
//!           │ RecordStore │         │    User     │
//!           │ (Airtable)  │         │  Directory  │
//!           └─────────────┘         └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use privasee_gateway::{create_router, GatewayConfig, GatewayState};
//! use privasee_identity::StaticDirectory;
//! use privasee_store::{MemoryTable, TableRecordStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(TableRecordStore::new(Arc::new(MemoryTable::new())));
//! let directory = Arc::new(StaticDirectory::empty());
//!
//! let state = GatewayState::new(store, directory, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{Cli, ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;
