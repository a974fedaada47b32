//! # Swiftgate Gateway
//!
//! HTTP gateway in front of Swift-compatible object storage.
//!
//! This crate provides:
//! - **Credential extraction**: pulls the forwarded backend token out of a bearer JWT
//! - **Orchestration**: argument validation, config resolution, backend calls
//! - **REST API**: configuration management, objects, containers, temp URLs
//! - **Rate Limiting**: per-project request throttling
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! └─────────────────────────┬───────────────────────────┘
//!                           │  Authorization: Bearer <jwt>
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  Swiftgate Gateway                   │
//! ├─────────────────────────────────────────────────────┤
//! │  Request ID │ Rate Limiter │ Handlers               │
//! ├─────────────────────────────────────────────────────┤
//! │  TokenExtractor │ Gateway │ SignedUrlIssuer         │
//! ├─────────────────────────────────────────────────────┤
//! │        swiftgate-client (ObjectStorageClient)        │
//! ├─────────────────────────────────────────────────────┤
//! │    swiftgate-core (ConfigResolver, ConfigStore)      │
//! └─────────────────────────┬───────────────────────────┘
//!                           │  X-Auth-Token
//! ┌─────────────────────────▼───────────────────────────┐
//! │              Swift-compatible object store           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;

pub use auth::{CredentialEnvelope, CredentialError, TokenExtractor};
pub use config::GatewayConfig;
pub use error::{ApiError, ErrorCode};
pub use gateway::Gateway;
pub use server::{build_app, run_server, run_server_with_shutdown, serve};
pub use state::AppState;
