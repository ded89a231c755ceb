//! # Graph Gateway
//!
//! An HTTP gateway in front of an OAuth2-protected Graph-style REST API.
//! It acquires bearer tokens via the client-credentials grant, walks
//! cursor-paginated entity collections, resolves SharePoint-style file
//! references through a chain of dependent lookups, and streams results
//! back to callers as incrementally encoded JSON arrays.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐      ┌─────────────────┐      ┌─────────────────┐
//! │  Caller  │─────►│  Graph Gateway  │─────►│  Graph API      │
//! │          │◄─────│  (this crate)   │◄─────│  (OAuth2/cursor)│
//! └──────────┘ JSON └─────────────────┘ HTTP └─────────────────┘
//! ```
//!
//! ## Endpoints
//!
//! - `GET/POST /entities/{*path}` - Streams all pages of a remote collection
//! - `POST /siteurl` - Resolves root sites for a posted batch of entities
//! - `GET /file/{*path}` - Resolves and proxies a SharePoint file download
//! - `GET /health` - Health check endpoint
//!
//! ## Streaming
//!
//! Collections of unbounded size are never buffered: entities are yielded
//! page by page and encoded into the response body incrementally. A failure
//! after the response status is committed truncates the JSON array, which
//! clients must treat as a failed request.

pub mod auth;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod path;
pub mod resolve;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use server::GatewayServer;
pub use state::AppState;
