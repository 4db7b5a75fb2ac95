//! HTTP and WebSocket surface for the scheduling web UI.
//!
//! REST routes are nested under `/api/`; the live slot stream is served at
//! `/ws/slots`. `scheduling_router()` returns a plain `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use router::scheduling_router;
pub use server::{start_server, ApiServer};
pub use types::ApiContext;
