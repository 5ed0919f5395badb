//! HTTP route handlers for the DermaLens server.

pub mod analysis;
pub mod auth;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
