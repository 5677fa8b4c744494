// API module
//
// This module contains the HTTP transport shim around the ledger engine

pub mod handlers;
pub mod routes;
pub mod schema;

// Re-export main components for easier access
pub use routes::configure_routes;
