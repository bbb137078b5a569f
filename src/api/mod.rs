//! HTTP API for the weather dashboard

pub mod error;
pub mod protocol;
pub mod routes;
pub mod server;

pub use server::ApiServer;
