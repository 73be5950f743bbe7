// Library root; exposes the crate for the binary and integration tests.
// The binary entry point is src/main.rs.

pub mod config;
pub mod error;
pub mod logger;
pub mod portfolio;
pub mod responder;
pub mod server;
