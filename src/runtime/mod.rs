//! Runtime adapters: the HTTP server and process signal handling.

pub mod http;
pub mod signal;

pub use http::{build_router, AppState};
pub use signal::shutdown_signal;
