//! doorgate HTTP service: registration, login and the token-gated door

pub mod config;
pub mod door;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use config::{LogFormat, ServerConfig};
pub use handlers::handle_request;
pub use server::DoorgateServer;
pub use state::AppState;
