//! Front ends that feed user turns into the companion.

pub mod cli;
pub mod http;

pub use cli::run_repl;
pub use http::chat_routes;
