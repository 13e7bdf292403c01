//! Terminal front-end for Folio: upload PDFs, then ask questions about them
//! and watch the answer stream in.

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod state;

pub use config::Config;
pub use state::ClientState;
