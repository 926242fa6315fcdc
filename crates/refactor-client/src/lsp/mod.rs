pub mod client;
pub mod config;
pub mod protocol;

pub use client::LspClient;
pub use config::LspConfig;
pub use protocol::*;
