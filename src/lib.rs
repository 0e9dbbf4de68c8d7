pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod mock;
pub mod tui;
