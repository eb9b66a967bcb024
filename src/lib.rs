//! smnview library
//!
//! Fetching, caching, refreshing and presenting SMN Argentina station data.
//! The binary in `main.rs` wires these modules to the command line.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod refresh;
pub mod server;
pub mod ui;
pub mod view;

#[cfg(test)]
mod test_support;

pub use error::{AppError, Result};
