//! CLI command implementations.

pub mod common;
pub mod config;
pub mod info;
pub mod process;
pub mod spectrum;
