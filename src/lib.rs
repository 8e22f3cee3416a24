//! vlib - personal video catalog with a range-aware streaming server
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod library;
pub mod metadata;
pub mod scanner;
pub mod server;
pub mod streaming;

pub use library::Library;
