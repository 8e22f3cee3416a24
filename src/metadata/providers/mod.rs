//! Concrete metadata lookup implementations.

pub mod http;

pub use http::HttpMetadataLookup;
