//! HTTP client for kvscope
//!
//! This crate provides typed access to the key-value server's REST API:
//! database listing, paged key listing, and key get/set/delete.

mod client;
mod error;

pub use client::{KvClient, encode_key};
pub use error::ClientError;

// Re-export types that are used in our public API
pub use kvscope_types::{KeyPage, KeyValue};
