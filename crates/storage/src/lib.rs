//! Storage abstraction and implementations for ClimaCode.
//!
//! This crate provides a trait-based storage interface with a JSON file
//! backend for durable data and an in-memory backend for ephemeral sessions.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory_storage::MemoryStorage;
