//! Storage abstraction and implementations for Waypoint.
//!
//! This crate provides a two-tier key-value storage trait, an adapter that
//! applies the never-fail policy, and in-memory and JSON file backends.

#![warn(missing_docs)]

pub mod trait_;
pub mod adapter;
pub mod memory;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result, Tier};
pub use adapter::StorageAdapter;
pub use memory::MemoryStorage;
pub use json_storage::{JsonStorage, SessionDocument};
