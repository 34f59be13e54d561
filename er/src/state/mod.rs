//! Persisted run state
//!
//! A single JSON record describing the last fully completed cycle. The store
//! knows nothing about what a cycle is; it only loads, saves and deletes.

mod error;
mod store;

pub use error::StateError;
pub use store::{RunState, StateStore};
