//! Shared types and models for the Harvest Control platform
//!
//! This crate holds the harvest discount engine (humidity band lookup,
//! discount cascade and fleet summary) shared between the backend and the
//! browser (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
