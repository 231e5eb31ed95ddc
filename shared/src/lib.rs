//! Shared types and models for the olive grove records
//!
//! This crate contains the grid map loader, the domain models and the basic
//! validations shared between the backend and the browser (via WASM).

pub mod grid;
pub mod models;
pub mod types;
pub mod validation;

pub use grid::*;
pub use models::*;
pub use types::*;
pub use validation::*;
