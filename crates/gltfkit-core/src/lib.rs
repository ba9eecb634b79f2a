//! gltfkit Core Library
//!
//! This crate provides the error type, the shared glTF enumerations and the
//! tracing setup used by all gltfkit crates.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::types::*;
}
