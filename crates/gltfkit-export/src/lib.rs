//! gltfkit-export
//!
//! Turns a packed model into what is written to disk:
//! - [`gltf`]: glTF 1.0 and 2.0 records
//! - [`data`]: the bytes of every buffer
//! - [`json`]: JSON serialization of the records

pub mod data;
pub mod gltf;
pub mod json;

pub use data::{assemble_buffers, extract_accessor_data};
pub use gltf::{Document, GltfCreatorV1, GltfCreatorV2};
pub use json::{to_json_string, write_json};

use thiserror::Error;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] gltfkit_core::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
