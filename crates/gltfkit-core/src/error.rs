//! Unified error handling for gltfkit
//!
//! Packing and restructuring only fail on precondition violations by the
//! caller. Lookups of elements that were never added are not errors, they
//! return `None` from the query APIs instead.

use thiserror::Error;

/// Unified error type for all gltfkit operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Precondition Errors ====================

    /// A packing step was invoked before the graph copy was prepared
    #[error("prepare has not been called")]
    NotPrepared,

    /// A strategy getter was called before any model was processed
    #[error("no input processed yet")]
    NoInputProcessed,

    /// The same accessor was registered twice in one packing run
    #[error("Accessor {index} was already added to the buffer structure")]
    DuplicateAccessor {
        index: usize,
    },

    /// A buffer view was requested while no accessors were pending
    #[error("Cannot create buffer view '{prefix}': no pending accessors")]
    EmptyBufferView {
        prefix: String,
    },

    /// A buffer was requested while no buffer views were pending
    #[error("Cannot create buffer '{prefix}': no pending buffer views")]
    EmptyBuffer {
        prefix: String,
    },

    /// The builder was sealed with elements not yet committed to a buffer
    #[error("Cannot build buffer structure: {accessors} pending accessors, {buffer_views} pending buffer views")]
    UncommittedElements {
        accessors: usize,
        buffer_views: usize,
    },

    // ==================== Data Errors ====================

    /// An element handle does not belong to the model or structure
    #[error("Unknown {kind} {index}")]
    UnknownElement {
        kind: &'static str,
        index: usize,
    },

    /// Invalid data structure
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Create an unknown element error
    pub fn unknown(kind: &'static str, index: usize) -> Self {
        Error::UnknownElement { kind, index }
    }

    /// Check if this error was caused by calling an API out of order
    pub fn is_programmer_error(&self) -> bool {
        match self {
            Error::NotPrepared
            | Error::NoInputProcessed
            | Error::DuplicateAccessor { .. }
            | Error::EmptyBufferView { .. }
            | Error::EmptyBuffer { .. }
            | Error::UncommittedElements { .. } => true,
            Error::WithContext { source, .. } => source.is_programmer_error(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
