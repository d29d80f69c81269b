//! Error types for the core crate.

use thiserror::Error;

/// Errors produced by [`Property`](crate::Property) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The property's validator refused the value.
    #[error("value rejected by property '{name}'")]
    Rejected {
        /// Name of the property that rejected the value.
        name: String,
    },
}

/// A specialized Result type for property operations.
pub type PropertyResult<T> = std::result::Result<T, PropertyError>;
