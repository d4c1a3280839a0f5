//! Error types for the reflection type system
//!
//! Only type construction and registration can fail. Value operations on a
//! built descriptor have no error path.

use thiserror::Error;

/// Result type for reflection operations
pub type Result<T> = std::result::Result<T, ReflectError>;

/// Errors raised while building or registering type descriptors
#[derive(Debug, Error)]
pub enum ReflectError {
    /// Two properties with the same name on one type (or shadowing an inherited one)
    #[error("Property '{property}' is declared more than once on '{type_name}'")]
    DuplicateProperty {
        type_name: String,
        property: String,
    },

    /// Array dimension must be at least 1
    #[error("Property '{property}' on '{type_name}' has array dimension 0")]
    ZeroArrayDim {
        type_name: String,
        property: String,
    },

    /// Bitfield booleans cannot form fixed arrays
    #[error("Bitfield '{property}' on '{type_name}' cannot have array dimension {array_dim}")]
    BitfieldArray {
        type_name: String,
        property: String,
        array_dim: usize,
    },

    /// Explicit offset does not satisfy the property's alignment
    #[error("Property '{property}' on '{type_name}' at offset {offset} is not aligned to {align}")]
    Misaligned {
        type_name: String,
        property: String,
        offset: usize,
        align: usize,
    },

    /// Explicit offset collides with another property or the inherited layout
    #[error("Property '{property}' on '{type_name}' overlaps '{other}'")]
    Overlapping {
        type_name: String,
        property: String,
        other: String,
    },

    /// A shared bitfield byte has no free bit left
    #[error("No free bit left at offset {offset} for bitfield '{property}' on '{type_name}'")]
    BitfieldByteFull {
        type_name: String,
        property: String,
        offset: usize,
    },

    /// Boolean declared with an empty field mask
    #[error("Boolean '{property}' on '{type_name}' has an empty field mask")]
    ZeroFieldMask {
        type_name: String,
        property: String,
    },

    /// Layout exceeds what the 32-bit export surface can address
    #[error("Type '{0}' is too large to be described")]
    TypeTooLarge(String),

    /// Type name already present in the registry
    #[error("Type '{0}' is already registered")]
    TypeAlreadyRegistered(String),

    /// Type name missing from the registry
    #[error("Type '{0}' is not registered")]
    TypeNotFound(String),
}

impl ReflectError {
    /// Create a duplicate property error
    pub fn duplicate_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        ReflectError::DuplicateProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Create an overlapping property error
    pub fn overlapping(
        type_name: impl Into<String>,
        property: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        ReflectError::Overlapping {
            type_name: type_name.into(),
            property: property.into(),
            other: other.into(),
        }
    }
}
