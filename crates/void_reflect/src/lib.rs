//! # void_reflect - Runtime Type Descriptors
//!
//! Describes the memory layout of native structs and classes at runtime so
//! code that has never seen their Rust or C++ definitions can still find,
//! construct, copy, compare, hash and destroy their fields.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │   TypeBuilder   │────▶│ TypeDescriptor  │──┐ super_type
//! │ (layout pass)   │     │ (immutable)     │◀─┘
//! └─────────────────┘     └────────┬────────┘
//!                                  │ owns
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  PropertyKind   │◀────│    Property     │
//! │ (closed set)    │     │ offset/size/dim │
//! └────────┬────────┘     └────────┬────────┘
//!          │ selects               │ raw addresses
//!          ▼                       ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │ PropertyVTable  │────▶│  caller memory  │
//! │ init/destroy/.. │     │  (ValueBuffer)  │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use void_reflect::prelude::*;
//!
//! let player = TypeBuilder::new("PlayerState")
//!     .field("Owner", PropertyKind::Object)
//!     .field("Health", PropertyKind::Int32)
//!     .bitfield("bIsAlive")
//!     .bitfield("bIsReady")
//!     .build()
//!     .unwrap();
//!
//! let health = player.find_property("Health").unwrap();
//! assert_eq!(health.offset(), 8);
//!
//! let mut instance = ValueBuffer::for_type(&player);
//! unsafe {
//!     health.initialize_value_in_container(instance.as_mut_ptr());
//!     let alive = player.find_property("bIsAlive").unwrap();
//!     alive.set_bool(instance.as_mut_ptr().add(alive.offset()), true);
//! }
//! ```

pub mod builder;
pub mod buffer;
pub mod containers;
pub mod descriptor;
pub mod error;
pub mod flags;
pub mod hash;
pub mod kind;
pub mod property;
pub mod registry;
pub mod script_array;
pub mod vtable;

pub use builder::{PropertySpec, TypeBuilder};
pub use buffer::ValueBuffer;
pub use containers::{ArrayView, MapView};
pub use descriptor::TypeDescriptor;
pub use error::{ReflectError, Result};
pub use flags::PropertyFlags;
pub use kind::{MapLayout, PropertyKind, NATIVE_BOOL_MASK};
pub use property::Property;
pub use registry::TypeRegistry;
pub use script_array::ScriptArray;
pub use vtable::PropertyVTable;

/// Align a value up to the given alignment
#[inline]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::builder::{PropertySpec, TypeBuilder};
    pub use crate::buffer::ValueBuffer;
    pub use crate::containers::{ArrayView, MapView};
    pub use crate::descriptor::TypeDescriptor;
    pub use crate::error::{ReflectError, Result};
    pub use crate::flags::PropertyFlags;
    pub use crate::kind::PropertyKind;
    pub use crate::property::Property;
    pub use crate::registry::TypeRegistry;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(13, 4), 16);
    }
}
