//! # void_property_bridge - Property Export Surface
//!
//! Exposes [`void_reflect`] property descriptors to a foreign managed
//! runtime over the C ABI. The runtime binds each entry of the
//! [`ExportTable`] by name and then drives lookups and value operations
//! (initialize, destroy, copy, compare, hash) through raw handles and
//! addresses.
//!
//! ## Lifecycle
//!
//! ```text
//! void_bridge_init(path) ──▶ BridgeConfig::load ──▶ env_logger, tracing
//!         │
//!         ▼
//! void_bridge_register_exports(cb) ──▶ cb("GetOffset", fn) ...
//!         │
//!         ▼
//! void_bridge_shutdown()
//! ```
//!
//! ## Example
//!
//! ```
//! use void_property_bridge::prelude::*;
//! use void_reflect::prelude::*;
//!
//! let player = TypeBuilder::new("PlayerState")
//!     .field("Owner", PropertyKind::Object)
//!     .field("Health", PropertyKind::Int32)
//!     .build()
//!     .unwrap();
//!
//! let ty = TypeHandle::from_ref(&player);
//! let offset = unsafe { void_property_offset_by_name(ty, c"Health".as_ptr()) };
//! assert_eq!(offset, 8);
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod exports;
pub mod ffi;
pub mod resolver;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use exports::{ExportTable, ExportedFunction, RegisterExportFn};
pub use ffi::{PropertyHandle, TypeHandle};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bridge::{
        self, void_bridge_get_export, void_bridge_init, void_bridge_register_exports,
        void_bridge_shutdown, Bridge,
    };
    pub use crate::config::BridgeConfig;
    pub use crate::error::{BridgeError, Result};
    pub use crate::exports::{ExportTable, ExportedFunction};
    pub use crate::ffi::*;
    pub use crate::resolver::{NOT_FOUND, NO_FIELD_MASK};
}
