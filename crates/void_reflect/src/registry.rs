//! Type registry
//!
//! Owns every loaded [`TypeDescriptor`]. Descriptors are shared through
//! `Arc`, so handles derived from one stay valid until the type is
//! unregistered and the last `Arc` is dropped.

use crate::descriptor::TypeDescriptor;
use crate::error::{ReflectError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of loaded types, keyed by name
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Register a built type
    pub fn register(&self, ty: TypeDescriptor) -> Result<Arc<TypeDescriptor>> {
        let mut types = self.types.write();
        if types.contains_key(ty.name()) {
            log::warn!("Type '{}' is already registered", ty.name());
            return Err(ReflectError::TypeAlreadyRegistered(ty.name().to_string()));
        }

        log::debug!(
            "Registered type '{}' ({} bytes, {} properties)",
            ty.name(),
            ty.size(),
            ty.properties().len()
        );

        let ty = Arc::new(ty);
        types.insert(ty.name().to_string(), ty.clone());
        Ok(ty)
    }

    /// Remove a type; outstanding `Arc`s keep it alive
    pub fn unregister(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        let removed = self
            .types
            .write()
            .remove(name)
            .ok_or_else(|| ReflectError::TypeNotFound(name.to_string()))?;
        log::debug!("Unregistered type '{}'", name);
        Ok(removed)
    }

    /// Get a type by name
    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(name).cloned()
    }

    /// Check if a type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Names of all registered types
    pub fn type_names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.read().len())
            .finish()
    }
}
