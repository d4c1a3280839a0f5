//! Export table
//!
//! The foreign runtime binds its property calls by name. The table pairs
//! each stable export name with the address of the matching `extern "C"`
//! function in [`ffi`](crate::ffi).

use crate::ffi;
use std::ffi::{c_char, c_void};

/// Host callback that receives one export at a time
pub type RegisterExportFn = unsafe extern "C" fn(name: *const c_char, function: *const c_void);

/// One named entry point
#[derive(Debug, Clone, Copy)]
pub struct ExportedFunction {
    /// NUL-terminated
    name: &'static str,
    function: *const c_void,
}

// Entries point at immutable code
unsafe impl Send for ExportedFunction {}
unsafe impl Sync for ExportedFunction {}

impl ExportedFunction {
    /// Export name
    pub fn name(&self) -> &'static str {
        let name = self.name;
        &name[..name.len() - 1]
    }

    /// Export name as a C string
    pub fn c_name(&self) -> *const c_char {
        self.name.as_ptr() as *const c_char
    }

    /// Function address
    pub fn function(&self) -> *const c_void {
        self.function
    }
}

macro_rules! export {
    ($name:literal => $function:path) => {
        ExportedFunction {
            name: concat!($name, "\0"),
            function: $function as *const c_void,
        }
    };
}

/// Every property function the bridge exposes
#[derive(Debug, Clone)]
pub struct ExportTable {
    entries: Vec<ExportedFunction>,
}

impl ExportTable {
    /// Build the full table
    pub fn new() -> Self {
        let entries = vec![
            export!("ResolvePropertyByName" => ffi::void_property_resolve_by_name),
            export!("GetOffsetByName" => ffi::void_property_offset_by_name),
            export!("GetArrayDimByName" => ffi::void_property_array_dim_by_name),
            export!("GetOffset" => ffi::void_property_offset),
            export!("GetSize" => ffi::void_property_size),
            export!("GetArrayDim" => ffi::void_property_array_dim),
            export!("InitializeValue" => ffi::void_property_initialize_value),
            export!("DestroyValue" => ffi::void_property_destroy_value),
            export!("DestroyValueInContainer" => ffi::void_property_destroy_value_in_container),
            export!("CopySingleValue" => ffi::void_property_copy_single_value),
            export!("Identical" => ffi::void_property_identical),
            export!("GetValueTypeHash" => ffi::void_property_value_type_hash),
            export!("HasAnyFlag" => ffi::void_property_has_any_flags),
            export!("HasAllFlags" => ffi::void_property_has_all_flags),
            export!("GetBooleanFieldMask" => ffi::void_property_bool_field_mask_by_name),
            export!("GetInnerFields" => ffi::void_property_inner_fields),
        ];
        Self { entries }
    }

    /// Number of exports
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all exports
    pub fn iter(&self) -> impl Iterator<Item = &ExportedFunction> {
        self.entries.iter()
    }

    /// Address of the export called `name`
    pub fn get(&self, name: &str) -> Option<*const c_void> {
        self.entries
            .iter()
            .find(|e| e.name() == name)
            .map(ExportedFunction::function)
    }

    /// Feed every export to `register`, returning how many were passed
    pub fn register_all(&self, mut register: impl FnMut(&ExportedFunction)) -> usize {
        for entry in &self.entries {
            log::debug!("Registering export '{}'", entry.name());
            register(entry);
        }
        self.entries.len()
    }

    /// Feed every export to a host callback
    ///
    /// # Safety
    /// `callback` must be safe to call with a NUL-terminated name and a
    /// function address.
    pub unsafe fn register_with(&self, callback: RegisterExportFn) -> usize {
        self.register_all(|entry| callback(entry.c_name(), entry.function()))
    }
}

impl Default for ExportTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::ffi::CStr;

    #[test]
    fn test_names_are_unique_and_nul_terminated() {
        let table = ExportTable::new();
        assert_eq!(table.len(), 16);

        let mut seen = HashSet::new();
        for entry in table.iter() {
            assert!(seen.insert(entry.name()), "duplicate export {}", entry.name());
            let c_name = unsafe { CStr::from_ptr(entry.c_name()) };
            assert_eq!(c_name.to_str().unwrap(), entry.name());
            assert!(!entry.function().is_null());
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let table = ExportTable::new();
        let offset = table.get("GetOffset").unwrap();
        assert_eq!(offset, ffi::void_property_offset as *const c_void);
        assert!(table.get("GetOffset\0").is_none());
        assert!(table.get("getoffset").is_none());
    }

    #[test]
    fn test_register_all_visits_every_entry() {
        let table = ExportTable::new();
        let mut names = Vec::new();
        let count = table.register_all(|entry| names.push(entry.name()));
        assert_eq!(count, table.len());
        assert_eq!(names.first(), Some(&"ResolvePropertyByName"));
        assert_eq!(names.last(), Some(&"GetInnerFields"));
    }
}
