//! Name-based property lookups
//!
//! Each lookup resolves the property and then reads one descriptor field,
//! so the result always matches querying the resolved property directly.
//! A missing property becomes a sentinel instead of an error.

use std::ffi::CStr;
use void_reflect::{Property, TypeDescriptor};

/// Offset, size and dimension sentinel for a missing property
pub const NOT_FOUND: i32 = -1;

/// Field mask sentinel for a missing or non-boolean property
pub const NO_FIELD_MASK: u8 = 0;

/// Find `name` on `ty` or its ancestors
///
/// Names that are not valid UTF-8 never match.
pub fn resolve_property<'a>(ty: &'a TypeDescriptor, name: &CStr) -> Option<&'a Property> {
    let name = name.to_str().ok()?;
    ty.find_property(name)
}

/// Byte offset of `name`, or [`NOT_FOUND`]
pub fn offset_by_name(ty: &TypeDescriptor, name: &CStr) -> i32 {
    resolve_property(ty, name).map_or(NOT_FOUND, |p| to_i32(p.offset()))
}

/// Array dimension of `name`, or [`NOT_FOUND`]
pub fn array_dim_by_name(ty: &TypeDescriptor, name: &CStr) -> i32 {
    resolve_property(ty, name).map_or(NOT_FOUND, |p| to_i32(p.array_dim()))
}

/// Field mask of boolean `name`, or [`NO_FIELD_MASK`]
pub fn bool_field_mask_by_name(ty: &TypeDescriptor, name: &CStr) -> u8 {
    resolve_property(ty, name)
        .and_then(Property::field_mask)
        .unwrap_or(NO_FIELD_MASK)
}

/// Layout values fit in `i32`; the builder rejects larger types
#[inline]
pub(crate) fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_reflect::prelude::*;

    fn player_state() -> TypeDescriptor {
        TypeBuilder::new("PlayerState")
            .field("Owner", PropertyKind::Object)
            .field("Health", PropertyKind::Int32)
            .property(PropertySpec::new("Ammo", PropertyKind::Int16).array_dim(4))
            .bitfield("bIsAlive")
            .bitfield("bIsReady")
            .field("bNative", PropertyKind::native_bool())
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookups_match_descriptor() {
        let ty = player_state();
        for property in ty.properties() {
            let name = std::ffi::CString::new(property.name()).unwrap();
            let resolved = resolve_property(&ty, &name).unwrap();
            assert!(std::ptr::eq(resolved, property));
            assert_eq!(offset_by_name(&ty, &name), property.offset() as i32);
            assert_eq!(array_dim_by_name(&ty, &name), property.array_dim() as i32);
        }
    }

    #[test]
    fn test_missing_names_give_sentinels() {
        let ty = player_state();
        assert!(resolve_property(&ty, c"Score").is_none());
        assert_eq!(offset_by_name(&ty, c"Score"), NOT_FOUND);
        assert_eq!(array_dim_by_name(&ty, c"Score"), NOT_FOUND);
        assert_eq!(bool_field_mask_by_name(&ty, c"Score"), NO_FIELD_MASK);
        assert_eq!(offset_by_name(&ty, c"health"), NOT_FOUND);
    }

    #[test]
    fn test_non_utf8_name_is_not_found() {
        let ty = player_state();
        let name = CStr::from_bytes_with_nul(b"Health\xff\0").unwrap();
        assert_eq!(offset_by_name(&ty, name), NOT_FOUND);
    }

    #[test]
    fn test_bool_masks() {
        let ty = player_state();
        let alive = bool_field_mask_by_name(&ty, c"bIsAlive");
        let ready = bool_field_mask_by_name(&ty, c"bIsReady");
        assert_ne!(alive, 0);
        assert_ne!(ready, 0);
        assert_eq!(alive & ready, 0);
        assert_eq!(bool_field_mask_by_name(&ty, c"bNative"), 0xFF);
        assert_eq!(bool_field_mask_by_name(&ty, c"Health"), NO_FIELD_MASK);
    }
}
