//! C ABI property functions
//!
//! Every function here is handed to the foreign runtime through the
//! [`ExportTable`](crate::ExportTable). Handles are plain pointers to
//! descriptors owned by a [`TypeRegistry`](void_reflect::TypeRegistry) and
//! addresses are raw value memory; none of them are checked beyond what the
//! `# Safety` sections state.

use crate::resolver::{self, to_i32, NOT_FOUND, NO_FIELD_MASK};
use std::ffi::{c_char, CStr};
use std::sync::atomic::{AtomicBool, Ordering};
use void_reflect::{Property, PropertyFlags, TypeDescriptor};

static TRACE_CALLS: AtomicBool = AtomicBool::new(false);

/// Enable or disable per-call tracing
pub(crate) fn set_trace_calls(enabled: bool) {
    TRACE_CALLS.store(enabled, Ordering::Relaxed);
}

macro_rules! trace_call {
    ($export:literal, $($arg:tt)*) => {
        if TRACE_CALLS.load(Ordering::Relaxed) {
            log::trace!("{}: {}", $export, format_args!($($arg)*));
        }
    };
}

/// Opaque handle to a type descriptor
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle(*const TypeDescriptor);

impl TypeHandle {
    /// Create a null handle
    pub const fn null() -> Self {
        Self(std::ptr::null())
    }

    /// Handle to a live descriptor
    pub fn from_ref(ty: &TypeDescriptor) -> Self {
        Self(ty)
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// # Safety
    /// A non-null handle must point to a live descriptor.
    unsafe fn get<'a>(self) -> Option<&'a TypeDescriptor> {
        self.0.as_ref()
    }
}

/// Opaque handle to a property descriptor
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyHandle(*const Property);

impl PropertyHandle {
    /// Create a null handle
    pub const fn null() -> Self {
        Self(std::ptr::null())
    }

    /// Handle to a live property
    pub fn from_ref(property: &Property) -> Self {
        Self(property)
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Borrow the property
    ///
    /// # Safety
    /// The handle must point to a live property.
    pub unsafe fn as_property<'a>(self) -> &'a Property {
        &*self.0
    }
}

// Descriptors are immutable once built
unsafe impl Send for TypeHandle {}
unsafe impl Sync for TypeHandle {}
unsafe impl Send for PropertyHandle {}
unsafe impl Sync for PropertyHandle {}

/// Resolve type and name, treating a null type or name as not found
unsafe fn lookup<'a>(
    ty: TypeHandle,
    name: *const c_char,
) -> Option<(&'a TypeDescriptor, &'a CStr)> {
    if name.is_null() {
        return None;
    }
    Some((ty.get()?, CStr::from_ptr(name)))
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a property by name on a type or its ancestors
///
/// Returns a null handle if not found.
///
/// # Safety
/// `ty` must be null or a live type handle; `name` must be null or a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn void_property_resolve_by_name(
    ty: TypeHandle,
    name: *const c_char,
) -> PropertyHandle {
    let Some((ty, name)) = lookup(ty, name) else {
        return PropertyHandle::null();
    };
    trace_call!("ResolvePropertyByName", "{}.{:?}", ty.name(), name);
    resolver::resolve_property(ty, name).map_or(PropertyHandle::null(), PropertyHandle::from_ref)
}

/// Byte offset of a named property, or -1
///
/// # Safety
/// Same as [`void_property_resolve_by_name`].
#[no_mangle]
pub unsafe extern "C" fn void_property_offset_by_name(ty: TypeHandle, name: *const c_char) -> i32 {
    let Some((ty, name)) = lookup(ty, name) else {
        return NOT_FOUND;
    };
    trace_call!("GetOffsetByName", "{}.{:?}", ty.name(), name);
    resolver::offset_by_name(ty, name)
}

/// Array dimension of a named property, or -1
///
/// # Safety
/// Same as [`void_property_resolve_by_name`].
#[no_mangle]
pub unsafe extern "C" fn void_property_array_dim_by_name(
    ty: TypeHandle,
    name: *const c_char,
) -> i32 {
    let Some((ty, name)) = lookup(ty, name) else {
        return NOT_FOUND;
    };
    trace_call!("GetArrayDimByName", "{}.{:?}", ty.name(), name);
    resolver::array_dim_by_name(ty, name)
}

/// Field mask of a named boolean property, or 0
///
/// # Safety
/// Same as [`void_property_resolve_by_name`].
#[no_mangle]
pub unsafe extern "C" fn void_property_bool_field_mask_by_name(
    ty: TypeHandle,
    name: *const c_char,
) -> u8 {
    let Some((ty, name)) = lookup(ty, name) else {
        return NO_FIELD_MASK;
    };
    trace_call!("GetBooleanFieldMask", "{}.{:?}", ty.name(), name);
    resolver::bool_field_mask_by_name(ty, name)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Byte offset of a property within its container
///
/// # Safety
/// `property` must be a live property handle.
#[no_mangle]
pub unsafe extern "C" fn void_property_offset(property: PropertyHandle) -> i32 {
    let property = property.as_property();
    trace_call!("GetOffset", "{}", property.name());
    to_i32(property.offset())
}

/// Size of one element of a property
///
/// # Safety
/// `property` must be a live property handle.
#[no_mangle]
pub unsafe extern "C" fn void_property_size(property: PropertyHandle) -> i32 {
    let property = property.as_property();
    trace_call!("GetSize", "{}", property.name());
    to_i32(property.element_size())
}

/// Number of consecutive elements of a property
///
/// # Safety
/// `property` must be a live property handle.
#[no_mangle]
pub unsafe extern "C" fn void_property_array_dim(property: PropertyHandle) -> i32 {
    let property = property.as_property();
    trace_call!("GetArrayDim", "{}", property.name());
    to_i32(property.array_dim())
}

/// Write the sub-properties of a struct, array or map property into `out`
///
/// At most `capacity` handles are written. Returns the total number of
/// inner fields, so a caller can size its buffer with a first call passing
/// a null `out`.
///
/// # Safety
/// `property` must be a live property handle; `out` must be null or valid
/// for `capacity` writes.
#[no_mangle]
pub unsafe extern "C" fn void_property_inner_fields(
    property: PropertyHandle,
    out: *mut PropertyHandle,
    capacity: i32,
) -> i32 {
    let property = property.as_property();
    trace_call!("GetInnerFields", "{}", property.name());
    let fields = property.inner_fields();
    if !out.is_null() {
        let capacity = usize::try_from(capacity).unwrap_or(0);
        for (i, field) in fields.iter().take(capacity).enumerate() {
            out.add(i).write(PropertyHandle::from_ref(field));
        }
    }
    to_i32(fields.len())
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Construct default values for every element at `dest`
///
/// # Safety
/// `property` must be a live property handle; `dest` must be writable,
/// aligned storage for all elements and hold no live value.
#[no_mangle]
pub unsafe extern "C" fn void_property_initialize_value(property: PropertyHandle, dest: *mut u8) {
    let property = property.as_property();
    trace_call!("InitializeValue", "{} at {:p}", property.name(), dest);
    property.initialize_value(dest);
}

/// Destroy every element at `dest`
///
/// # Safety
/// `property` must be a live property handle; `dest` must hold live
/// values of it, which are dead afterwards.
#[no_mangle]
pub unsafe extern "C" fn void_property_destroy_value(property: PropertyHandle, dest: *mut u8) {
    let property = property.as_property();
    trace_call!("DestroyValue", "{} at {:p}", property.name(), dest);
    property.destroy_value(dest);
}

/// Destroy the property's elements inside the container at `container`
///
/// # Safety
/// As [`void_property_destroy_value`], with `container` the start of an
/// instance of the owning type.
#[no_mangle]
pub unsafe extern "C" fn void_property_destroy_value_in_container(
    property: PropertyHandle,
    container: *mut u8,
) {
    let property = property.as_property();
    trace_call!("DestroyValueInContainer", "{} in {:p}", property.name(), container);
    property.destroy_value_in_container(container);
}

/// Copy one element from `src` over the live element at `dest`
///
/// # Safety
/// `property` must be a live property handle; `dest` and `src` must both
/// hold live values of it.
#[no_mangle]
pub unsafe extern "C" fn void_property_copy_single_value(
    property: PropertyHandle,
    dest: *mut u8,
    src: *const u8,
) {
    let property = property.as_property();
    trace_call!("CopySingleValue", "{} {:p} <- {:p}", property.name(), dest, src);
    property.copy_single_value(dest, src);
}

/// Value equality of one element at `a` and `b`
///
/// # Safety
/// `property` must be a live property handle; `a` and `b` must hold live
/// values of it.
#[no_mangle]
pub unsafe extern "C" fn void_property_identical(
    property: PropertyHandle,
    a: *const u8,
    b: *const u8,
) -> bool {
    let property = property.as_property();
    trace_call!("Identical", "{} {:p} == {:p}", property.name(), a, b);
    property.identical(a, b)
}

/// Hash of one element at `src`
///
/// # Safety
/// `property` must be a live property handle; `src` must hold a live value.
#[no_mangle]
pub unsafe extern "C" fn void_property_value_type_hash(
    property: PropertyHandle,
    src: *const u8,
) -> u32 {
    let property = property.as_property();
    trace_call!("GetValueTypeHash", "{} at {:p}", property.name(), src);
    property.value_type_hash(src)
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// True if any bit of `mask` is set on the property
///
/// # Safety
/// `property` must be a live property handle.
#[no_mangle]
pub unsafe extern "C" fn void_property_has_any_flags(property: PropertyHandle, mask: u64) -> bool {
    let property = property.as_property();
    trace_call!("HasAnyFlag", "{} & {:#x}", property.name(), mask);
    property.has_any_flags(PropertyFlags::from_bits(mask))
}

/// True if every bit of `mask` is set on the property
///
/// # Safety
/// `property` must be a live property handle.
#[no_mangle]
pub unsafe extern "C" fn void_property_has_all_flags(property: PropertyHandle, mask: u64) -> bool {
    let property = property.as_property();
    trace_call!("HasAllFlags", "{} & {:#x}", property.name(), mask);
    property.has_all_flags(PropertyFlags::from_bits(mask))
}
