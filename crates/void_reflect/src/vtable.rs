//! Per-kind dispatch tables
//!
//! Each kind has one static table of value operations. Every entry works on
//! a single element; [`Property`] loops over `array_dim` where needed.

use crate::hash::{hash_bytes, hash_combine, hash_u64};
use crate::kind::{PropertyKind, NATIVE_BOOL_MASK};
use crate::property::Property;
use crate::script_array::ScriptArray;
use std::ptr;

/// Construct a default element in uninitialized memory
pub type InitializeFn = unsafe fn(&Property, *mut u8);
/// Release what an element owns
pub type DestroyFn = unsafe fn(&Property, *mut u8);
/// Copy `src` over the live element at `dest`
pub type CopyFn = unsafe fn(&Property, *mut u8, *const u8);
/// Value equality of two live elements
pub type IdenticalFn = unsafe fn(&Property, *const u8, *const u8) -> bool;
/// Hash of a live element
pub type HashFn = unsafe fn(&Property, *const u8) -> u32;

/// Value operations of one property kind
pub struct PropertyVTable {
    pub initialize: InitializeFn,
    /// `None` when elements own nothing
    pub destroy: Option<DestroyFn>,
    pub copy: CopyFn,
    pub identical: IdenticalFn,
    pub hash: HashFn,
}

impl PropertyVTable {
    /// Dispatch table for `kind`
    pub fn for_kind(kind: &PropertyKind) -> &'static PropertyVTable {
        match kind {
            PropertyKind::Bool { .. } => &BOOL_VTABLE,
            PropertyKind::Int8 => &INT8_VTABLE,
            PropertyKind::Int16 => &INT16_VTABLE,
            PropertyKind::Int32 => &INT32_VTABLE,
            PropertyKind::Int64 => &INT64_VTABLE,
            PropertyKind::UInt8 => &UINT8_VTABLE,
            PropertyKind::UInt16 => &UINT16_VTABLE,
            PropertyKind::UInt32 => &UINT32_VTABLE,
            PropertyKind::UInt64 => &UINT64_VTABLE,
            PropertyKind::Float32 => &FLOAT32_VTABLE,
            PropertyKind::Float64 => &FLOAT64_VTABLE,
            PropertyKind::String => &STRING_VTABLE,
            PropertyKind::Struct(_) => &STRUCT_VTABLE,
            PropertyKind::Array(_) => &ARRAY_VTABLE,
            PropertyKind::Map(_) => &MAP_VTABLE,
            PropertyKind::Object => &OBJECT_VTABLE,
        }
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

trait ScalarValue: Copy + PartialEq + Default {
    fn value_hash(self) -> u32;
}

macro_rules! impl_integer_scalar {
    ($($ty:ty),*) => {
        $(
            impl ScalarValue for $ty {
                #[inline]
                fn value_hash(self) -> u32 {
                    hash_u64(self as u64)
                }
            }
        )*
    };
}

impl_integer_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl ScalarValue for f32 {
    #[inline]
    fn value_hash(self) -> u32 {
        // 0.0 == -0.0, so both must hash alike
        if self == 0.0 {
            0
        } else {
            self.to_bits()
        }
    }
}

impl ScalarValue for f64 {
    #[inline]
    fn value_hash(self) -> u32 {
        if self == 0.0 {
            0
        } else {
            hash_u64(self.to_bits())
        }
    }
}

unsafe fn scalar_initialize<T: ScalarValue>(_: &Property, dest: *mut u8) {
    (dest as *mut T).write(T::default());
}

unsafe fn scalar_copy<T: ScalarValue>(_: &Property, dest: *mut u8, src: *const u8) {
    (dest as *mut T).write((src as *const T).read());
}

unsafe fn scalar_identical<T: ScalarValue>(_: &Property, a: *const u8, b: *const u8) -> bool {
    (a as *const T).read() == (b as *const T).read()
}

unsafe fn scalar_hash<T: ScalarValue>(_: &Property, src: *const u8) -> u32 {
    (src as *const T).read().value_hash()
}

macro_rules! scalar_vtable {
    ($ty:ty) => {
        PropertyVTable {
            initialize: scalar_initialize::<$ty>,
            destroy: None,
            copy: scalar_copy::<$ty>,
            identical: scalar_identical::<$ty>,
            hash: scalar_hash::<$ty>,
        }
    };
}

static INT8_VTABLE: PropertyVTable = scalar_vtable!(i8);
static INT16_VTABLE: PropertyVTable = scalar_vtable!(i16);
static INT32_VTABLE: PropertyVTable = scalar_vtable!(i32);
static INT64_VTABLE: PropertyVTable = scalar_vtable!(i64);
static UINT8_VTABLE: PropertyVTable = scalar_vtable!(u8);
static UINT16_VTABLE: PropertyVTable = scalar_vtable!(u16);
static UINT32_VTABLE: PropertyVTable = scalar_vtable!(u32);
static UINT64_VTABLE: PropertyVTable = scalar_vtable!(u64);
static FLOAT32_VTABLE: PropertyVTable = scalar_vtable!(f32);
static FLOAT64_VTABLE: PropertyVTable = scalar_vtable!(f64);

// Object references are compared and hashed by address
static OBJECT_VTABLE: PropertyVTable = scalar_vtable!(usize);

// ---------------------------------------------------------------------------
// Booleans
// ---------------------------------------------------------------------------

/// Set or clear the bits of `mask` in the byte at `dest`
///
/// A full-byte boolean is written as 0 or 1 so it stays a valid native bool.
#[inline]
pub(crate) unsafe fn write_bool(dest: *mut u8, mask: u8, value: bool) {
    let set = if mask == NATIVE_BOOL_MASK { 1 } else { mask };
    *dest = (*dest & !mask) | if value { set } else { 0 };
}

#[inline]
fn bool_mask(property: &Property) -> u8 {
    property.field_mask().unwrap_or(NATIVE_BOOL_MASK)
}

unsafe fn bool_initialize(property: &Property, dest: *mut u8) {
    write_bool(dest, bool_mask(property), false);
}

unsafe fn bool_copy(property: &Property, dest: *mut u8, src: *const u8) {
    let mask = bool_mask(property);
    write_bool(dest, mask, *src & mask != 0);
}

unsafe fn bool_identical(property: &Property, a: *const u8, b: *const u8) -> bool {
    let mask = bool_mask(property);
    (*a & mask != 0) == (*b & mask != 0)
}

unsafe fn bool_hash(property: &Property, src: *const u8) -> u32 {
    u32::from(*src & bool_mask(property) != 0)
}

static BOOL_VTABLE: PropertyVTable = PropertyVTable {
    initialize: bool_initialize,
    destroy: None,
    copy: bool_copy,
    identical: bool_identical,
    hash: bool_hash,
};

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

unsafe fn string_initialize(_: &Property, dest: *mut u8) {
    (dest as *mut String).write(String::new());
}

unsafe fn string_destroy(_: &Property, dest: *mut u8) {
    ptr::drop_in_place(dest as *mut String);
}

unsafe fn string_copy(_: &Property, dest: *mut u8, src: *const u8) {
    (*(dest as *mut String)).clone_from(&*(src as *const String));
}

unsafe fn string_identical(_: &Property, a: *const u8, b: *const u8) -> bool {
    *(a as *const String) == *(b as *const String)
}

unsafe fn string_hash(_: &Property, src: *const u8) -> u32 {
    hash_bytes((*(src as *const String)).as_bytes())
}

static STRING_VTABLE: PropertyVTable = PropertyVTable {
    initialize: string_initialize,
    destroy: Some(string_destroy),
    copy: string_copy,
    identical: string_identical,
    hash: string_hash,
};

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

unsafe fn struct_initialize(property: &Property, dest: *mut u8) {
    let Some(ty) = property.struct_type() else { return };
    ptr::write_bytes(dest, 0, ty.size());
    for field in ty.all_properties() {
        field.initialize_value(dest.add(field.offset()));
    }
}

unsafe fn struct_destroy(property: &Property, dest: *mut u8) {
    let Some(ty) = property.struct_type() else { return };
    for field in ty.all_properties() {
        field.destroy_value(dest.add(field.offset()));
    }
}

unsafe fn struct_copy(property: &Property, dest: *mut u8, src: *const u8) {
    let Some(ty) = property.struct_type() else { return };
    for field in ty.all_properties() {
        field.copy_complete_value(dest.add(field.offset()), src.add(field.offset()));
    }
}

unsafe fn struct_identical(property: &Property, a: *const u8, b: *const u8) -> bool {
    let Some(ty) = property.struct_type() else { return true };
    ty.all_properties()
        .all(|field| field.identical_complete(a.add(field.offset()), b.add(field.offset())))
}

unsafe fn struct_hash(property: &Property, src: *const u8) -> u32 {
    let Some(ty) = property.struct_type() else { return 0 };
    ty.all_properties().fold(0, |seed, field| {
        hash_combine(seed, field.value_type_hash_complete(src.add(field.offset())))
    })
}

static STRUCT_VTABLE: PropertyVTable = PropertyVTable {
    initialize: struct_initialize,
    destroy: Some(struct_destroy),
    copy: struct_copy,
    identical: struct_identical,
    hash: struct_hash,
};

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

unsafe fn script_array_initialize(_: &Property, dest: *mut u8) {
    (dest as *mut ScriptArray).write(ScriptArray::new());
}

/// Destroy every element of `array` and release its buffer
pub(crate) unsafe fn array_clear(inner: &Property, array: &mut ScriptArray) {
    let stride = inner.element_size();
    for index in 0..array.len() {
        inner.destroy_value(array.element_ptr(index, stride));
    }
    array.free(stride, inner.align());
}

unsafe fn array_destroy(property: &Property, dest: *mut u8) {
    let Some(inner) = property.array_inner() else { return };
    array_clear(inner, &mut *(dest as *mut ScriptArray));
}

unsafe fn array_copy(property: &Property, dest: *mut u8, src: *const u8) {
    let Some(inner) = property.array_inner() else { return };
    let dest = &mut *(dest as *mut ScriptArray);
    let src = &*(src as *const ScriptArray);
    let stride = inner.element_size();

    array_clear(inner, dest);
    dest.add_uninitialized(src.len(), stride, inner.align());
    for index in 0..src.len() {
        let element = dest.element_ptr(index, stride);
        inner.initialize_value(element);
        inner.copy_complete_value(element, src.element_ptr(index, stride));
    }
}

unsafe fn array_identical(property: &Property, a: *const u8, b: *const u8) -> bool {
    let Some(inner) = property.array_inner() else { return true };
    let a = &*(a as *const ScriptArray);
    let b = &*(b as *const ScriptArray);
    let stride = inner.element_size();

    a.len() == b.len()
        && (0..a.len()).all(|index| {
            inner.identical_complete(a.element_ptr(index, stride), b.element_ptr(index, stride))
        })
}

unsafe fn array_hash(property: &Property, src: *const u8) -> u32 {
    let Some(inner) = property.array_inner() else { return 0 };
    let array = &*(src as *const ScriptArray);
    let stride = inner.element_size();

    (0..array.len()).fold(array.len() as u32, |seed, index| {
        hash_combine(seed, inner.value_type_hash_complete(array.element_ptr(index, stride)))
    })
}

static ARRAY_VTABLE: PropertyVTable = PropertyVTable {
    initialize: script_array_initialize,
    destroy: Some(array_destroy),
    copy: array_copy,
    identical: array_identical,
    hash: array_hash,
};

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// Destroy every pair of `pairs` and release its buffer
pub(crate) unsafe fn map_clear(layout: &crate::kind::MapLayout, pairs: &mut ScriptArray) {
    let (key, value) = (layout.key(), layout.value());
    for index in 0..pairs.len() {
        let pair = pairs.element_ptr(index, layout.pair_size());
        key.destroy_value(pair.add(key.offset()));
        value.destroy_value(pair.add(value.offset()));
    }
    pairs.free(layout.pair_size(), layout.pair_align());
}

/// Index of the pair whose key is identical to `key`
pub(crate) unsafe fn map_find(
    layout: &crate::kind::MapLayout,
    pairs: &ScriptArray,
    key: *const u8,
) -> Option<usize> {
    let key_property = layout.key();
    (0..pairs.len()).find(|&index| {
        let pair = pairs.element_ptr(index, layout.pair_size());
        key_property.identical_complete(pair.add(key_property.offset()), key)
    })
}

unsafe fn map_destroy(property: &Property, dest: *mut u8) {
    let Some(layout) = property.map_layout() else { return };
    map_clear(layout, &mut *(dest as *mut ScriptArray));
}

unsafe fn map_copy(property: &Property, dest: *mut u8, src: *const u8) {
    let Some(layout) = property.map_layout() else { return };
    let dest = &mut *(dest as *mut ScriptArray);
    let src = &*(src as *const ScriptArray);
    let (key, value) = (layout.key(), layout.value());
    let stride = layout.pair_size();

    map_clear(layout, dest);
    dest.add_uninitialized(src.len(), stride, layout.pair_align());
    for index in 0..src.len() {
        let to = dest.element_ptr(index, stride);
        let from = src.element_ptr(index, stride);
        key.initialize_value(to.add(key.offset()));
        key.copy_complete_value(to.add(key.offset()), from.add(key.offset()));
        value.initialize_value(to.add(value.offset()));
        value.copy_complete_value(to.add(value.offset()), from.add(value.offset()));
    }
}

// Keys are unique, so equal length plus every pair of `a` matching in `b`
// means the maps hold the same pairs, in any order.
unsafe fn map_identical(property: &Property, a: *const u8, b: *const u8) -> bool {
    let Some(layout) = property.map_layout() else { return true };
    let a = &*(a as *const ScriptArray);
    let b = &*(b as *const ScriptArray);
    let (key, value) = (layout.key(), layout.value());
    let stride = layout.pair_size();

    if a.len() != b.len() {
        return false;
    }

    (0..a.len()).all(|index| {
        let pair_a = a.element_ptr(index, stride);
        match map_find(layout, b, pair_a.add(key.offset())) {
            Some(found) => {
                let pair_b = b.element_ptr(found, stride);
                value.identical_complete(pair_a.add(value.offset()), pair_b.add(value.offset()))
            }
            None => false,
        }
    })
}

// Pair hashes are summed so the result does not depend on insertion order
unsafe fn map_hash(property: &Property, src: *const u8) -> u32 {
    let Some(layout) = property.map_layout() else { return 0 };
    let pairs = &*(src as *const ScriptArray);
    let (key, value) = (layout.key(), layout.value());
    let stride = layout.pair_size();

    let sum = (0..pairs.len()).fold(0u32, |sum, index| {
        let pair = pairs.element_ptr(index, stride);
        let pair_hash = hash_combine(
            key.value_type_hash_complete(pair.add(key.offset())),
            value.value_type_hash_complete(pair.add(value.offset())),
        );
        sum.wrapping_add(pair_hash)
    });
    hash_combine(pairs.len() as u32, sum)
}

static MAP_VTABLE: PropertyVTable = PropertyVTable {
    initialize: script_array_initialize,
    destroy: Some(map_destroy),
    copy: map_copy,
    identical: map_identical,
    hash: map_hash,
};
