//! Property kinds
//!
//! The closed set of value representations a property can have. The kind
//! decides the element layout and which dispatch table the value operations
//! go through.

use crate::descriptor::TypeDescriptor;
use crate::flags::PropertyFlags;
use crate::property::Property;
use crate::script_array::ScriptArray;
use crate::align_up;
use std::ffi::c_void;
use std::mem::{align_of, size_of};
use std::sync::Arc;

/// Field mask of a full-byte (non-packed) boolean
pub const NATIVE_BOOL_MASK: u8 = 0xFF;

/// Value representation of a property
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// Boolean stored in one byte. `field_mask` selects the bit(s) that hold
    /// it; [`NATIVE_BOOL_MASK`] means the whole byte belongs to it.
    Bool { field_mask: u8 },
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    /// Owned UTF-8 string
    String,
    /// Nested struct laid out inline
    Struct(Arc<TypeDescriptor>),
    /// Growable array of `inner` elements
    Array(Box<Property>),
    /// Key/value pairs with unique keys
    Map(Box<MapLayout>),
    /// Non-owning reference to a native object
    Object,
}

impl PropertyKind {
    /// A full-byte boolean
    pub const fn native_bool() -> Self {
        PropertyKind::Bool { field_mask: NATIVE_BOOL_MASK }
    }

    /// An array of `inner` values
    pub fn array(inner: PropertyKind) -> Self {
        PropertyKind::Array(Box::new(Property::inner("Inner", inner, 0)))
    }

    /// A map from `key` to `value`
    pub fn map(key: PropertyKind, value: PropertyKind) -> Self {
        PropertyKind::Map(Box::new(MapLayout::new(key, value)))
    }

    /// A nested struct of `ty`
    pub fn structure(ty: Arc<TypeDescriptor>) -> Self {
        PropertyKind::Struct(ty)
    }

    /// Element size and alignment
    pub fn layout(&self) -> (usize, usize) {
        match self {
            PropertyKind::Bool { .. } | PropertyKind::Int8 | PropertyKind::UInt8 => (1, 1),
            PropertyKind::Int16 | PropertyKind::UInt16 => (2, 2),
            PropertyKind::Int32 | PropertyKind::UInt32 | PropertyKind::Float32 => (4, 4),
            PropertyKind::Int64 | PropertyKind::UInt64 => (8, align_of::<u64>()),
            PropertyKind::Float64 => (8, align_of::<f64>()),
            PropertyKind::String => (size_of::<String>(), align_of::<String>()),
            PropertyKind::Struct(ty) => (ty.size(), ty.align()),
            PropertyKind::Array(_) | PropertyKind::Map(_) => {
                (size_of::<ScriptArray>(), align_of::<ScriptArray>())
            }
            PropertyKind::Object => (size_of::<*mut c_void>(), align_of::<*mut c_void>()),
        }
    }

    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::Bool { field_mask: NATIVE_BOOL_MASK } => "bool",
            PropertyKind::Bool { .. } => "bitfield",
            PropertyKind::Int8 => "int8",
            PropertyKind::Int16 => "int16",
            PropertyKind::Int32 => "int32",
            PropertyKind::Int64 => "int64",
            PropertyKind::UInt8 => "uint8",
            PropertyKind::UInt16 => "uint16",
            PropertyKind::UInt32 => "uint32",
            PropertyKind::UInt64 => "uint64",
            PropertyKind::Float32 => "float",
            PropertyKind::Float64 => "double",
            PropertyKind::String => "string",
            PropertyKind::Struct(_) => "struct",
            PropertyKind::Array(_) => "array",
            PropertyKind::Map(_) => "map",
            PropertyKind::Object => "object",
        }
    }

    /// True if values can be created by zero-filling and copied bytewise
    pub fn is_plain_old_data(&self) -> bool {
        match self {
            PropertyKind::String | PropertyKind::Array(_) | PropertyKind::Map(_) => false,
            // Packed booleans must not clobber their sibling bits
            PropertyKind::Bool { field_mask } => *field_mask == NATIVE_BOOL_MASK,
            PropertyKind::Struct(ty) => ty.all_properties().all(|p| p.kind().is_plain_old_data()),
            _ => true,
        }
    }

    /// True if destroying a value has work to do
    pub fn needs_destroy(&self) -> bool {
        match self {
            PropertyKind::String | PropertyKind::Array(_) | PropertyKind::Map(_) => true,
            PropertyKind::Struct(ty) => ty.all_properties().any(|p| p.kind().needs_destroy()),
            _ => false,
        }
    }

    /// Flags implied by the representation
    pub(crate) fn implied_flags(&self) -> PropertyFlags {
        let mut flags = PropertyFlags::empty();
        if self.is_plain_old_data() {
            flags |= PropertyFlags::IS_PLAIN_OLD_DATA | PropertyFlags::ZERO_CONSTRUCTOR;
        }
        if !self.needs_destroy() {
            flags |= PropertyFlags::NO_DESTRUCTOR;
        }
        flags
    }
}

/// Pair layout of a map property
///
/// Each entry stores the key at offset 0 and the value at the next offset
/// that satisfies its alignment.
#[derive(Debug, Clone)]
pub struct MapLayout {
    key: Property,
    value: Property,
    pair_size: usize,
    pair_align: usize,
}

impl MapLayout {
    /// Compute the pair layout for `key` and `value`
    pub fn new(key: PropertyKind, value: PropertyKind) -> Self {
        let (key_size, key_align) = key.layout();
        let (value_size, value_align) = value.layout();

        let value_offset = align_up(key_size, value_align);
        let pair_align = key_align.max(value_align);
        let pair_size = align_up(value_offset + value_size, pair_align);

        Self {
            key: Property::inner("Key", key, 0),
            value: Property::inner("Value", value, value_offset),
            pair_size,
            pair_align,
        }
    }

    /// Key property (offset is relative to the pair)
    pub fn key(&self) -> &Property {
        &self.key
    }

    /// Value property (offset is relative to the pair)
    pub fn value(&self) -> &Property {
        &self.value
    }

    /// Stride between pairs
    pub fn pair_size(&self) -> usize {
        self.pair_size
    }

    /// Alignment of a pair
    pub fn pair_align(&self) -> usize {
        self.pair_align
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_layouts() {
        assert_eq!(PropertyKind::Int32.layout(), (4, 4));
        assert_eq!(PropertyKind::native_bool().layout(), (1, 1));
        assert_eq!(PropertyKind::Float64.layout().0, 8);
        assert_eq!(PropertyKind::Object.layout().0, size_of::<usize>());
    }

    #[test]
    fn test_map_pair_layout() {
        let map = MapLayout::new(PropertyKind::UInt8, PropertyKind::Int64);
        assert_eq!(map.key().offset(), 0);
        assert_eq!(map.value().offset(), align_of::<u64>());
        assert_eq!(map.pair_size(), align_of::<u64>() + 8);
        assert_eq!(map.pair_align(), align_of::<u64>());
    }

    #[test]
    fn test_container_bool_elements_get_a_full_mask() {
        let array = PropertyKind::array(PropertyKind::Bool { field_mask: 0 });
        let PropertyKind::Array(inner) = &array else {
            unreachable!()
        };
        assert_eq!(inner.field_mask(), Some(NATIVE_BOOL_MASK));

        let map = MapLayout::new(PropertyKind::Bool { field_mask: 0 }, PropertyKind::Int32);
        assert_eq!(map.key().field_mask(), Some(NATIVE_BOOL_MASK));
    }

    #[test]
    fn test_implied_flags() {
        let int_flags = PropertyKind::Int32.implied_flags();
        let pod = PropertyFlags::IS_PLAIN_OLD_DATA | PropertyFlags::NO_DESTRUCTOR;
        assert!(int_flags.contains(pod));

        let string_flags = PropertyKind::String.implied_flags();
        assert!(!string_flags.intersects(pod));

        let bitfield = PropertyKind::Bool { field_mask: 0b0000_0100 };
        assert!(!bitfield.is_plain_old_data());
        assert!(!bitfield.needs_destroy());
    }
}
