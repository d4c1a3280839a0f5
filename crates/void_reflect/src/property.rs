//! Property descriptors and their value operations
//!
//! A [`Property`] describes one field of a [`TypeDescriptor`](crate::TypeDescriptor):
//! where it lives, how large one element is, how many elements it has and
//! what kind of value it holds. The value operations take raw addresses and
//! forward to the dispatch table selected by the kind.
//!
//! # Memory contract
//!
//! Every address passed to a value operation must be non-null, aligned to
//! [`Property::align`] and point at `element_size × array_dim` bytes (one
//! element for the single-value operations). The memory is owned by the
//! caller; these operations only construct and tear down what lives inside it.

use crate::flags::PropertyFlags;
use crate::hash::hash_combine;
use crate::kind::{MapLayout, PropertyKind};
use crate::descriptor::TypeDescriptor;
use crate::vtable::PropertyVTable;

/// Descriptor of one field within a type layout
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    offset: usize,
    element_size: usize,
    align: usize,
    array_dim: usize,
    flags: PropertyFlags,
    kind: PropertyKind,
}

impl Property {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: PropertyKind,
        offset: usize,
        array_dim: usize,
        flags: PropertyFlags,
    ) -> Self {
        let (element_size, align) = kind.layout();
        let flags = flags | kind.implied_flags();
        Self {
            name: name.into(),
            offset,
            element_size,
            align,
            array_dim,
            flags,
            kind,
        }
    }

    /// Element property of a container (single element, no declared flags)
    ///
    /// Elements own their whole byte, so an empty boolean mask becomes a
    /// native one.
    pub(crate) fn inner(name: &str, kind: PropertyKind, offset: usize) -> Self {
        let kind = match kind {
            PropertyKind::Bool { field_mask: 0 } => PropertyKind::native_bool(),
            kind => kind,
        };
        Self::new(name, kind, offset, 1, PropertyFlags::empty())
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset from the start of the owning instance to the first element
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size in bytes of a single element
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Required alignment of the value
    pub fn align(&self) -> usize {
        self.align
    }

    /// Number of inline elements (1 for scalar fields)
    pub fn array_dim(&self) -> usize {
        self.array_dim
    }

    /// Size in bytes of all elements
    pub fn total_size(&self) -> usize {
        self.element_size * self.array_dim
    }

    /// Value representation
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Semantic flags
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// True if any bit of `mask` is set on this property
    #[inline]
    pub fn has_any_flags(&self, mask: PropertyFlags) -> bool {
        self.flags.intersects(mask)
    }

    /// True if every bit of `mask` is set on this property
    #[inline]
    pub fn has_all_flags(&self, mask: PropertyFlags) -> bool {
        self.flags.contains(mask)
    }

    /// Bit mask within the storage byte, for boolean properties only
    pub fn field_mask(&self) -> Option<u8> {
        match self.kind {
            PropertyKind::Bool { field_mask } => Some(field_mask),
            _ => None,
        }
    }

    /// Nested struct type, for struct properties only
    pub fn struct_type(&self) -> Option<&TypeDescriptor> {
        match &self.kind {
            PropertyKind::Struct(ty) => Some(ty.as_ref()),
            _ => None,
        }
    }

    /// Element property, for array properties only
    pub fn array_inner(&self) -> Option<&Property> {
        match &self.kind {
            PropertyKind::Array(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// Pair layout, for map properties only
    pub fn map_layout(&self) -> Option<&MapLayout> {
        match &self.kind {
            PropertyKind::Map(layout) => Some(layout.as_ref()),
            _ => None,
        }
    }

    /// Descriptors nested inside this one
    ///
    /// Arrays yield their element, maps their key then value, structs the
    /// properties of their type (inherited first). Other kinds yield nothing.
    pub fn inner_fields(&self) -> Vec<&Property> {
        match &self.kind {
            PropertyKind::Array(inner) => vec![inner.as_ref()],
            PropertyKind::Map(layout) => vec![layout.key(), layout.value()],
            PropertyKind::Struct(ty) => ty.all_properties().collect(),
            _ => Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn vtable(&self) -> &'static PropertyVTable {
        PropertyVTable::for_kind(&self.kind)
    }

    /// Address of element `index` of this property inside `container`
    ///
    /// # Safety
    /// `container` must point at an instance of the owning type.
    #[inline]
    pub unsafe fn container_ptr_to_value_ptr(&self, container: *mut u8, index: usize) -> *mut u8 {
        debug_assert!(index < self.array_dim);
        container.add(self.offset + index * self.element_size)
    }

    /// Construct default values for all `array_dim` elements at `dest`
    ///
    /// # Safety
    /// `dest` must satisfy the memory contract and hold no live value.
    pub unsafe fn initialize_value(&self, dest: *mut u8) {
        let initialize = self.vtable().initialize;
        for index in 0..self.array_dim {
            initialize(self, dest.add(index * self.element_size));
        }
    }

    /// Release what all `array_dim` elements at `dest` own, leaving `dest` itself allocated
    ///
    /// # Safety
    /// `dest` must satisfy the memory contract and hold live values.
    pub unsafe fn destroy_value(&self, dest: *mut u8) {
        if let Some(destroy) = self.vtable().destroy {
            for index in 0..self.array_dim {
                destroy(self, dest.add(index * self.element_size));
            }
        }
    }

    /// Destroy this field in place inside an instance of the owning type
    ///
    /// # Safety
    /// `container` must point at a live instance of the owning type.
    pub unsafe fn destroy_value_in_container(&self, container: *mut u8) {
        self.destroy_value(self.container_ptr_to_value_ptr(container, 0));
    }

    /// Construct this field in place inside an instance of the owning type
    ///
    /// # Safety
    /// `container` must point at an instance of the owning type whose field holds no live value.
    pub unsafe fn initialize_value_in_container(&self, container: *mut u8) {
        self.initialize_value(self.container_ptr_to_value_ptr(container, 0));
    }

    /// Copy one element from `src` to `dest`
    ///
    /// `dest` must already hold a live value; whatever it owned is released.
    /// Afterwards `dest` and `src` share nothing and can be destroyed
    /// independently.
    ///
    /// # Safety
    /// Both addresses must satisfy the memory contract for one element.
    pub unsafe fn copy_single_value(&self, dest: *mut u8, src: *const u8) {
        if dest as *const u8 == src {
            return;
        }
        (self.vtable().copy)(self, dest, src);
    }

    /// Copy all `array_dim` elements from `src` to `dest`
    ///
    /// # Safety
    /// Same as [`Property::copy_single_value`], for the whole array.
    pub unsafe fn copy_complete_value(&self, dest: *mut u8, src: *const u8) {
        if dest as *const u8 == src {
            return;
        }
        let copy = self.vtable().copy;
        for index in 0..self.array_dim {
            let offset = index * self.element_size;
            copy(self, dest.add(offset), src.add(offset));
        }
    }

    /// Value equality of one element
    ///
    /// # Safety
    /// Both addresses must hold live values of this property.
    pub unsafe fn identical(&self, a: *const u8, b: *const u8) -> bool {
        if a == b {
            return true;
        }
        (self.vtable().identical)(self, a, b)
    }

    /// Value equality of all `array_dim` elements
    ///
    /// # Safety
    /// Both addresses must hold live values of this property.
    pub unsafe fn identical_complete(&self, a: *const u8, b: *const u8) -> bool {
        if a == b {
            return true;
        }
        let identical = self.vtable().identical;
        (0..self.array_dim).all(|index| {
            let offset = index * self.element_size;
            identical(self, a.add(offset), b.add(offset))
        })
    }

    /// Hash of one element, consistent with [`Property::identical`]
    ///
    /// # Safety
    /// `src` must hold a live value of this property.
    pub unsafe fn value_type_hash(&self, src: *const u8) -> u32 {
        (self.vtable().hash)(self, src)
    }

    /// Hash of all `array_dim` elements, consistent with [`Property::identical_complete`]
    ///
    /// # Safety
    /// `src` must hold a live value of this property.
    pub unsafe fn value_type_hash_complete(&self, src: *const u8) -> u32 {
        let hash = self.vtable().hash;
        if self.array_dim == 1 {
            return hash(self, src);
        }
        (0..self.array_dim).fold(self.array_dim as u32, |seed, index| {
            hash_combine(seed, hash(self, src.add(index * self.element_size)))
        })
    }

    /// Read a boolean through the field mask
    ///
    /// Returns `None` for non-boolean properties.
    ///
    /// # Safety
    /// `src` must point at the storage byte of this property.
    pub unsafe fn get_bool(&self, src: *const u8) -> Option<bool> {
        self.field_mask().map(|mask| *src & mask != 0)
    }

    /// Write a boolean through the field mask, leaving sibling bits untouched
    ///
    /// Returns `false` for non-boolean properties.
    ///
    /// # Safety
    /// `dest` must point at the storage byte of this property.
    pub unsafe fn set_bool(&self, dest: *mut u8, value: bool) -> bool {
        match self.field_mask() {
            Some(mask) => {
                crate::vtable::write_bool(dest, mask, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ValueBuffer;

    #[test]
    fn test_scalar_round_trip() {
        let prop = Property::new("Health", PropertyKind::Int32, 0, 1, PropertyFlags::EDIT);
        let mut a = ValueBuffer::for_property(&prop);
        let mut b = ValueBuffer::for_property(&prop);

        unsafe {
            prop.initialize_value(a.as_mut_ptr());
            prop.initialize_value(b.as_mut_ptr());
            (a.as_mut_ptr() as *mut i32).write(77);

            assert!(!prop.identical(a.as_ptr(), b.as_ptr()));
            prop.copy_single_value(b.as_mut_ptr(), a.as_ptr());
            assert!(prop.identical(a.as_ptr(), b.as_ptr()));
            assert_eq!(prop.value_type_hash(a.as_ptr()), prop.value_type_hash(b.as_ptr()));

            prop.destroy_value(a.as_mut_ptr());
            prop.destroy_value(b.as_mut_ptr());
        }
    }

    #[test]
    fn test_fixed_array_initializes_every_element() {
        let prop = Property::new("Slots", PropertyKind::String, 0, 3, PropertyFlags::empty());
        let mut buffer = ValueBuffer::for_property(&prop);
        assert_eq!(buffer.len(), prop.total_size());

        unsafe {
            prop.initialize_value(buffer.as_mut_ptr());
            for index in 0..3 {
                let slot =
                    prop.container_ptr_to_value_ptr(buffer.as_mut_ptr(), index) as *mut String;
                (*slot).push_str("filled");
            }
            prop.destroy_value(buffer.as_mut_ptr());
        }
    }

    #[test]
    fn test_flag_queries() {
        let prop = Property::new(
            "Score",
            PropertyKind::Int32,
            0,
            1,
            PropertyFlags::NET | PropertyFlags::REP_NOTIFY,
        );

        assert!(prop.has_any_flags(PropertyFlags::NET | PropertyFlags::TRANSIENT));
        assert!(!prop.has_all_flags(PropertyFlags::NET | PropertyFlags::TRANSIENT));
        assert!(prop.has_all_flags(PropertyFlags::NET | PropertyFlags::REP_NOTIFY));
        assert!(!prop.has_any_flags(PropertyFlags::NONE));
    }

    #[test]
    fn test_bool_accessors_reject_other_kinds() {
        let prop = Property::new("Count", PropertyKind::UInt8, 0, 1, PropertyFlags::empty());
        let mut byte = 0u8;
        unsafe {
            assert_eq!(prop.get_bool(&byte), None);
            assert!(!prop.set_bool(&mut byte, true));
        }
        assert_eq!(byte, 0);
    }
}
