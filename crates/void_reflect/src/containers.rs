//! Typed views over array and map values
//!
//! The views pair a container property with the address of one of its
//! values so elements can be added, found and removed without repeating
//! the stride and alignment bookkeeping at every call.

use crate::kind::MapLayout;
use crate::property::Property;
use crate::script_array::ScriptArray;
use crate::vtable::{array_clear, map_clear, map_find};

/// Mutable view of an array value
pub struct ArrayView<'a> {
    inner: &'a Property,
    array: &'a mut ScriptArray,
}

impl<'a> ArrayView<'a> {
    /// View the array value at `value`
    ///
    /// Returns `None` if `property` is not an array property.
    ///
    /// # Safety
    /// `value` must hold a live value of `property` and stay valid, and
    /// otherwise untouched, for the life of the view.
    pub unsafe fn new(property: &'a Property, value: *mut u8) -> Option<Self> {
        let inner = property.array_inner()?;
        Some(Self {
            inner,
            array: &mut *(value as *mut ScriptArray),
        })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Element property
    pub fn inner(&self) -> &Property {
        self.inner
    }

    /// Address of element `index`
    pub fn element_ptr(&self, index: usize) -> Option<*mut u8> {
        if index >= self.array.len() {
            return None;
        }
        // Safety: index is in bounds
        Some(unsafe { self.array.element_ptr(index, self.inner.element_size()) })
    }

    /// Append a default-constructed element and return its address
    pub fn add_value(&mut self) -> *mut u8 {
        let stride = self.inner.element_size();
        // Safety: stride and align come from the element property; the new
        // slot is constructed before anyone can read it
        unsafe {
            let index = self.array.add_uninitialized(1, stride, self.inner.align());
            let element = self.array.element_ptr(index, stride);
            self.inner.initialize_value(element);
            element
        }
    }

    /// Destroy and remove element `index`
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(element) = self.element_ptr(index) else {
            return false;
        };
        // Safety: element is live; it is destroyed before its slot is reused
        unsafe {
            self.inner.destroy_value(element);
            self.array.remove_slot(index, self.inner.element_size());
        }
        true
    }

    /// Destroy every element and release the storage
    pub fn clear(&mut self) {
        // Safety: every element in 0..len is live
        unsafe { array_clear(self.inner, self.array) }
    }
}

/// Mutable view of a map value
pub struct MapView<'a> {
    layout: &'a MapLayout,
    pairs: &'a mut ScriptArray,
}

impl<'a> MapView<'a> {
    /// View the map value at `value`
    ///
    /// Returns `None` if `property` is not a map property.
    ///
    /// # Safety
    /// Same as [`ArrayView::new`].
    pub unsafe fn new(property: &'a Property, value: *mut u8) -> Option<Self> {
        let layout = property.map_layout()?;
        Some(Self {
            layout,
            pairs: &mut *(value as *mut ScriptArray),
        })
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if there are no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Key and value properties
    pub fn layout(&self) -> &MapLayout {
        self.layout
    }

    fn pair_ptr(&self, index: usize) -> *mut u8 {
        // Safety: callers only pass indices below len
        unsafe { self.pairs.element_ptr(index, self.layout.pair_size()) }
    }

    /// Key address of pair `index`
    pub fn key_ptr(&self, index: usize) -> Option<*mut u8> {
        (index < self.len()).then(|| {
            // Safety: offset stays inside the pair
            unsafe { self.pair_ptr(index).add(self.layout.key().offset()) }
        })
    }

    /// Value address of pair `index`
    pub fn value_ptr(&self, index: usize) -> Option<*mut u8> {
        (index < self.len()).then(|| {
            // Safety: offset stays inside the pair
            unsafe { self.pair_ptr(index).add(self.layout.value().offset()) }
        })
    }

    /// Address of the value stored under `key`
    ///
    /// # Safety
    /// `key` must hold a live value of the key property.
    pub unsafe fn find_value(&self, key: *const u8) -> Option<*mut u8> {
        let index = map_find(self.layout, &*self.pairs, key)?;
        self.value_ptr(index)
    }

    /// Copy `key` and `value` into the map, replacing the value of an existing key
    ///
    /// # Safety
    /// `key` and `value` must hold live values of the key and value properties.
    pub unsafe fn add(&mut self, key: *const u8, value: *const u8) {
        let (key_property, value_property) = (self.layout.key(), self.layout.value());

        if let Some(existing) = self.find_value(key) {
            value_property.copy_complete_value(existing, value);
            return;
        }

        let index = self
            .pairs
            .add_uninitialized(1, self.layout.pair_size(), self.layout.pair_align());
        let pair = self.pair_ptr(index);
        let key_slot = pair.add(key_property.offset());
        let value_slot = pair.add(value_property.offset());

        key_property.initialize_value(key_slot);
        key_property.copy_complete_value(key_slot, key);
        value_property.initialize_value(value_slot);
        value_property.copy_complete_value(value_slot, value);
    }

    /// Destroy and remove the pair stored under `key`
    ///
    /// # Safety
    /// `key` must hold a live value of the key property.
    pub unsafe fn remove(&mut self, key: *const u8) -> bool {
        let Some(index) = map_find(self.layout, &*self.pairs, key) else {
            return false;
        };
        let pair = self.pair_ptr(index);
        self.layout.key().destroy_value(pair.add(self.layout.key().offset()));
        self.layout.value().destroy_value(pair.add(self.layout.value().offset()));
        self.pairs.remove_slot(index, self.layout.pair_size());
        true
    }

    /// Destroy every pair and release the storage
    pub fn clear(&mut self) {
        // Safety: every pair in 0..len is live
        unsafe { map_clear(self.layout, self.pairs) }
    }
}
