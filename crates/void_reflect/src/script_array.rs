//! Type-erased growable buffer backing array and map properties
//!
//! `ScriptArray` knows nothing about its elements. Every call that touches
//! storage takes the element stride and alignment, and callers must pass
//! the same pair for the whole life of one array. Element construction and
//! destruction is the owning property's job.

use std::alloc::{self, Layout};
use std::ptr;

/// Raw storage for a container value (`repr(C)` so foreign code may read `len`)
#[repr(C)]
#[derive(Debug)]
pub struct ScriptArray {
    data: *mut u8,
    len: usize,
    capacity: usize,
}

impl ScriptArray {
    /// An empty array that owns no allocation
    pub const fn new() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
            capacity: 0,
        }
    }

    /// Number of live elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if there are no live elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of element slots allocated
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Address of element `index`
    ///
    /// # Safety
    /// `index` must be below `capacity` and `stride` must be the array's element stride.
    #[inline]
    pub unsafe fn element_ptr(&self, index: usize, stride: usize) -> *mut u8 {
        debug_assert!(index < self.capacity);
        self.data.add(index * stride)
    }

    /// Grow the allocation so at least `additional` more elements fit
    ///
    /// # Safety
    /// `stride` and `align` must match every other call on this array.
    pub unsafe fn reserve(&mut self, additional: usize, stride: usize, align: usize) {
        let required = self.len.checked_add(additional).expect("capacity overflow");
        if required <= self.capacity {
            return;
        }

        let new_capacity = required.max(self.capacity * 2).max(4);
        let new_layout = Self::layout(new_capacity, stride, align);

        let data = if self.data.is_null() {
            alloc::alloc(new_layout)
        } else {
            let old_layout = Self::layout(self.capacity, stride, align);
            alloc::realloc(self.data, old_layout, new_layout.size())
        };
        if data.is_null() {
            alloc::handle_alloc_error(new_layout);
        }

        self.data = data;
        self.capacity = new_capacity;
    }

    /// Append `count` uninitialized slots and return the index of the first one
    ///
    /// # Safety
    /// `stride` and `align` must match every other call on this array, and the
    /// caller must construct the new elements before they are read or destroyed.
    pub unsafe fn add_uninitialized(&mut self, count: usize, stride: usize, align: usize) -> usize {
        self.reserve(count, stride, align);
        let first = self.len;
        self.len += count;
        first
    }

    /// Remove the slot at `index`, shifting later elements down
    ///
    /// # Safety
    /// The element at `index` must already be destroyed.
    pub unsafe fn remove_slot(&mut self, index: usize, stride: usize) {
        debug_assert!(index < self.len);
        let tail = self.len - index - 1;
        if tail > 0 {
            ptr::copy(
                self.element_ptr(index + 1, stride),
                self.element_ptr(index, stride),
                tail * stride,
            );
        }
        self.len -= 1;
    }

    /// Forget every element and release the allocation
    ///
    /// # Safety
    /// Every live element must already be destroyed; `stride` and `align`
    /// must match the values used to allocate.
    pub unsafe fn free(&mut self, stride: usize, align: usize) {
        if !self.data.is_null() {
            alloc::dealloc(self.data, Self::layout(self.capacity, stride, align));
        }
        *self = Self::new();
    }

    fn layout(capacity: usize, stride: usize, align: usize) -> Layout {
        let size = capacity.checked_mul(stride).expect("capacity overflow");
        Layout::from_size_align(size, align).expect("invalid element layout")
    }
}

impl Default for ScriptArray {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_and_free() {
        let mut array = ScriptArray::new();
        assert!(array.is_empty());

        unsafe {
            let first = array.add_uninitialized(3, 4, 4);
            assert_eq!(first, 0);
            for i in 0..3 {
                (array.element_ptr(i, 4) as *mut u32).write(i as u32 * 10);
            }

            let next = array.add_uninitialized(10, 4, 4);
            assert_eq!(next, 3);
            assert!(array.capacity() >= 13);
            assert_eq!(*(array.element_ptr(2, 4) as *const u32), 20);

            array.free(4, 4);
        }

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn test_remove_slot_shifts_tail() {
        let mut array = ScriptArray::new();
        unsafe {
            array.add_uninitialized(3, 8, 8);
            for i in 0..3 {
                (array.element_ptr(i, 8) as *mut u64).write(i as u64 + 1);
            }

            array.remove_slot(0, 8);
            assert_eq!(array.len(), 2);
            assert_eq!(*(array.element_ptr(0, 8) as *const u64), 2);
            assert_eq!(*(array.element_ptr(1, 8) as *const u64), 3);

            array.free(8, 8);
        }
    }
}
