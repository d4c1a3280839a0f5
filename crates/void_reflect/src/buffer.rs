//! Caller-owned scratch storage for values
//!
//! A [`ValueBuffer`] is zeroed, correctly aligned memory sized for one
//! property or one type instance. It only owns the bytes: constructing and
//! destroying the value inside is still the caller's job, and dropping the
//! buffer never runs a destructor.

use crate::descriptor::TypeDescriptor;
use crate::property::Property;
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Zeroed, aligned heap memory for holding a value
pub struct ValueBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// Safety: the buffer is plain bytes owned by this handle
unsafe impl Send for ValueBuffer {}
unsafe impl Sync for ValueBuffer {}

impl ValueBuffer {
    /// Allocate `size` zeroed bytes aligned to `align`
    ///
    /// Zero sizes are rounded up to one byte.
    pub fn new(size: usize, align: usize) -> Self {
        let layout = Layout::from_size_align(size.max(1), align).expect("invalid buffer layout");
        // Safety: layout has a non-zero size
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        Self { ptr, layout }
    }

    /// Storage for every element of `property`
    pub fn for_property(property: &Property) -> Self {
        Self::new(property.total_size(), property.align())
    }

    /// Storage for one instance of `ty`
    pub fn for_type(ty: &TypeDescriptor) -> Self {
        Self::new(ty.size(), ty.align())
    }

    /// Start of the buffer
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Start of the buffer, for writing
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Size in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always false; buffers hold at least one byte
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: the allocation is initialized (zeroed) and `len` bytes long
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for ValueBuffer {
    fn drop(&mut self) {
        // Safety: allocated in `new` with this layout
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for ValueBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueBuffer")
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}
