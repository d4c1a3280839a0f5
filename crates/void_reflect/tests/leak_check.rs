//! Allocation balance of value lifecycles
//!
//! Counts live heap allocations made by the test thread and checks that
//! initialize, fill, copy and destroy leave none behind.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::Arc;
use void_reflect::prelude::*;

struct CountingAlloc;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn adjust(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            adjust(1);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        adjust(-1);
        System.dealloc(ptr, layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            adjust(1);
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

fn live() -> isize {
    LIVE.with(Cell::get)
}

#[test]
fn test_lifecycle_leaves_no_allocations() {
    let entry = Arc::new(
        TypeBuilder::new("Entry")
            .field("Label", PropertyKind::String)
            .field("Tags", PropertyKind::array(PropertyKind::String))
            .build()
            .unwrap(),
    );
    let ty = TypeBuilder::new("Journal")
        .property(PropertySpec::new("Entries", PropertyKind::structure(entry.clone())).array_dim(2))
        .field(
            "Index",
            PropertyKind::map(PropertyKind::String, PropertyKind::array(PropertyKind::Int32)),
        )
        .build()
        .unwrap();
    let entries = ty.find_property("Entries").unwrap();
    let index = ty.find_property("Index").unwrap();
    let tags = entry.find_property("Tags").unwrap();

    let mut a = ValueBuffer::for_type(&ty);
    let mut b = ValueBuffer::for_type(&ty);

    let before = live();
    unsafe {
        for buffer in [&mut a, &mut b] {
            entries.initialize_value_in_container(buffer.as_mut_ptr());
            index.initialize_value_in_container(buffer.as_mut_ptr());
        }

        // Fill both elements of the fixed array in `a`
        for i in 0..2 {
            let element = entries.container_ptr_to_value_ptr(a.as_mut_ptr(), i);
            *(element as *mut String) = format!("entry {}", i);
            let mut view = ArrayView::new(tags, element.add(tags.offset())).unwrap();
            for tag in ["red", "blue", "green"] {
                *(view.add_value() as *mut String) = tag.to_string();
            }
        }

        // Map of string to array
        let inner = index.map_layout().unwrap().value().clone();
        let mut numbers = ValueBuffer::for_property(&inner);
        inner.initialize_value(numbers.as_mut_ptr());
        let mut view = ArrayView::new(&inner, numbers.as_mut_ptr()).unwrap();
        for n in 0..10 {
            *(view.add_value() as *mut i32) = n;
        }
        let mut map = MapView::new(index, a.as_mut_ptr().add(index.offset())).unwrap();
        for key in ["alpha", "beta"] {
            let key = key.to_string();
            map.add(&key as *const String as *const u8, numbers.as_ptr());
        }
        inner.destroy_value(numbers.as_mut_ptr());

        // Copy element by element, then replace with a second copy
        for _ in 0..2 {
            for i in 0..2 {
                entries.copy_single_value(
                    entries.container_ptr_to_value_ptr(b.as_mut_ptr(), i),
                    entries.container_ptr_to_value_ptr(a.as_mut_ptr(), i),
                );
            }
            index.copy_single_value(
                b.as_mut_ptr().add(index.offset()),
                a.as_ptr().add(index.offset()),
            );
        }
        assert!(index.identical(a.as_ptr().add(index.offset()), b.as_ptr().add(index.offset())));

        for buffer in [&mut a, &mut b] {
            entries.destroy_value_in_container(buffer.as_mut_ptr());
            index.destroy_value_in_container(buffer.as_mut_ptr());
        }
    }
    assert_eq!(live(), before);
}
