//! Integration tests for void_reflect
//!
//! Exercises copy, identity and hashing across every kind, including
//! nested structs and containers.

use std::sync::Arc;
use void_reflect::prelude::*;

fn vector_type() -> Arc<TypeDescriptor> {
    Arc::new(
        TypeBuilder::new("Vector")
            .field("X", PropertyKind::Float32)
            .field("Y", PropertyKind::Float32)
            .field("Z", PropertyKind::Float32)
            .build()
            .unwrap(),
    )
}

fn loadout_type(vector: Arc<TypeDescriptor>) -> TypeDescriptor {
    TypeBuilder::new("Loadout")
        .field("Name", PropertyKind::String)
        .field("Spawn", PropertyKind::structure(vector))
        .field("Items", PropertyKind::array(PropertyKind::String))
        .field("Ammo", PropertyKind::map(PropertyKind::String, PropertyKind::Int32))
        .property(PropertySpec::new("Slots", PropertyKind::Int16).array_dim(3))
        .bitfield("bPrimary")
        .bitfield("bLocked")
        .field("Target", PropertyKind::Object)
        .build()
        .unwrap()
}

/// A loadout instance built through the type's own properties
struct Loadout {
    ty: Arc<TypeDescriptor>,
    buffer: ValueBuffer,
}

impl Loadout {
    fn new(ty: &Arc<TypeDescriptor>) -> Self {
        let mut buffer = ValueBuffer::for_type(ty);
        unsafe { struct_property(ty).initialize_value(buffer.as_mut_ptr()) };
        Self { ty: ty.clone(), buffer }
    }

    fn field(&mut self, name: &str) -> *mut u8 {
        let offset = self.ty.find_property(name).unwrap().offset();
        unsafe { self.buffer.as_mut_ptr().add(offset) }
    }

    fn set_name(&mut self, name: &str) {
        unsafe { *(self.field("Name") as *mut String) = name.to_string() };
    }

    fn push_item(&mut self, item: &str) {
        let items = self.ty.find_property("Items").unwrap().clone();
        let ptr = self.field("Items");
        unsafe {
            let mut view = ArrayView::new(&items, ptr).unwrap();
            *(view.add_value() as *mut String) = item.to_string();
        }
    }

    fn set_ammo(&mut self, kind: &str, count: i32) {
        let ammo = self.ty.find_property("Ammo").unwrap().clone();
        let ptr = self.field("Ammo");
        let key = kind.to_string();
        unsafe {
            let mut view = MapView::new(&ammo, ptr).unwrap();
            view.add(&key as *const String as *const u8, &count as *const i32 as *const u8);
        }
    }

    fn set_spawn(&mut self, x: f32, y: f32, z: f32) {
        let spawn = self.field("Spawn") as *mut f32;
        unsafe {
            spawn.write(x);
            spawn.add(1).write(y);
            spawn.add(2).write(z);
        }
    }
}

/// Struct property wrapping a whole type, so an instance is one value
fn struct_property(ty: &Arc<TypeDescriptor>) -> &'static Property {
    let wrapper = TypeBuilder::new(format!("{}Holder", ty.name()))
        .field("Value", PropertyKind::structure(ty.clone()))
        .build()
        .unwrap();
    let wrapper: &'static TypeDescriptor = Box::leak(Box::new(wrapper));
    wrapper.find_property("Value").unwrap()
}

#[test]
fn test_struct_copy_is_deep_and_survives_source_destroy() {
    let ty = Arc::new(loadout_type(vector_type()));
    let value = struct_property(&ty);

    let mut src = Loadout::new(&ty);
    src.set_name("assault");
    src.push_item("rifle");
    src.push_item("grenade");
    src.set_ammo("5.56", 120);
    src.set_spawn(1.0, 2.0, 3.0);

    let mut dest = Loadout::new(&ty);
    unsafe {
        assert!(!value.identical(dest.buffer.as_ptr(), src.buffer.as_ptr()));
        value.copy_single_value(dest.buffer.as_mut_ptr(), src.buffer.as_ptr());
        assert!(value.identical(dest.buffer.as_ptr(), src.buffer.as_ptr()));
        assert_eq!(
            value.value_type_hash(dest.buffer.as_ptr()),
            value.value_type_hash(src.buffer.as_ptr())
        );

        // Keep a second copy around to compare against after the source dies
        let mut witness = Loadout::new(&ty);
        value.copy_single_value(witness.buffer.as_mut_ptr(), src.buffer.as_ptr());

        value.destroy_value(src.buffer.as_mut_ptr());
        assert!(value.identical(dest.buffer.as_ptr(), witness.buffer.as_ptr()));
        assert_eq!(*(dest.field("Name") as *const String), "assault");

        value.destroy_value(dest.buffer.as_mut_ptr());
        value.destroy_value(witness.buffer.as_mut_ptr());
    }
}

#[test]
fn test_struct_difference_in_any_field_breaks_identity() {
    let ty = Arc::new(loadout_type(vector_type()));
    let value = struct_property(&ty);

    let mut a = Loadout::new(&ty);
    let mut b = Loadout::new(&ty);
    a.push_item("knife");
    b.push_item("knife");

    unsafe {
        assert!(value.identical(a.buffer.as_ptr(), b.buffer.as_ptr()));

        let slots = ty.find_property("Slots").unwrap();
        let last_slot = slots.container_ptr_to_value_ptr(b.buffer.as_mut_ptr(), 2) as *mut i16;
        *last_slot = 9;
        assert!(!value.identical(a.buffer.as_ptr(), b.buffer.as_ptr()));
        *last_slot = 0;

        let locked = ty.find_property("bLocked").unwrap();
        locked.set_bool(b.field("bLocked"), true);
        assert!(!value.identical(a.buffer.as_ptr(), b.buffer.as_ptr()));

        value.destroy_value(a.buffer.as_mut_ptr());
        value.destroy_value(b.buffer.as_mut_ptr());
    }
}

#[test]
fn test_map_identity_ignores_insertion_order() {
    let ty = Arc::new(loadout_type(vector_type()));
    let ammo = ty.find_property("Ammo").unwrap();

    let mut a = Loadout::new(&ty);
    let mut b = Loadout::new(&ty);
    a.set_ammo("9mm", 30);
    a.set_ammo("shell", 8);
    b.set_ammo("shell", 8);
    b.set_ammo("9mm", 30);

    unsafe {
        let pa = a.field("Ammo");
        let pb = b.field("Ammo");
        assert!(ammo.identical(pa, pb));
        assert_eq!(ammo.value_type_hash(pa), ammo.value_type_hash(pb));

        b.set_ammo("9mm", 31);
        let pb = b.field("Ammo");
        assert!(!ammo.identical(pa, pb));

        let value = struct_property(&ty);
        value.destroy_value(a.buffer.as_mut_ptr());
        value.destroy_value(b.buffer.as_mut_ptr());
    }
}

#[test]
fn test_array_identity_is_order_sensitive() {
    let ty = Arc::new(loadout_type(vector_type()));
    let items = ty.find_property("Items").unwrap();

    let mut a = Loadout::new(&ty);
    let mut b = Loadout::new(&ty);
    a.push_item("one");
    a.push_item("two");
    b.push_item("two");
    b.push_item("one");

    unsafe {
        assert!(!items.identical(a.field("Items"), b.field("Items")));

        let value = struct_property(&ty);
        value.destroy_value(a.buffer.as_mut_ptr());
        value.destroy_value(b.buffer.as_mut_ptr());
    }
}

#[test]
fn test_negative_zero_floats_hash_alike() {
    let vector = vector_type();
    let x = vector.find_property("X").unwrap();
    let positive = 0.0f32;
    let negative = -0.0f32;

    unsafe {
        let a = &positive as *const f32 as *const u8;
        let b = &negative as *const f32 as *const u8;
        assert!(x.identical(a, b));
        assert_eq!(x.value_type_hash(a), x.value_type_hash(b));
    }
}

#[test]
fn test_object_references_compare_by_address() {
    let ty = Arc::new(loadout_type(vector_type()));
    let target = ty.find_property("Target").unwrap();
    let mut first = 1u32;
    let mut second = 1u32;
    let a: *mut u32 = &mut first;
    let b: *mut u32 = &mut second;
    let c: *mut u32 = &mut first;

    unsafe {
        let pa = &a as *const *mut u32 as *const u8;
        let pb = &b as *const *mut u32 as *const u8;
        let pc = &c as *const *mut u32 as *const u8;
        assert!(!target.identical(pa, pb));
        assert!(target.identical(pa, pc));
        assert_eq!(target.value_type_hash(pa), target.value_type_hash(pc));
    }
}

#[test]
fn test_packed_booleans_copy_without_touching_siblings() {
    let ty = Arc::new(loadout_type(vector_type()));
    let primary = ty.find_property("bPrimary").unwrap();
    let locked = ty.find_property("bLocked").unwrap();
    assert_eq!(primary.offset(), locked.offset());

    let src = primary.field_mask().unwrap();
    let mut dest = locked.field_mask().unwrap();

    unsafe {
        primary.copy_single_value(&mut dest, &src);
        assert_eq!(primary.get_bool(&dest), Some(true));
        assert_eq!(locked.get_bool(&dest), Some(true));

        primary.initialize_value(&mut dest);
        assert_eq!(primary.get_bool(&dest), Some(false));
        assert_eq!(locked.get_bool(&dest), Some(true));
    }
}

#[test]
fn test_inner_fields() {
    let vector = vector_type();
    let ty = loadout_type(vector.clone());

    let items = ty.find_property("Items").unwrap().inner_fields();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0].kind(), PropertyKind::String));

    let ammo = ty.find_property("Ammo").unwrap().inner_fields();
    let names: Vec<&str> = ammo.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["Key", "Value"]);

    let spawn = ty.find_property("Spawn").unwrap().inner_fields();
    assert_eq!(spawn.len(), 3);
    assert_eq!(spawn[2].offset(), 8);

    assert!(ty.find_property("Target").unwrap().inner_fields().is_empty());
}
