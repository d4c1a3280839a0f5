//! Type descriptors
//!
//! A [`TypeDescriptor`] is the immutable layout of one native struct or
//! class. It owns its property descriptors; references handed out by
//! [`TypeDescriptor::find_property`] stay valid for as long as the
//! descriptor is alive.

use crate::property::Property;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Layout of a native struct or class
pub struct TypeDescriptor {
    name: String,
    size: usize,
    align: usize,
    super_type: Option<Arc<TypeDescriptor>>,
    properties: Vec<Property>,
    by_name: HashMap<String, usize>,
}

impl TypeDescriptor {
    pub(crate) fn from_parts(
        name: String,
        size: usize,
        align: usize,
        super_type: Option<Arc<TypeDescriptor>>,
        properties: Vec<Property>,
    ) -> Self {
        let by_name = properties
            .iter()
            .enumerate()
            .map(|(index, property)| (property.name().to_string(), index))
            .collect();

        Self {
            name,
            size,
            align,
            super_type,
            properties,
            by_name,
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance size in bytes, including inherited fields and padding
    pub fn size(&self) -> usize {
        self.size
    }

    /// Instance alignment
    pub fn align(&self) -> usize {
        self.align
    }

    /// Parent layout, if this type extends another
    pub fn super_type(&self) -> Option<&Arc<TypeDescriptor>> {
        self.super_type.as_ref()
    }

    /// Properties declared directly on this type, in layout order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Find a property declared on this type or inherited from its parents
    ///
    /// Names match exactly (case-sensitive). Own properties are checked
    /// before the parent chain.
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(&index) = ty.by_name.get(name) {
                return Some(&ty.properties[index]);
            }
            current = ty.super_type.as_deref();
        }
        None
    }

    /// Every property of the layout, inherited ones first
    pub fn all_properties(&self) -> Box<dyn Iterator<Item = &Property> + '_> {
        let inherited: Box<dyn Iterator<Item = &Property> + '_> = match &self.super_type {
            Some(parent) => parent.all_properties(),
            None => Box::new(std::iter::empty()),
        };
        Box::new(inherited.chain(self.properties.iter()))
    }

    /// True if `self` is `other` or extends it
    pub fn is_child_of(&self, other: &TypeDescriptor) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if std::ptr::eq(ty, other) {
                return true;
            }
            current = ty.super_type.as_deref();
        }
        false
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .field("super_type", &self.super_type.as_ref().map(|s| s.name()))
            .field("properties", &self.properties.len())
            .finish()
    }
}
