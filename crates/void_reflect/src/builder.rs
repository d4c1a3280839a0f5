//! Type layout builder
//!
//! Lays out properties the way a C compiler would: each field at the next
//! offset satisfying its alignment, the total size rounded up to the
//! largest alignment. Consecutive bitfield booleans share one byte until
//! its eight bits are used up. Fields may also be pinned to an explicit
//! offset to mirror an existing native layout.

use crate::descriptor::TypeDescriptor;
use crate::error::{ReflectError, Result};
use crate::flags::PropertyFlags;
use crate::kind::PropertyKind;
use crate::property::Property;
use crate::align_up;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Declaration of one property to be laid out
#[derive(Debug, Clone)]
pub struct PropertySpec {
    name: String,
    kind: PropertyKind,
    array_dim: usize,
    flags: PropertyFlags,
    offset: Option<usize>,
    bitfield: bool,
}

impl PropertySpec {
    /// A single-element property of `kind`
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            array_dim: 1,
            flags: PropertyFlags::empty(),
            offset: None,
            bitfield: false,
        }
    }

    /// A boolean packed into a shared byte
    pub fn bitfield(name: impl Into<String>) -> Self {
        Self {
            bitfield: true,
            ..Self::new(name, PropertyKind::Bool { field_mask: 0 })
        }
    }

    /// Number of inline elements
    pub fn array_dim(mut self, array_dim: usize) -> Self {
        self.array_dim = array_dim;
        self
    }

    /// Semantic flags
    pub fn flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Pin the property to `offset` instead of the next free slot
    ///
    /// For bitfields this names the shared byte; the lowest free bit in it is used.
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Builds a [`TypeDescriptor`] from property declarations
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    super_type: Option<Arc<TypeDescriptor>>,
    specs: Vec<PropertySpec>,
}

impl TypeBuilder {
    /// Start a new type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_type: None,
            specs: Vec::new(),
        }
    }

    /// Inherit the layout of `super_type`; own properties start after it
    pub fn extends(mut self, super_type: Arc<TypeDescriptor>) -> Self {
        self.super_type = Some(super_type);
        self
    }

    /// Add a property declaration
    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Add a single-element property
    pub fn field(self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.property(PropertySpec::new(name, kind))
    }

    /// Add a packed boolean
    pub fn bitfield(self, name: impl Into<String>) -> Self {
        self.property(PropertySpec::bitfield(name))
    }

    /// Compute the layout
    pub fn build(self) -> Result<TypeDescriptor> {
        let TypeBuilder { name, super_type, specs } = self;
        let mut layout = Layout::new(name.clone(), super_type.as_deref());
        let mut properties = Vec::with_capacity(specs.len());
        let mut names = HashSet::new();

        for spec in specs {
            let inherited = super_type
                .as_ref()
                .map_or(false, |parent| parent.find_property(&spec.name).is_some());
            if inherited || !names.insert(spec.name.clone()) {
                return Err(ReflectError::duplicate_property(&name, &spec.name));
            }
            if spec.array_dim == 0 {
                return Err(ReflectError::ZeroArrayDim {
                    type_name: name,
                    property: spec.name,
                });
            }

            let property = if spec.bitfield {
                layout.place_bitfield(spec)?
            } else {
                layout.place_field(spec)?
            };
            properties.push(property);
        }

        let size = match checked_align_up(layout.cursor.max(1), layout.align) {
            Some(size) if size <= i32::MAX as usize => size,
            _ => return Err(ReflectError::TypeTooLarge(name)),
        };

        log::trace!(
            "Laid out '{}': {} bytes, align {}, {} properties",
            name,
            size,
            layout.align,
            properties.len()
        );

        Ok(TypeDescriptor::from_parts(name, size, layout.align, super_type, properties))
    }
}

/// Running state of the layout pass
struct Layout {
    type_name: String,
    cursor: usize,
    align: usize,
    /// Byte ranges taken so far, with the name of the property that took them
    occupied: Vec<(usize, usize, String)>,
    /// Used bits of every bitfield byte
    bit_bytes: BTreeMap<usize, u8>,
    /// Byte of the most recent bitfield, while no other field followed it
    open_bitfield: Option<usize>,
}

impl Layout {
    fn new(type_name: String, super_type: Option<&TypeDescriptor>) -> Self {
        let mut occupied = Vec::new();
        let (cursor, align) = match super_type {
            Some(parent) => {
                occupied.push((0, parent.size(), parent.name().to_string()));
                (parent.size(), parent.align())
            }
            None => (0, 1),
        };

        Self {
            type_name,
            cursor,
            align,
            occupied,
            bit_bytes: BTreeMap::new(),
            open_bitfield: None,
        }
    }

    fn claim(&mut self, start: usize, end: usize, property: &str) -> Result<()> {
        if let Some((_, _, other)) = self
            .occupied
            .iter()
            .find(|(taken_start, taken_end, _)| start < *taken_end && *taken_start < end)
        {
            return Err(ReflectError::overlapping(&self.type_name, property, other.clone()));
        }
        self.occupied.push((start, end, property.to_string()));
        self.cursor = self.cursor.max(end);
        Ok(())
    }

    fn place_bitfield(&mut self, spec: PropertySpec) -> Result<Property> {
        if spec.array_dim != 1 {
            return Err(ReflectError::BitfieldArray {
                type_name: self.type_name.clone(),
                property: spec.name,
                array_dim: spec.array_dim,
            });
        }

        let byte = match (spec.offset, self.open_bitfield) {
            (Some(offset), _) => offset,
            (None, Some(open)) if self.bit_bytes.get(&open) != Some(&0xFF) => open,
            (None, _) => self.cursor,
        };

        if !self.bit_bytes.contains_key(&byte) {
            let end = byte.checked_add(1).ok_or_else(|| self.too_large())?;
            self.claim(byte, end, &spec.name)?;
        }

        let used = self.bit_bytes.entry(byte).or_insert(0);
        if *used == 0xFF {
            return Err(ReflectError::BitfieldByteFull {
                type_name: self.type_name.clone(),
                property: spec.name,
                offset: byte,
            });
        }
        let field_mask = 1u8 << (!*used).trailing_zeros();
        *used |= field_mask;
        self.open_bitfield = Some(byte);

        Ok(Property::new(spec.name, PropertyKind::Bool { field_mask }, byte, 1, spec.flags))
    }

    fn place_field(&mut self, spec: PropertySpec) -> Result<Property> {
        self.open_bitfield = None;

        if let PropertyKind::Bool { field_mask: 0 } = spec.kind {
            return Err(ReflectError::ZeroFieldMask {
                type_name: self.type_name.clone(),
                property: spec.name,
            });
        }

        let (element_size, align) = spec.kind.layout();
        let total = element_size
            .checked_mul(spec.array_dim)
            .ok_or_else(|| self.too_large())?;

        let offset = match spec.offset {
            Some(offset) if offset % align != 0 => {
                return Err(ReflectError::Misaligned {
                    type_name: self.type_name.clone(),
                    property: spec.name,
                    offset,
                    align,
                });
            }
            Some(offset) => offset,
            None => checked_align_up(self.cursor, align).ok_or_else(|| self.too_large())?,
        };

        let end = offset.checked_add(total).ok_or_else(|| self.too_large())?;
        self.claim(offset, end, &spec.name)?;
        self.align = self.align.max(align);

        let mut flags = spec.flags;
        if spec.array_dim > 1 {
            flags |= PropertyFlags::EDIT_FIXED_SIZE;
        }
        Ok(Property::new(spec.name, spec.kind, offset, spec.array_dim, flags))
    }

    fn too_large(&self) -> ReflectError {
        ReflectError::TypeTooLarge(self.type_name.clone())
    }
}

/// [`align_up`] that reports overflow instead of wrapping
fn checked_align_up(value: usize, align: usize) -> Option<usize> {
    value.checked_add(align - 1).map(|_| align_up(value, align))
}
