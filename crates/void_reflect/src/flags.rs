//! Property flag bitset

/// Semantic attributes attached to a property (bitflags-style)
///
/// Flags are fixed when the owning type is built and never change afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PropertyFlags(u64);

impl PropertyFlags {
    /// No flags
    pub const NONE: Self = Self(0);

    /// Editable from tooling
    pub const EDIT: Self = Self(1 << 0);

    /// Constant function parameter
    pub const CONST_PARM: Self = Self(1 << 1);

    /// Visible to scripts
    pub const BLUEPRINT_VISIBLE: Self = Self(1 << 2);

    /// Exported to text
    pub const EXPORT_OBJECT: Self = Self(1 << 3);

    /// Scripts may read but not write
    pub const BLUEPRINT_READ_ONLY: Self = Self(1 << 4);

    /// Replicated over the network
    pub const NET: Self = Self(1 << 5);

    /// Fixed-size inline array
    pub const EDIT_FIXED_SIZE: Self = Self(1 << 6);

    /// Function parameter
    pub const PARM: Self = Self(1 << 7);

    /// Output parameter
    pub const OUT_PARM: Self = Self(1 << 8);

    /// Zero-initialized constructor is enough
    pub const ZERO_CONSTRUCTOR: Self = Self(1 << 9);

    /// Return value of a function
    pub const RETURN_PARM: Self = Self(1 << 10);

    /// Not saved or loaded
    pub const TRANSIENT: Self = Self(1 << 13);

    /// Loaded from configuration
    pub const CONFIG: Self = Self(1 << 14);

    /// Read only, value cannot change after construction
    pub const READ_ONLY: Self = Self(1 << 15);

    /// Included in save games
    pub const SAVE_GAME: Self = Self(1 << 24);

    /// Cannot be cleared in tooling
    pub const NO_CLEAR: Self = Self(1 << 25);

    /// Kept for compatibility, should not be used
    pub const DEPRECATED: Self = Self(1 << 29);

    /// Value is plain old data (memcpy/memcmp are valid)
    pub const IS_PLAIN_OLD_DATA: Self = Self(1 << 30);

    /// Calls a notify function when replicated
    pub const REP_NOTIFY: Self = Self(1 << 32);

    /// Animatable
    pub const INTERP: Self = Self(1 << 33);

    /// Value has no destructor work to do
    pub const NO_DESTRUCTOR: Self = Self(1 << 39);

    /// Create empty flags
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get raw bits
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Check if empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True if any bit of `other` is set
    #[inline]
    pub const fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// True if every bit of `other` is set
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Insert a flag
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Remove a flag
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Union of two flag sets
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for PropertyFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for PropertyFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for PropertyFlags {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
