//! Property descriptors and the per-object property table
//!
//! Properties are flagged slots holding either a stored value (data) or a
//! getter/setter pair (accessor). The table maps normalized property names
//! to descriptors and keeps insertion order, because enumeration order is
//! observable by scripts.
//!
//! Name normalization upper-cases the name when the context's
//! case-sensitivity policy is off. The table is a real map keyed by the
//! normalized name; there is no reserved-prefix escaping — internal
//! bookkeeping (the prototype link) lives outside the table, so names
//! starting with `_` cannot collide with anything.

use indexmap::IndexMap;
use std::ops::{BitAnd, BitOr};

use crate::context::Context;
use crate::runtime::function::Callable;
use crate::value::Value;

/// Property flags bit set.
///
/// `DONT_ENUM`, `DONT_DELETE` and `READ_ONLY` map to the user-settable
/// `ASSetPropFlags` bits; `DATA`/`ACCESSOR` is the storage discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyFlags(u16);

impl PropertyFlags {
    /// No flags set.
    pub const EMPTY: PropertyFlags = PropertyFlags(0);
    /// Skipped by enumeration.
    pub const DONT_ENUM: PropertyFlags = PropertyFlags(1);
    /// Cannot be deleted.
    pub const DONT_DELETE: PropertyFlags = PropertyFlags(2);
    /// Cannot be written through `put`.
    pub const READ_ONLY: PropertyFlags = PropertyFlags(4);
    /// Descriptor stores a value.
    pub const DATA: PropertyFlags = PropertyFlags(64);
    /// Descriptor stores a getter/setter pair.
    pub const ACCESSOR: PropertyFlags = PropertyFlags(128);

    /// Preset for natively installed data members.
    pub const NATIVE_MEMBER: PropertyFlags =
        PropertyFlags(Self::DATA.0 | Self::DONT_DELETE.0 | Self::DONT_ENUM.0);
    /// Preset for natively installed accessors.
    pub const NATIVE_ACCESSOR: PropertyFlags =
        PropertyFlags(Self::ACCESSOR.0 | Self::DONT_DELETE.0 | Self::DONT_ENUM.0);
    /// The subset user-level flag setting (`ASSetPropFlags`) may touch.
    pub const SET_PROP_FLAGS_MASK: PropertyFlags =
        PropertyFlags(Self::DONT_DELETE.0 | Self::DONT_ENUM.0 | Self::READ_ONLY.0);

    /// Check whether every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: PropertyFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Return these flags with the bits of `other` added.
    #[inline]
    pub fn with(self, other: PropertyFlags) -> PropertyFlags {
        PropertyFlags(self.0 | other.0)
    }

    /// Return these flags with the bits of `other` removed.
    #[inline]
    pub fn without(self, other: PropertyFlags) -> PropertyFlags {
        PropertyFlags(self.0 & !other.0)
    }

    /// Keep only the bits inside `mask`.
    #[inline]
    pub fn masked(self, mask: PropertyFlags) -> PropertyFlags {
        PropertyFlags(self.0 & mask.0)
    }

    /// Check if no flags are set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PropertyFlags {
    type Output = PropertyFlags;
    fn bitor(self, rhs: PropertyFlags) -> PropertyFlags {
        self.with(rhs)
    }
}

impl BitAnd for PropertyFlags {
    type Output = PropertyFlags;
    fn bitand(self, rhs: PropertyFlags) -> PropertyFlags {
        self.masked(rhs)
    }
}

/// A flagged slot describing one named property.
///
/// Invariant: `DATA` descriptors carry a value and no accessors; `ACCESSOR`
/// descriptors carry getter and/or setter (both absent is legal — the
/// property reads as undefined and writes are no-ops) and no value. The
/// constructors below enforce this.
#[derive(Clone)]
pub struct PropertyDescriptor {
    /// Flag bits including the storage discriminant.
    pub flags: PropertyFlags,
    /// Stored value, for data descriptors.
    pub value: Option<Value>,
    /// Getter, for accessor descriptors.
    pub get: Option<Callable>,
    /// Setter, for accessor descriptors.
    pub set: Option<Callable>,
}

impl PropertyDescriptor {
    /// Create a data descriptor. The `DATA` bit is forced on and the
    /// `ACCESSOR` bit off regardless of `flags`.
    pub fn data(value: Value, flags: PropertyFlags) -> Self {
        PropertyDescriptor {
            flags: flags.with(PropertyFlags::DATA).without(PropertyFlags::ACCESSOR),
            value: Some(value),
            get: None,
            set: None,
        }
    }

    /// Create an accessor descriptor. The `ACCESSOR` bit is forced on and
    /// the `DATA` bit off regardless of `flags`.
    pub fn accessor(get: Option<Callable>, set: Option<Callable>, flags: PropertyFlags) -> Self {
        PropertyDescriptor {
            flags: flags.with(PropertyFlags::ACCESSOR).without(PropertyFlags::DATA),
            value: None,
            get,
            set,
        }
    }

    /// Data descriptor with the native-member preset.
    pub fn native_member(value: Value) -> Self {
        Self::data(value, PropertyFlags::NATIVE_MEMBER)
    }

    /// Accessor descriptor with the native-accessor preset.
    pub fn native_accessor(get: Option<Callable>, set: Option<Callable>) -> Self {
        Self::accessor(get, set, PropertyFlags::NATIVE_ACCESSOR)
    }

    /// Check if this is a data descriptor.
    #[inline]
    pub fn is_data(&self) -> bool {
        self.flags.contains(PropertyFlags::DATA)
    }

    /// Check if this is an accessor descriptor.
    #[inline]
    pub fn is_accessor(&self) -> bool {
        self.flags.contains(PropertyFlags::ACCESSOR)
    }

    /// Check if enumeration skips this property.
    #[inline]
    pub fn is_dont_enum(&self) -> bool {
        self.flags.contains(PropertyFlags::DONT_ENUM)
    }
}

/// Normalize a property name under the context's case policy.
pub fn normalize_name(ctx: &Context, name: &str) -> Box<str> {
    if ctx.is_case_sensitive() {
        name.into()
    } else {
        name.to_uppercase().into()
    }
}

/// Insertion-ordered map from normalized property name to descriptor.
///
/// Lookup order is not semantically significant, but enumeration must
/// follow insertion order; overwriting an existing key keeps its original
/// position.
#[derive(Default)]
pub struct PropertyTable {
    entries: IndexMap<Box<str>, PropertyDescriptor>,
}

impl PropertyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        PropertyTable {
            entries: IndexMap::new(),
        }
    }

    /// Number of properties.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a descriptor by normalized key.
    pub fn get_own(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.entries.get(key)
    }

    /// Look up a descriptor mutably by normalized key.
    pub fn get_own_mut(&mut self, key: &str) -> Option<&mut PropertyDescriptor> {
        self.entries.get_mut(key)
    }

    /// Insert or overwrite a descriptor. Overwriting preserves the key's
    /// original insertion position.
    pub fn set_own(&mut self, key: Box<str>, desc: PropertyDescriptor) {
        self.entries.insert(key, desc);
    }

    /// Remove a descriptor by normalized key. A later re-insert of the same
    /// key enumerates last, so removal shifts rather than swaps.
    ///
    /// Returns true if the key existed.
    pub fn delete_own(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    /// Check whether a key exists.
    pub fn has_own(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate the enumerable keys in insertion order.
    pub fn enumerable_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, desc)| !desc.is_dont_enum())
            .map(|(key, _)| key.as_ref())
    }

    /// Iterate all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.entries.iter().map(|(key, desc)| (key.as_ref(), desc))
    }
}
