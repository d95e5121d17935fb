//! Parameter Attribute Flags
//!
//! One word of attribute bits per parameter. The low bits select the type;
//! everything else is an independent attribute. `type_tag()` collapses the
//! type bits into the tag enum, with no type bit meaning a plain scalar.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// The value shape of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Scalar,
    Integer,
    /// Float printed in scientific notation.
    FloatE,
    /// Float printed in fixed notation.
    FloatF,
    Array,
    Hashed,
}

/// Attribute bitset for a parameter, and for the on/off request sets fed to
/// the reconciler.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamFlags(u32);

impl ParamFlags {
    pub const NONE: ParamFlags = ParamFlags(0);

    // Type bits.
    pub const ARRAY: ParamFlags = ParamFlags(1 << 0);
    pub const INTEGER: ParamFlags = ParamFlags(1 << 1);
    pub const EFLOAT: ParamFlags = ParamFlags(1 << 2);
    pub const FFLOAT: ParamFlags = ParamFlags(1 << 3);
    pub const HASHED: ParamFlags = ParamFlags(1 << 4);

    // Display attributes.
    pub const LEFT: ParamFlags = ParamFlags(1 << 5);
    pub const RIGHT_B: ParamFlags = ParamFlags(1 << 6);
    pub const RIGHT_Z: ParamFlags = ParamFlags(1 << 7);
    pub const LOWER: ParamFlags = ParamFlags(1 << 8);
    pub const UPPER: ParamFlags = ParamFlags(1 << 9);

    pub const READONLY: ParamFlags = ParamFlags(1 << 10);
    pub const TAGGED: ParamFlags = ParamFlags(1 << 11);
    pub const EXPORTED: ParamFlags = ParamFlags(1 << 12);
    pub const UNIQUE: ParamFlags = ParamFlags(1 << 13);
    /// Hide special behavior when made local.
    pub const HIDE: ParamFlags = ParamFlags(1 << 14);
    /// Value not shown by typeset listings.
    pub const HIDEVAL: ParamFlags = ParamFlags(1 << 15);
    /// Scalar tied to an array (or the array side of such a pair).
    pub const TIED: ParamFlags = ParamFlags(1 << 16);
    /// Create at the current scope level.
    pub const LOCAL: ParamFlags = ParamFlags(1 << 17);
    /// Backed by interpreter-internal state.
    pub const SPECIAL: ParamFlags = ParamFlags(1 << 18);
    /// Cannot be touched in restricted mode.
    pub const RESTRICTED: ParamFlags = ParamFlags(1 << 19);
    /// Declared but holding no value.
    pub const UNSET: ParamFlags = ParamFlags(1 << 20);
    /// Parameter provided lazily by a module.
    pub const AUTOLOAD: ParamFlags = ParamFlags(1 << 21);

    /// All type-selecting bits.
    pub const TYPE_BITS: ParamFlags = ParamFlags(
        Self::ARRAY.0 | Self::INTEGER.0 | Self::EFLOAT.0 | Self::FFLOAT.0 | Self::HASHED.0,
    );

    /// Bits whose change means a retype.
    pub const TYPE_CHANGE_BITS: ParamFlags = ParamFlags(
        Self::TYPE_BITS.0 | Self::TIED.0 | Self::AUTOLOAD.0,
    );

    /// Justification bits (all take a width argument).
    pub const JUSTIFY_BITS: ParamFlags =
        ParamFlags(Self::LEFT.0 | Self::RIGHT_B.0 | Self::RIGHT_Z.0);

    /// Numeric bits (all take a base/precision argument).
    pub const NUMERIC_BITS: ParamFlags =
        ParamFlags(Self::INTEGER.0 | Self::EFLOAT.0 | Self::FFLOAT.0);

    pub fn contains(self, other: ParamFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ParamFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: ParamFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ParamFlags) {
        self.0 &= !other.0;
    }

    /// The type tag implied by the type bits; no bit set means Scalar.
    pub fn type_tag(self) -> ParamType {
        if self.contains(Self::ARRAY) {
            ParamType::Array
        } else if self.contains(Self::HASHED) {
            ParamType::Hashed
        } else if self.contains(Self::INTEGER) {
            ParamType::Integer
        } else if self.contains(Self::EFLOAT) {
            ParamType::FloatE
        } else if self.contains(Self::FFLOAT) {
            ParamType::FloatF
        } else {
            ParamType::Scalar
        }
    }
}

impl BitOr for ParamFlags {
    type Output = ParamFlags;
    fn bitor(self, rhs: ParamFlags) -> ParamFlags {
        ParamFlags(self.0 | rhs.0)
    }
}

impl BitAnd for ParamFlags {
    type Output = ParamFlags;
    fn bitand(self, rhs: ParamFlags) -> ParamFlags {
        ParamFlags(self.0 & rhs.0)
    }
}

impl Not for ParamFlags {
    type Output = ParamFlags;
    fn not(self) -> ParamFlags {
        ParamFlags(!self.0)
    }
}

impl fmt::Debug for ParamFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamFlags({:#x})", self.0)
    }
}

/// Remove conflicting attribute requests before reconciling, mirroring the
/// sanity checks the typeset family performs on its flag sets. Returns the
/// adjusted `(on, off)` pair with `on` already cleared of `off` bits.
pub fn resolve_conflicts(mut on: ParamFlags, mut off: ParamFlags) -> (ParamFlags, ParamFlags) {
    if on.contains(ParamFlags::FFLOAT) {
        off.insert(
            ParamFlags::UPPER
                | ParamFlags::ARRAY
                | ParamFlags::HASHED
                | ParamFlags::INTEGER
                | ParamFlags::EFLOAT,
        );
        // Let `float -F` win over float's default -E.
        on.remove(ParamFlags::EFLOAT);
    }
    if on.contains(ParamFlags::EFLOAT) {
        off.insert(
            ParamFlags::UPPER
                | ParamFlags::ARRAY
                | ParamFlags::HASHED
                | ParamFlags::INTEGER
                | ParamFlags::FFLOAT,
        );
    }
    if on.contains(ParamFlags::INTEGER) {
        off.insert(
            ParamFlags::UPPER
                | ParamFlags::ARRAY
                | ParamFlags::HASHED
                | ParamFlags::EFLOAT
                | ParamFlags::FFLOAT,
        );
    }
    // -Z with -L is left justification with suppressed leading zeroes.
    if on.intersects(ParamFlags::LEFT | ParamFlags::RIGHT_Z) {
        off.insert(ParamFlags::RIGHT_B);
    }
    if on.contains(ParamFlags::RIGHT_B) {
        off.insert(ParamFlags::LEFT | ParamFlags::RIGHT_Z);
    }
    if on.contains(ParamFlags::UPPER) {
        off.insert(ParamFlags::LOWER);
    }
    if on.contains(ParamFlags::LOWER) {
        off.insert(ParamFlags::UPPER);
    }
    if on.contains(ParamFlags::HASHED) {
        off.insert(ParamFlags::ARRAY);
    }
    if on.contains(ParamFlags::TIED) {
        off.insert(
            ParamFlags::INTEGER
                | ParamFlags::EFLOAT
                | ParamFlags::FFLOAT
                | ParamFlags::ARRAY
                | ParamFlags::HASHED,
        );
    }
    on = on & !off;
    (on, off)
}
