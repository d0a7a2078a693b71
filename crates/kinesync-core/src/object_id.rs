// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Game-object identities and their seeded generator.
//!
//! An [`ObjectId`] is a 64-bit value whose low 32 bits form the object's
//! identifier and whose high bits carry [`ObjectIdFlags`]. Physics entities
//! record the id of the game object that owns them so collision callbacks can
//! map a partner entity back to a game object.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use kinesync_geom::Prng;
use serde::{Deserialize, Serialize};

const FLAGGED_RANGE: (u64, u64) = (1_000_000_000, 2_000_000_000);
const STANDALONE_RANGE: (u64, u64) = (1_000_000_000_000_000_000, 1_999_999_999_999_999_999);

/// Identity of a game object.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The reserved "no object" id.
    pub const INVALID: Self = Self(0);

    /// Wraps a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw 64-bit value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Low 32 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn identifier(self) -> u32 {
        (self.0 & 0xffff_ffff) as u32
    }

    /// Flag bits set on this id.
    pub const fn flags(self) -> ObjectIdFlags {
        ObjectIdFlags(self.0 & ObjectIdFlags::ALL.0)
    }

    /// Whether this is anything other than [`ObjectId::INVALID`].
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ObjectId> for u64 {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// High-bit markers carried by an [`ObjectId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ObjectIdFlags(u64);

impl ObjectIdFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Object created by a client rather than the server.
    pub const CLIENT: Self = Self(1 << 46);
    /// Object produced by a spawner.
    pub const SPAWNED: Self = Self(1 << 58);
    /// Object backed by persistent storage.
    pub const PERSISTENT: Self = Self(1 << 60);
    /// Player character.
    pub const CHARACTER: Self = Self(1 << 61);
    /// Union of every known flag.
    pub const ALL: Self = Self(Self::CLIENT.0 | Self::SPAWNED.0 | Self::PERSISTENT.0 | Self::CHARACTER.0);

    /// Raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ObjectIdFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ObjectIdFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Seeded source of fresh [`ObjectId`]s.
///
/// Two generators built from the same seed hand out the same sequence.
#[derive(Debug, Clone)]
pub struct ObjectIdGenerator {
    prng: Prng,
}

impl ObjectIdGenerator {
    /// Creates a generator from a 64-bit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            prng: Prng::from_seed_u64(seed),
        }
    }

    /// An id in `[1e18, 2e18)` for objects that exist on their own.
    pub fn standalone(&mut self) -> ObjectId {
        ObjectId(self.prng.next_u64_range(STANDALONE_RANGE.0, STANDALONE_RANGE.1))
    }

    /// An id in `[1e9, 2e9)` with `flags` OR'd into the high bits.
    pub fn flagged(&mut self, flags: ObjectIdFlags) -> ObjectId {
        let base = self.prng.next_u64_range(FLAGGED_RANGE.0, FLAGGED_RANGE.1);
        ObjectId(base | flags.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_low_word() {
        let id = ObjectId::new((1 << 60) | 0xdead_beef);
        assert_eq!(id.identifier(), 0xdead_beef);
        assert!(id.flags().contains(ObjectIdFlags::PERSISTENT));
        assert!(!id.flags().contains(ObjectIdFlags::CHARACTER));
    }

    #[test]
    fn invalid_is_zero() {
        assert_eq!(ObjectId::INVALID.value(), 0);
        assert!(!ObjectId::INVALID.is_valid());
        assert_eq!(ObjectId::default(), ObjectId::INVALID);
    }

    #[test]
    fn generated_ids_fall_in_their_ranges() {
        let mut ids = ObjectIdGenerator::from_seed(42);
        for _ in 0..256 {
            let standalone = ids.standalone().value();
            assert!((STANDALONE_RANGE.0..STANDALONE_RANGE.1).contains(&standalone));

            let flagged = ids.flagged(ObjectIdFlags::SPAWNED | ObjectIdFlags::CLIENT);
            let base = flagged.value() & !ObjectIdFlags::ALL.bits();
            assert!((FLAGGED_RANGE.0..FLAGGED_RANGE.1).contains(&base));
            assert!(flagged.flags().contains(ObjectIdFlags::SPAWNED));
            assert!(flagged.flags().contains(ObjectIdFlags::CLIENT));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ObjectIdGenerator::from_seed(7);
        let mut b = ObjectIdGenerator::from_seed(7);
        for _ in 0..32 {
            assert_eq!(a.standalone(), b.standalone());
        }
    }

    #[test]
    fn serializes_as_bare_number() {
        let id = ObjectId::new(1_234_567);
        assert_eq!(serde_json::to_string(&id).unwrap(), "1234567");
    }
}
