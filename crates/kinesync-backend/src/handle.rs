// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Backend-issued collidable handles.
//!
//! Static and body handles live in independent numeric domains: a static and
//! a body may carry the same raw value. Identity is always the pair
//! (subtype, value), which [`CollidableReference`] encodes as a tagged union.

use core::fmt;

/// Handle of a static collidable inside the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StaticHandle(pub u32);

/// Handle of a dynamic body inside the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u32);

impl StaticHandle {
    /// Raw handle value (meaningful only within the static handle space).
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl BodyHandle {
    /// Raw handle value (meaningful only within the body handle space).
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StaticHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to one side of a reported contact.
///
/// Ordering places every static before every body, then orders by handle
/// value, which gives the broad phase a canonical pair order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollidableReference {
    /// A static collidable.
    Static(StaticHandle),
    /// A dynamic body.
    Body(BodyHandle),
}

impl CollidableReference {
    /// Returns `true` for references into the body handle space.
    pub const fn is_body(&self) -> bool {
        matches!(self, Self::Body(_))
    }
}

impl From<StaticHandle> for CollidableReference {
    fn from(value: StaticHandle) -> Self {
        Self::Static(value)
    }
}

impl From<BodyHandle> for CollidableReference {
    fn from(value: BodyHandle) -> Self {
        Self::Body(value)
    }
}

impl fmt::Display for CollidableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(h) => write!(f, "static:{}", h.0),
            Self::Body(h) => write!(f, "body:{}", h.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statics_order_before_bodies() {
        let s = CollidableReference::from(StaticHandle(9));
        let b = CollidableReference::from(BodyHandle(0));
        assert!(s < b);
        assert!(!s.is_body());
        assert!(b.is_body());
        assert_eq!(b.to_string(), "body:0");
    }
}
