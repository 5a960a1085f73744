//! The flat constant lattice over integers, with derived parity.
//!
//! ```text
//!           ⊤ (Top: could be anything)
//!          / | \
//!    ... Value(n) ...
//!          \ | /
//!           ⊥ (Bottom: no information / unreachable)
//! ```
//!
//! `Bottom` is the join-identity, `Top` is join-absorbing. Parity is a view
//! derived from the concrete value; `Top` and `Bottom` have unknown parity by
//! construction, so the "parity is only meaningful for concrete values"
//! invariant cannot be violated.

use std::fmt;

use rand::Rng;

use crate::tribool::Tribool;

/// Upper bound (exclusive) for values produced by [`AbstractConstant::randomize`].
pub const RANDOM_BOUND: i64 = 30;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Parity {
    Even,
    Odd,
    Unknown,
}

impl Parity {
    /// Parity of a concrete integer.
    pub fn of(value: i64) -> Self {
        if value.rem_euclid(2) == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}

/// One element of the flat constant lattice.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AbstractConstant {
    /// No information / unreachable.
    Bottom,
    /// Exactly this integer.
    Value(i64),
    /// Could be any integer.
    Top,
}

impl AbstractConstant {
    pub const fn is_top(self) -> bool {
        matches!(self, AbstractConstant::Top)
    }

    pub const fn is_bottom(self) -> bool {
        matches!(self, AbstractConstant::Bottom)
    }

    /// `true` iff this is a concrete value (neither Top nor Bottom).
    pub const fn is_concrete(self) -> bool {
        matches!(self, AbstractConstant::Value(_))
    }

    pub const fn value(self) -> Option<i64> {
        match self {
            AbstractConstant::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Parity of this element; `Unknown` unless concrete.
    pub fn parity(self) -> Parity {
        match self {
            AbstractConstant::Value(v) => Parity::of(v),
            _ => Parity::Unknown,
        }
    }

    /// Least upper bound on the flat lattice.
    ///
    /// Commutative, associative, idempotent; `Bottom` is the identity and
    /// `Top` absorbs. Two distinct concrete values widen to `Top`.
    pub fn join(self, other: AbstractConstant) -> AbstractConstant {
        use AbstractConstant::{Bottom, Top, Value};
        match (self, other) {
            (Top, _) | (_, Top) => Top,
            (Bottom, x) | (x, Bottom) => x,
            (Value(a), Value(b)) => {
                if a == b {
                    Value(a)
                } else {
                    Top
                }
            }
        }
    }

    /// Three-valued equality.
    ///
    /// Both Top, both Bottom, or equal concrete values are `True`; a Top
    /// against a concrete value is `Unknown`; everything else is `False`.
    pub fn tri_eq(self, other: AbstractConstant) -> Tribool {
        use AbstractConstant::{Bottom, Top, Value};
        match (self, other) {
            (Top, Top) | (Bottom, Bottom) => Tribool::True,
            (Value(a), Value(b)) => (a == b).into(),
            (Top, Value(_)) | (Value(_), Top) => Tribool::Unknown,
            _ => Tribool::False,
        }
    }

    /// Shift a concrete value by `delta`; Top and Bottom are unaffected.
    ///
    /// Used by the increment/decrement transfer functions.
    pub fn offset(self, delta: i64) -> AbstractConstant {
        match self {
            AbstractConstant::Value(v) => AbstractConstant::Value(v.wrapping_add(delta)),
            other => other,
        }
    }

    /// Replace this element with an arbitrary concrete value.
    ///
    /// Models nondeterministic assignment; only "the result is concrete" is
    /// a contract, the distribution is not.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        *self = AbstractConstant::Value(rng.gen_range(0..RANDOM_BOUND));
    }
}

impl Default for AbstractConstant {
    fn default() -> Self {
        AbstractConstant::Bottom
    }
}

impl fmt::Display for AbstractConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractConstant::Bottom => write!(f, "bottom"),
            AbstractConstant::Value(v) => write!(f, "{}", v),
            AbstractConstant::Top => write!(f, "top"),
        }
    }
}
