//! Kleene three-valued logic.
//!
//! Every predicate evaluated against an abstract state yields a [`Tribool`]:
//! `True`, `False`, or `Unknown` when the state is too imprecise to decide.
//! Conjunction and disjunction follow Kleene's strong logic: `False`
//! dominates AND, `True` dominates OR, and `Unknown` wins the remaining
//! mixed cases.

use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr, Not};

use crate::error::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tribool {
    False,
    Unknown,
    True,
}

impl Tribool {
    /// Build a tribool from the raw encoding `1` / `0` / `-1`.
    ///
    /// Any other value is rejected with [`Error::InvalidTriboolValue`].
    pub fn from_raw(raw: i8) -> Result<Self, Error> {
        match raw {
            1 => Ok(Tribool::True),
            0 => Ok(Tribool::Unknown),
            -1 => Ok(Tribool::False),
            _ => Err(Error::InvalidTriboolValue(raw)),
        }
    }

    pub const fn is_true(self) -> bool {
        matches!(self, Tribool::True)
    }

    pub const fn is_false(self) -> bool {
        matches!(self, Tribool::False)
    }

    /// Kleene AND: `False` dominates, then `Unknown`.
    pub const fn and(self, other: Tribool) -> Tribool {
        match (self, other) {
            (Tribool::False, _) | (_, Tribool::False) => Tribool::False,
            (Tribool::True, Tribool::True) => Tribool::True,
            _ => Tribool::Unknown,
        }
    }

    /// Kleene OR: `True` dominates, then `Unknown`.
    pub const fn or(self, other: Tribool) -> Tribool {
        match (self, other) {
            (Tribool::True, _) | (_, Tribool::True) => Tribool::True,
            (Tribool::False, Tribool::False) => Tribool::False,
            _ => Tribool::Unknown,
        }
    }
}

impl From<bool> for Tribool {
    fn from(value: bool) -> Self {
        if value {
            Tribool::True
        } else {
            Tribool::False
        }
    }
}

impl BitAnd for Tribool {
    type Output = Tribool;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Tribool {
    type Output = Tribool;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for Tribool {
    type Output = Tribool;

    fn not(self) -> Self::Output {
        match self {
            Tribool::True => Tribool::False,
            Tribool::False => Tribool::True,
            Tribool::Unknown => Tribool::Unknown,
        }
    }
}

impl Display for Tribool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tribool::True => write!(f, "true"),
            Tribool::False => write!(f, "false"),
            Tribool::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Tribool::{False, True, Unknown};

    #[test]
    fn test_and_table() {
        assert_eq!(True & True, True);
        assert_eq!(True & False, False);
        assert_eq!(True & Unknown, Unknown);
        assert_eq!(False & False, False);
        assert_eq!(False & Unknown, False);
        assert_eq!(Unknown & Unknown, Unknown);
    }

    #[test]
    fn test_or_table() {
        assert_eq!(True | True, True);
        assert_eq!(True | False, True);
        assert_eq!(True | Unknown, True);
        assert_eq!(False | False, False);
        assert_eq!(False | Unknown, Unknown);
        assert_eq!(Unknown | Unknown, Unknown);
    }

    #[test]
    fn test_commutative() {
        for a in [True, False, Unknown] {
            for b in [True, False, Unknown] {
                assert_eq!(a & b, b & a);
                assert_eq!(a | b, b | a);
            }
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(!True, False);
        assert_eq!(!False, True);
        assert_eq!(!Unknown, Unknown);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(Tribool::from_raw(1), Ok(True));
        assert_eq!(Tribool::from_raw(0), Ok(Unknown));
        assert_eq!(Tribool::from_raw(-1), Ok(False));
        assert_eq!(Tribool::from_raw(2), Err(Error::InvalidTriboolValue(2)));
        assert_eq!(Tribool::from_raw(-5), Err(Error::InvalidTriboolValue(-5)));
    }
}
