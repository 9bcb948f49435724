//! Literals and variables.
use std::{fmt, ops};

use serde::{Deserialize, Serialize};

/// The backing type used to represent literals and variables.
pub type LitIdx = u32;

/// A boolean variable.
///
/// Internally variables are numbered starting from 0. For input and output a
/// 1-based numbering is used, matching the DIMACS CNF convention, so that a
/// negated variable can be written as a negative integer.
///
/// Creating a variable with an index beyond `Var::max_var().index()` is not
/// supported and may panic or alias another variable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Var {
    index: LitIdx,
}

impl Var {
    /// Creates a variable from a 0-based index.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        debug_assert!(index <= Var::max_var().index());
        Var {
            index: index as LitIdx,
        }
    }

    /// Creates a variable from a positive 1-based number as used in the DIMACS
    /// CNF encoding.
    #[inline]
    pub fn from_dimacs(number: isize) -> Var {
        debug_assert!(number > 0);
        Var::from_index((number - 1) as usize)
    }

    /// The 0-based index of this variable.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// The 1-based number of this variable in the DIMACS CNF encoding.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        (self.index + 1) as isize
    }

    /// The variable with the largest supported index.
    ///
    /// This leaves headroom in the backing type for a sign bit and sentinel
    /// values stored alongside a variable index.
    pub const fn max_var() -> Var {
        Var {
            index: LitIdx::max_value() >> 2,
        }
    }

    /// Largest number of variables supported.
    ///
    /// This is exactly `Var::max_var().index() + 1`.
    pub const fn max_count() -> usize {
        Self::max_var().index() + 1
    }

    /// Creates a literal from this variable and a `bool` that is `true` for
    /// the positive literal.
    #[inline]
    pub fn lit(self, polarity: bool) -> Lit {
        Lit::from_var(self, polarity)
    }

    /// Creates the positive literal of this variable.
    #[inline]
    pub fn positive(self) -> Lit {
        self.lit(true)
    }

    /// Creates the negative literal of this variable.
    #[inline]
    pub fn negative(self) -> Lit {
        self.lit(false)
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A boolean literal, i.e. a variable or a negated variable.
///
/// A literal is stored as an integer that is twice the variable index for a
/// positive literal and one more for a negative literal. This integer is
/// called the `code` of the literal, so the sign lives in the lowest bit and
/// negation is a single xor.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Lit {
    code: LitIdx,
}

impl Lit {
    /// Creates a literal from a variable and a `bool` that is `true` for the
    /// positive literal.
    #[inline]
    pub fn from_var(var: Var, polarity: bool) -> Lit {
        Lit {
            code: (var.index << 1) | (!polarity as LitIdx),
        }
    }

    /// Creates a literal from a 0-based variable index and a polarity.
    #[inline]
    pub fn from_index(index: usize, polarity: bool) -> Lit {
        Lit::from_var(Var::from_index(index), polarity)
    }

    /// Creates a literal from a signed 1-based number as used in the DIMACS
    /// CNF encoding.
    ///
    /// The absolute value names the variable, the sign gives the polarity.
    #[inline]
    pub fn from_dimacs(number: isize) -> Lit {
        Lit::from_var(Var::from_dimacs(number.abs()), number > 0)
    }

    /// The signed 1-based number of this literal in the DIMACS CNF encoding.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        let mut number = self.var().to_dimacs();
        if self.is_negative() {
            number = -number
        }
        number
    }

    /// The 0-based index of this literal's _variable_.
    #[inline]
    pub fn index(self) -> usize {
        (self.code >> 1) as usize
    }

    /// The literal's variable.
    #[inline]
    pub fn var(self) -> Var {
        Var {
            index: self.code >> 1,
        }
    }

    /// Whether this is a negated variable.
    #[inline]
    pub fn is_negative(self) -> bool {
        (self.code & 1) != 0
    }

    /// Whether this is a non-negated variable.
    #[inline]
    pub fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// The internal encoding of this literal.
    #[inline]
    pub fn code(self) -> usize {
        self.code as usize
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            code: self.code ^ 1,
        }
    }
}

impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    #[inline]
    fn bitxor(self, rhs: bool) -> Lit {
        Lit {
            code: self.code ^ (rhs as LitIdx),
        }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        var.positive()
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(Var::from_index)
    }

    pub fn lit(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(index), bool::ANY).prop_map(|(var, polarity)| var.lit(polarity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn dimacs_roundtrip(number in (1isize..1000).prop_flat_map(|n| {
            prop_oneof![Just(n), Just(-n)]
        })) {
            let lit = Lit::from_dimacs(number);
            prop_assert_eq!(lit.to_dimacs(), number);
            prop_assert_eq!(lit.var().to_dimacs(), number.abs());
            prop_assert_eq!(lit.is_positive(), number > 0);
        }

        #[test]
        fn negation(lit in super::strategy::lit(0..1000usize)) {
            prop_assert_eq!((!lit).var(), lit.var());
            prop_assert_eq!(!(!lit), lit);
            prop_assert_eq!((!lit).is_positive(), lit.is_negative());
            prop_assert_eq!(lit ^ true, !lit);
            prop_assert_eq!(lit ^ false, lit);
        }
    }

    #[test]
    fn polarity_helpers() {
        let var = Var::from_index(7);
        assert_eq!(var.positive(), var.lit(true));
        assert_eq!(var.negative(), !var.positive());
        assert_eq!(Lit::from(var), var.positive());
        assert_eq!(var.positive().index(), 7);
    }
}
