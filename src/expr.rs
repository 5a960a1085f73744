//! Predicates over abstract states.
//!
//! An [`Expr`] is a disjunction of conjunctions of [`Atom`]s, evaluated in
//! Kleene three-valued logic against a [`ConstantEqualityState`]. Atoms only
//! ever *read* the state; strengthening a state with an assumed predicate
//! lives in the command layer.

use std::fmt;

use crate::constant::Parity;
use crate::state::ConstantEqualityState;
use crate::tribool::Tribool;
use crate::types::{Var, VarSet};

/// An atomic predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// `even v`
    Even(Var),
    /// `odd v`
    Odd(Var),
    /// `v == w`
    VarEq(Var, Var),
    /// `v != w`
    VarNeq(Var, Var),
    /// `v == k`
    VarEqConst(Var, i64),
    /// `v != k`
    VarNeqConst(Var, i64),
    /// `k1 == k2`
    ConstEq(i64, i64),
    /// `k1 != k2`
    ConstNeq(i64, i64),
    /// `sum v.. == sum w..`
    SumEq(Vec<Var>, Vec<Var>),
}

impl Atom {
    /// Evaluate this atom against `state`.
    ///
    /// Parity atoms are `Unknown` unless the value is concrete. Variable
    /// comparisons are decided only when both operands hold concrete values;
    /// relational facts reach the values through the state's reduce step.
    /// Sum comparisons require every operand to be concrete.
    pub fn eval(&self, state: &ConstantEqualityState) -> Tribool {
        match self {
            Atom::Even(v) => match state.get(*v).parity() {
                Parity::Even => Tribool::True,
                Parity::Odd => Tribool::False,
                Parity::Unknown => Tribool::Unknown,
            },
            Atom::Odd(v) => match state.get(*v).parity() {
                Parity::Odd => Tribool::True,
                Parity::Even => Tribool::False,
                Parity::Unknown => Tribool::Unknown,
            },
            Atom::VarEq(a, b) => {
                match (state.get(*a).value(), state.get(*b).value()) {
                    (Some(x), Some(y)) => (x == y).into(),
                    _ => Tribool::Unknown,
                }
            }
            Atom::VarNeq(a, b) => !Atom::VarEq(*a, *b).eval(state),
            Atom::VarEqConst(v, k) => match state.get(*v).value() {
                Some(actual) => (actual == *k).into(),
                None => Tribool::Unknown,
            },
            Atom::VarNeqConst(v, k) => !Atom::VarEqConst(*v, *k).eval(state),
            Atom::ConstEq(k1, k2) => (k1 == k2).into(),
            Atom::ConstNeq(k1, k2) => (k1 != k2).into(),
            Atom::SumEq(lhs, rhs) => {
                let sum = |vars: &[Var]| -> Option<i64> {
                    vars.iter()
                        .map(|&v| state.get(v).value())
                        .try_fold(0i64, |acc, v| Some(acc.wrapping_add(v?)))
                };
                match (sum(lhs), sum(rhs)) {
                    (Some(a), Some(b)) => (a == b).into(),
                    _ => Tribool::Unknown,
                }
            }
        }
    }

    pub fn display<'a>(&'a self, vars: &'a VarSet) -> impl fmt::Display + 'a {
        AtomDisplay { atom: self, vars }
    }
}

/// A conjunction of atoms; the empty conjunction is `True`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction {
    pub atoms: Vec<Atom>,
}

impl Conjunction {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Kleene AND over all atoms.
    ///
    /// Short-circuits only on `False` (the dominant value); an `Unknown`
    /// must not stop evaluation since a later `False` still decides it.
    pub fn eval(&self, state: &ConstantEqualityState) -> Tribool {
        let mut acc = Tribool::True;
        for atom in &self.atoms {
            acc = acc & atom.eval(state);
            if acc.is_false() {
                break;
            }
        }
        acc
    }
}

/// A predicate in disjunctive normal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Conj(Conjunction),
    /// Two or more disjuncts.
    Disj(Vec<Conjunction>),
}

impl Expr {
    /// Kleene OR over the disjuncts; short-circuits only on `True`.
    pub fn eval(&self, state: &ConstantEqualityState) -> Tribool {
        match self {
            Expr::Conj(c) => c.eval(state),
            Expr::Disj(conjunctions) => {
                let mut acc = Tribool::False;
                for c in conjunctions {
                    acc = acc | c.eval(state);
                    if acc.is_true() {
                        break;
                    }
                }
                acc
            }
        }
    }

    pub fn display<'a>(&'a self, vars: &'a VarSet) -> impl fmt::Display + 'a {
        ExprDisplay { expr: self, vars }
    }
}

struct AtomDisplay<'a> {
    atom: &'a Atom,
    vars: &'a VarSet,
}

impl fmt::Display for AtomDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |v: &Var| self.vars.name(*v);
        match self.atom {
            Atom::Even(v) => write!(f, "even {}", name(v)),
            Atom::Odd(v) => write!(f, "odd {}", name(v)),
            Atom::VarEq(a, b) => write!(f, "{} == {}", name(a), name(b)),
            Atom::VarNeq(a, b) => write!(f, "{} != {}", name(a), name(b)),
            Atom::VarEqConst(v, k) => write!(f, "{} == {}", name(v), k),
            Atom::VarNeqConst(v, k) => write!(f, "{} != {}", name(v), k),
            Atom::ConstEq(k1, k2) => write!(f, "{} == {}", k1, k2),
            Atom::ConstNeq(k1, k2) => write!(f, "{} != {}", k1, k2),
            Atom::SumEq(lhs, rhs) => {
                let join = |vars: &[Var]| {
                    vars.iter()
                        .map(|v| name(v).to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                write!(f, "sum {} == sum {}", join(lhs), join(rhs))
            }
        }
    }
}

struct ExprDisplay<'a> {
    expr: &'a Expr,
    vars: &'a VarSet,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_conj = |f: &mut fmt::Formatter<'_>, c: &Conjunction| -> fmt::Result {
            for (i, atom) in c.atoms.iter().enumerate() {
                if i > 0 {
                    write!(f, " & ")?;
                }
                write!(f, "{}", atom.display(self.vars))?;
            }
            Ok(())
        };
        match self.expr {
            Expr::Conj(c) => write_conj(f, c),
            Expr::Disj(conjunctions) => {
                for (i, c) in conjunctions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write_conj(f, c)?;
                }
                Ok(())
            }
        }
    }
}
