//! The abstract state attached to every CFG node.
//!
//! A state is the product of a per-variable [`AbstractConstant`] assignment
//! and a symmetric equality relation over variables. The two components
//! exchange information through [`ConstantEqualityState::reduce`], which
//! iterates two rules to a local fixed point:
//!
//! - *left*: two variables holding the same concrete value become related;
//! - *right*: a concrete value propagates to every variable related to its
//!   holder, and two *different* concrete values forced together are a
//!   [`LatticeInconsistency`][crate::error::Error::LatticeInconsistency].
//!
//! # Invariants
//!
//! - The relation is stored symmetrically: `(a, b)` present iff `(b, a)` is.
//! - No reflexive pairs `(a, a)` are ever stored.

use std::fmt;

use crate::constant::AbstractConstant;
use crate::error::{Error, Result};
use crate::tribool::Tribool;
use crate::types::{Var, VarSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantEqualityState {
    values: Vec<AbstractConstant>,
    /// Ordered pairs; every related `{a, b}` appears as both `(a, b)` and `(b, a)`.
    equalities: Vec<(Var, Var)>,
}

impl ConstantEqualityState {
    /// The initial state over `num_vars` variables: every value is `Bottom`
    /// and every distinct pair of variables is related.
    ///
    /// This is the least element of the product lattice (the relation
    /// component is ordered by reverse inclusion: more pairs = more precise).
    pub fn new(num_vars: usize) -> Self {
        let mut equalities = Vec::new();
        for i in 0..num_vars as u32 {
            for j in 0..num_vars as u32 {
                if i != j {
                    equalities.push((Var::new(i), Var::new(j)));
                }
            }
        }
        Self {
            values: vec![AbstractConstant::Bottom; num_vars],
            equalities,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, var: Var) -> AbstractConstant {
        self.values[var.index()]
    }

    pub fn set(&mut self, var: Var, value: AbstractConstant) {
        self.values[var.index()] = value;
    }

    pub fn get_mut(&mut self, var: Var) -> &mut AbstractConstant {
        &mut self.values[var.index()]
    }

    pub fn has_equality(&self, a: Var, b: Var) -> bool {
        self.equalities.contains(&(a, b))
    }

    /// Relate `a` and `b`. No-op when `a == b`; duplicates are not stored.
    pub fn add_equality(&mut self, a: Var, b: Var) {
        if a == b {
            return;
        }
        self.remove_equality(a, b);
        self.equalities.push((a, b));
        self.equalities.push((b, a));
    }

    /// Drop the pair `{a, b}` from the relation, both directions.
    pub fn remove_equality(&mut self, a: Var, b: Var) {
        self.equalities
            .retain(|&(x, y)| (x, y) != (a, b) && (x, y) != (b, a));
    }

    /// Drop every pair involving `var`. Used when `var` is overwritten.
    pub fn remove_all_equalities(&mut self, var: Var) {
        self.equalities.retain(|&(x, y)| x != var && y != var);
    }

    /// Pairs `(var, other)` currently in the relation, in insertion order.
    pub fn partners(&self, var: Var) -> Vec<Var> {
        self.equalities
            .iter()
            .filter(|&&(x, _)| x == var)
            .map(|&(_, y)| y)
            .collect()
    }

    /// Pointwise join of the constant component, intersection of the
    /// equality relations. The result over-approximates both inputs.
    pub fn join(&mut self, other: &ConstantEqualityState) {
        debug_assert_eq!(self.values.len(), other.values.len());
        for (mine, theirs) in self.values.iter_mut().zip(&other.values) {
            *mine = mine.join(*theirs);
        }
        self.equalities.retain(|pair| other.equalities.contains(pair));
    }

    /// Abstract-domain equivalence: three-valued-equal on every variable and
    /// the same equality relation.
    ///
    /// Used as the "did the transfer change anything" test, so it must be
    /// reflexive; `tri_eq` being `True` on identical elements guarantees that.
    pub fn is_equivalent(&self, other: &ConstantEqualityState) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        let values_eq = self
            .values
            .iter()
            .zip(&other.values)
            .all(|(&a, &b)| a.tri_eq(b).is_true());
        values_eq
            && self.equalities.iter().all(|p| other.equalities.contains(p))
            && other.equalities.iter().all(|p| self.equalities.contains(p))
    }

    pub fn copy_from(&mut self, other: &ConstantEqualityState) {
        self.values.clone_from(&other.values);
        self.equalities.clone_from(&other.equalities);
    }

    /// Exchange information between the two components until nothing changes.
    ///
    /// Terminates: each round either adds pairs over a finite pair universe
    /// (left rule) or raises values on a finite-height lattice (right rule).
    pub fn reduce(&mut self) -> Result<()> {
        let mut rounds = 0usize;
        loop {
            let snapshot = self.clone();
            self.reduce_left();
            self.reduce_right()?;
            rounds += 1;
            if self.is_equivalent(&snapshot) {
                break;
            }
        }
        log::debug!("reduce converged after {} round(s)", rounds);
        Ok(())
    }

    /// Left rule: variables holding the same concrete value become related.
    fn reduce_left(&mut self) {
        let n = self.values.len() as u32;
        for i in 0..n {
            let a = Var::new(i);
            let va = self.get(a);
            if !va.is_concrete() {
                continue;
            }
            for j in (i + 1)..n {
                let b = Var::new(j);
                if va == self.get(b) {
                    self.add_equality(a, b);
                }
            }
        }
    }

    /// Right rule: concrete values propagate along the relation.
    ///
    /// Two different concrete values related to each other are a fatal
    /// inconsistency. Top and Bottom targets are simply overwritten.
    fn reduce_right(&mut self) -> Result<()> {
        for idx in 0..self.equalities.len() {
            let (a, b) = self.equalities[idx];
            let va = self.get(a);
            let Some(ka) = va.value() else {
                continue;
            };
            match self.get(b).value() {
                Some(kb) if kb != ka => {
                    return Err(Error::LatticeInconsistency(format!(
                        "{} = {} but {} holds {} and {} holds {}",
                        a, b, a, ka, b, kb
                    )));
                }
                Some(_) => {}
                None => self.set(b, va),
            }
        }
        Ok(())
    }

    /// Render the state using the variable names in `vars`.
    pub fn display<'a>(&'a self, vars: &'a VarSet) -> impl fmt::Display + 'a {
        StateDisplay { state: self, vars }
    }

    /// Three-valued equality of two variables' values in this state.
    pub fn tri_eq(&self, a: Var, b: Var) -> Tribool {
        self.get(a).tri_eq(self.get(b))
    }
}

struct StateDisplay<'a> {
    state: &'a ConstantEqualityState,
    vars: &'a VarSet,
}

impl fmt::Display for StateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, var) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", self.vars.name(var), self.state.get(var))?;
        }
        write!(f, "}} eq{{")?;
        let mut first = true;
        for &(a, b) in &self.state.equalities {
            if a > b {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={}", self.vars.name(a), self.vars.name(b))?;
        }
        write!(f, "}}")
    }
}
