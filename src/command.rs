//! Edge commands and their abstract transfer functions.
//!
//! Every CFG edge carries one [`Command`]. [`Command::apply`] computes the
//! command's effect on the source node's state and folds the result into the
//! destination node's state, reporting whether the destination changed. The
//! worklist in the CFG layer re-enqueues exactly the nodes whose state
//! changed, so the change report is what drives termination.

use std::fmt;

use crate::constant::AbstractConstant;
use crate::error::Result;
use crate::expr::{Atom, Conjunction, Expr};
use crate::state::ConstantEqualityState;
use crate::types::{Var, VarSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `skip`
    Skip,
    /// `x := y`
    AssignVar { dst: Var, src: Var },
    /// `x := k`
    AssignConst { dst: Var, value: i64 },
    /// `x := ?`
    AssignRandom { dst: Var },
    /// `x := y + 1`
    Increment { dst: Var, src: Var },
    /// `x := y - 1`
    Decrement { dst: Var, src: Var },
    /// `assume (e)`
    Assume(Expr),
    /// `assert (e)`
    Assert(Expr),
}

impl Command {
    /// Apply this command to `source` and fold the outcome into `dest`.
    ///
    /// Returns `Ok(true)` iff `dest` changed. `dest_is_fail` marks the edge
    /// leading to the designated failure node; assertions behave differently
    /// on that edge (they fire unless provably true) and act as `skip` on
    /// every other edge.
    pub fn apply(
        &self,
        source: &ConstantEqualityState,
        dest: &mut ConstantEqualityState,
        dest_is_fail: bool,
    ) -> Result<bool> {
        let mut succ = source.clone();
        match self {
            Command::Skip => {}
            Command::AssignConst { dst, value } => {
                succ.remove_all_equalities(*dst);
                succ.set(*dst, AbstractConstant::Value(*value));
            }
            Command::AssignVar { dst, src } => {
                if dst != src {
                    let value = succ.get(*src);
                    succ.remove_all_equalities(*dst);
                    succ.set(*dst, value);
                    succ.add_equality(*dst, *src);
                }
            }
            Command::AssignRandom { dst } => {
                succ.remove_all_equalities(*dst);
                succ.get_mut(*dst).randomize(&mut rand::thread_rng());
            }
            Command::Increment { dst, src } => {
                let value = succ.get(*src).offset(1);
                succ.remove_all_equalities(*dst);
                succ.set(*dst, value);
            }
            Command::Decrement { dst, src } => {
                let value = succ.get(*src).offset(-1);
                succ.remove_all_equalities(*dst);
                succ.set(*dst, value);
            }
            Command::Assume(expr) => {
                if expr.eval(&succ).is_false() {
                    // the branch is infeasible, dest is unaffected
                    return Ok(false);
                }
                if let Expr::Conj(conj) = expr {
                    strengthen(&mut succ, conj);
                }
            }
            Command::Assert(expr) => {
                if dest_is_fail {
                    if expr.eval(&succ).is_true() {
                        return Ok(false);
                    }
                    // not provable: the failure node becomes reachable
                    succ.reduce()?;
                    succ.join(dest);
                    succ.reduce()?;
                    dest.copy_from(&succ);
                    return Ok(true);
                }
                // on the fall-through edge an assertion is a no-op
            }
        }

        succ.reduce()?;
        succ.join(dest);
        succ.reduce()?;
        if succ.is_equivalent(dest) {
            Ok(false)
        } else {
            dest.copy_from(&succ);
            Ok(true)
        }
    }

    pub fn display<'a>(&'a self, vars: &'a VarSet) -> impl fmt::Display + 'a {
        CommandDisplay { command: self, vars }
    }
}

/// Refine `state` with the facts of a pure conjunction that did not evaluate
/// to `False`. Only (dis)equality atoms over variables carry representable
/// information; parity and constant-disequality atoms contribute nothing.
fn strengthen(state: &mut ConstantEqualityState, conj: &Conjunction) {
    for atom in &conj.atoms {
        match atom {
            Atom::VarEqConst(v, k) => state.set(*v, AbstractConstant::Value(*k)),
            Atom::VarEq(a, b) => state.add_equality(*a, *b),
            Atom::VarNeq(a, b) => state.remove_equality(*a, *b),
            _ => {}
        }
    }
}

struct CommandDisplay<'a> {
    command: &'a Command,
    vars: &'a VarSet,
}

impl fmt::Display for CommandDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |v: &Var| self.vars.name(*v);
        match self.command {
            Command::Skip => write!(f, "skip"),
            Command::AssignVar { dst, src } => write!(f, "{} := {}", name(dst), name(src)),
            Command::AssignConst { dst, value } => write!(f, "{} := {}", name(dst), value),
            Command::AssignRandom { dst } => write!(f, "{} := ?", name(dst)),
            Command::Increment { dst, src } => write!(f, "{} := {} + 1", name(dst), name(src)),
            Command::Decrement { dst, src } => write!(f, "{} := {} - 1", name(dst), name(src)),
            Command::Assume(e) => write!(f, "assume ({})", e.display(self.vars)),
            Command::Assert(e) => write!(f, "assert ({})", e.display(self.vars)),
        }
    }
}
