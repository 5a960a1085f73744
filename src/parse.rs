//! Text grammar for commands and predicates.
//!
//! ```text
//! command := "skip"
//!          | var ":=" ( "?" | int | var | var "+" "1" | var "-" "1" )
//!          | "assume" "(" expr ")"
//!          | "assert" "(" expr ")"
//! expr    := conj { "|" conj }
//! conj    := atom { "&" atom }
//! atom    := "even" var | "odd" var
//!          | operand ("==" | "!=") operand
//!          | "sum" var.. "==" "sum" var..
//! ```
//!
//! Variables must already be interned in the [`VarSet`]; an identifier that
//! is neither a known variable nor an integer literal is a parse error.

use crate::command::Command;
use crate::error::{Error, Result};
use crate::expr::{Atom, Conjunction, Expr};
use crate::types::{Var, VarSet};

impl Command {
    /// Parse one command.
    pub fn parse(text: &str, vars: &VarSet) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed == "skip" {
            return Ok(Command::Skip);
        }
        if let Some((lhs, rhs)) = trimmed.split_once(":=") {
            let dst = vars
                .find(lhs.trim())
                .ok_or_else(|| Error::CommandParse(trimmed.to_string()))?;
            return parse_assignment(dst, rhs, vars)
                .ok_or_else(|| Error::CommandParse(trimmed.to_string()));
        }
        if let Some(rest) = trimmed.strip_prefix("assume") {
            return Ok(Command::Assume(Expr::parse(rest, vars)?));
        }
        if let Some(rest) = trimmed.strip_prefix("assert") {
            return Ok(Command::Assert(Expr::parse(rest, vars)?));
        }
        Err(Error::CommandParse(trimmed.to_string()))
    }
}

fn parse_assignment(dst: Var, rhs: &str, vars: &VarSet) -> Option<Command> {
    let tokens: Vec<&str> = rhs.split_whitespace().collect();
    match tokens.as_slice() {
        ["?"] => Some(Command::AssignRandom { dst }),
        [single] => {
            if let Some(src) = vars.find(single) {
                Some(Command::AssignVar { dst, src })
            } else {
                let value = single.parse().ok()?;
                Some(Command::AssignConst { dst, value })
            }
        }
        [src, "+", "1"] => Some(Command::Increment {
            dst,
            src: vars.find(src)?,
        }),
        [src, "-", "1"] => Some(Command::Decrement {
            dst,
            src: vars.find(src)?,
        }),
        _ => None,
    }
}

impl Expr {
    /// Parse a predicate in disjunctive normal form. Surrounding parentheses
    /// are allowed and stripped.
    pub fn parse(text: &str, vars: &VarSet) -> Result<Self> {
        let inner = strip_parens(text.trim());
        if inner.is_empty() {
            return Err(Error::ExpressionParse(text.trim().to_string()));
        }
        let mut conjunctions = Vec::new();
        for part in inner.split('|') {
            conjunctions.push(parse_conjunction(part, vars)?);
        }
        if conjunctions.len() == 1 {
            Ok(Expr::Conj(conjunctions.remove(0)))
        } else {
            Ok(Expr::Disj(conjunctions))
        }
    }
}

/// Strip balanced surrounding parentheses, but leave `(a) | (b)` alone.
fn strip_parens(text: &str) -> &str {
    let mut inner = text.trim();
    while inner.starts_with('(') && inner.ends_with(')') {
        let mut depth = 0i32;
        let mut outer_matches = true;
        for (i, b) in inner.bytes().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 && i != inner.len() - 1 {
                        outer_matches = false;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !outer_matches {
            break;
        }
        inner = inner[1..inner.len() - 1].trim();
    }
    inner
}

fn parse_conjunction(text: &str, vars: &VarSet) -> Result<Conjunction> {
    let mut atoms = Vec::new();
    for part in text.split('&') {
        atoms.push(parse_atom(part, vars)?);
    }
    Ok(Conjunction::new(atoms))
}

/// An operand of a comparison atom.
enum Operand {
    Var(Var),
    Const(i64),
}

fn parse_operand(text: &str, vars: &VarSet) -> Option<Operand> {
    let text = text.trim();
    if let Some(var) = vars.find(text) {
        Some(Operand::Var(var))
    } else {
        text.parse().ok().map(Operand::Const)
    }
}

fn parse_atom(text: &str, vars: &VarSet) -> Result<Atom> {
    let trimmed = text.trim();
    let err = || Error::ExpressionParse(trimmed.to_string());

    if let Some(rest) = trimmed.strip_prefix("even ") {
        return vars.find(rest.trim()).map(Atom::Even).ok_or_else(err);
    }
    if let Some(rest) = trimmed.strip_prefix("odd ") {
        return vars.find(rest.trim()).map(Atom::Odd).ok_or_else(err);
    }
    if trimmed.starts_with("sum ") || trimmed.starts_with("sum\t") {
        let (lhs, rhs) = trimmed.split_once("==").ok_or_else(err)?;
        let lhs = parse_var_list(lhs, vars).ok_or_else(err)?;
        let rhs = parse_var_list(rhs, vars).ok_or_else(err)?;
        return Ok(Atom::SumEq(lhs, rhs));
    }

    let (lhs, rhs, negated) = if let Some((l, r)) = trimmed.split_once("!=") {
        (l, r, true)
    } else if let Some((l, r)) = trimmed.split_once("==") {
        (l, r, false)
    } else {
        return Err(err());
    };
    let lhs = parse_operand(lhs, vars).ok_or_else(err)?;
    let rhs = parse_operand(rhs, vars).ok_or_else(err)?;
    Ok(match (lhs, rhs, negated) {
        (Operand::Var(a), Operand::Var(b), false) => Atom::VarEq(a, b),
        (Operand::Var(a), Operand::Var(b), true) => Atom::VarNeq(a, b),
        (Operand::Var(v), Operand::Const(k), false)
        | (Operand::Const(k), Operand::Var(v), false) => Atom::VarEqConst(v, k),
        (Operand::Var(v), Operand::Const(k), true)
        | (Operand::Const(k), Operand::Var(v), true) => Atom::VarNeqConst(v, k),
        (Operand::Const(k1), Operand::Const(k2), false) => Atom::ConstEq(k1, k2),
        (Operand::Const(k1), Operand::Const(k2), true) => Atom::ConstNeq(k1, k2),
    })
}

/// Parse `sum v1 v2 ..` into a non-empty variable list.
fn parse_var_list(text: &str, vars: &VarSet) -> Option<Vec<Var>> {
    let rest = text.trim().strip_prefix("sum")?;
    let list: Option<Vec<Var>> = rest.split_whitespace().map(|name| vars.find(name)).collect();
    let list = list?;
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}
