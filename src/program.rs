//! Reader for the textual program format.
//!
//! The first non-empty line declares the variables. Every following line is
//! one CFG edge: a source label, a command, a destination label, separated
//! by whitespace. Lines starting with `#` are comments.
//!
//! ```text
//! i
//! L0 i := 0       L1
//! L1 assume (i != 10) L2
//! L2 i := i + 1   L1
//! L1 assert (i == 10) L3
//! ```
//!
//! Labels are created on first mention; the first label of the first edge
//! line becomes the start node. Every `assert` line additionally produces an
//! edge to the shared failure node, created on the first assertion.

use crate::cfg::{Cfg, FAIL_NODE_NAME};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::types::{NodeId, VarSet};

/// Parse a whole program into an analyzable CFG.
pub fn parse_program(text: &str) -> Result<Cfg> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let header = lines
        .next()
        .ok_or_else(|| Error::CfgMalformed("empty program".into()))?;
    let mut vars = VarSet::new();
    for name in header.split_whitespace() {
        if vars.contains(name) {
            return Err(Error::CfgMalformed(format!(
                "duplicate variable declaration `{}`",
                name
            )));
        }
        vars.add(name);
    }

    let mut cfg = Cfg::new(vars);
    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(Error::CfgMalformed(format!(
                "expected `source command dest`, got `{}`",
                line
            )));
        }
        let source = node_for(&mut cfg, tokens[0]);
        let dest = node_for(&mut cfg, tokens[tokens.len() - 1]);
        let command_text = tokens[1..tokens.len() - 1].join(" ");
        let command = Command::parse(&command_text, cfg.vars())?;

        if let Command::Assert(_) = command {
            let fail = match cfg.fail() {
                Some(fail) => fail,
                None => {
                    let fail = node_for(&mut cfg, FAIL_NODE_NAME);
                    cfg.set_fail_node(fail)?;
                    fail
                }
            };
            cfg.add_edge(source, fail, command.clone())?;
        }
        cfg.add_edge(source, dest, command)?;
    }
    Ok(cfg)
}

fn node_for(cfg: &mut Cfg, name: &str) -> NodeId {
    match cfg.node_id(name) {
        Some(id) => id,
        None => cfg.add_node(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::cfg::Verdict;
    use crate::constant::AbstractConstant::{Top, Value};

    #[test]
    fn test_loop_counter_unproved() {
        // the flat domain widens i to top inside the loop, so the exit
        // assertion cannot be proved even though it holds concretely
        let program = "\
            i\n\
            L0 i := 0 L1\n\
            L1 assume (i != 10) L2\n\
            L2 i := i + 1 L1\n\
            L1 assert (i == 10) L3\n";
        let mut cfg = parse_program(program).unwrap();
        assert_eq!(cfg.analyze().unwrap(), Verdict::Unproved);
        let i = cfg.var("i").unwrap();
        let l1 = cfg.node_id("L1").unwrap();
        assert_eq!(cfg.node(l1).state().get(i), Top);
    }

    #[test]
    fn test_copy_chain_proved() {
        let program = "\
            a b\n\
            L0 a := 5 L1\n\
            L1 b := a L2\n\
            L2 assert (a == b) L2\n";
        let mut cfg = parse_program(program).unwrap();
        assert_eq!(cfg.analyze().unwrap(), Verdict::Proved);
        let a = cfg.var("a").unwrap();
        let b = cfg.var("b").unwrap();
        let l2 = cfg.node_id("L2").unwrap();
        assert_eq!(cfg.node(l2).state().get(a), Value(5));
        assert!(cfg.node(l2).state().has_equality(a, b));
    }

    #[test]
    fn test_copy_of_widened_var_unproved() {
        // x is top after the branch join, so x == y stays undecided even
        // though y is a direct copy of x
        let program = "\
            x y\n\
            L0 x := 1 L1\n\
            L0 x := 2 L1\n\
            L1 y := x L2\n\
            L2 assert (x == y) L3\n";
        let mut cfg = parse_program(program).unwrap();
        assert_eq!(cfg.analyze().unwrap(), Verdict::Unproved);
        let x = cfg.var("x").unwrap();
        let l2 = cfg.node_id("L2").unwrap();
        assert_eq!(cfg.node(l2).state().get(x), Top);
    }

    #[test]
    fn test_uninitialized_vars_unproved() {
        // both variables are still bottom when the assert is evaluated
        let program = "\
            x y\n\
            L0 assert (x == y) L1\n";
        let mut cfg = parse_program(program).unwrap();
        assert_eq!(cfg.analyze().unwrap(), Verdict::Unproved);
    }

    #[test]
    fn test_assert_creates_single_fail_node() {
        let program = "\
            x\n\
            L0 x := 1 L1\n\
            L1 assert (x == 1) L2\n\
            L2 assert (x != 2) L3\n";
        let cfg = parse_program(program).unwrap();
        let fail = cfg.fail().unwrap();
        assert_eq!(cfg.node(fail).name(), FAIL_NODE_NAME);
        // four labels plus one shared fail node
        assert_eq!(cfg.num_nodes(), 5);
        // three declared edges plus one fail edge per assert line
        assert_eq!(cfg.num_edges(), 5);
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let program = "\
            x\n\
            \n\
            # initialize\n\
            L0 x := 2 L1\n\
            L1 assert (even x) L1\n";
        let mut cfg = parse_program(program).unwrap();
        assert_eq!(cfg.analyze().unwrap(), Verdict::Proved);
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let err = parse_program("x x\nL0 skip L1\n").unwrap_err();
        assert!(matches!(err, Error::CfgMalformed(_)));
    }

    #[test]
    fn test_short_edge_line_rejected() {
        let err = parse_program("x\nL0 skip\n").unwrap_err();
        assert!(matches!(err, Error::CfgMalformed(_)));
    }

    #[test]
    fn test_empty_program_rejected() {
        assert!(matches!(
            parse_program(""),
            Err(Error::CfgMalformed(_))
        ));
    }

    #[test]
    fn test_bad_command_propagates() {
        let err = parse_program("x\nL0 jump L1\n").unwrap_err();
        assert!(matches!(err, Error::CommandParse(_)));
    }
}
