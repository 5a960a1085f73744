//! The control-flow graph and the worklist fixed-point analysis.
//!
//! Nodes hold abstract states, edges hold commands. [`Cfg::analyze`] runs a
//! FIFO worklist from the start node: for every dequeued node, each outgoing
//! edge's transfer function is applied and destinations whose state changed
//! are re-enqueued. Dequeuing the designated failure node means some
//! assertion could not be proved and the analysis stops with
//! [`Verdict::Unproved`]; draining the queue without reaching it proves every
//! assertion.

use std::collections::VecDeque;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::state::ConstantEqualityState;
use crate::types::{NodeId, Var, VarSet};

/// The reserved name of the failure node created for assertion edges.
pub const FAIL_NODE_NAME: &str = "fail";

/// Outcome of a terminated analysis.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
    /// Every assertion holds on every abstract state reaching it.
    Proved,
    /// Some assertion could not be proved (which is not the same as a
    /// concrete counterexample existing).
    Unproved,
}

#[derive(Debug, Clone)]
pub struct StateNode {
    name: String,
    state: ConstantEqualityState,
    incoming: usize,
    outgoing: usize,
}

impl StateNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &ConstantEqualityState {
        &self.state
    }

    pub fn incoming(&self) -> usize {
        self.incoming
    }

    pub fn outgoing(&self) -> usize {
        self.outgoing
    }

    /// More than one incoming edge, i.e. a join point such as a loop head.
    pub fn is_loop_head(&self) -> bool {
        self.incoming > 1
    }

    /// More than one outgoing edge.
    pub fn is_branch(&self) -> bool {
        self.outgoing > 1
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: NodeId,
    pub dest: NodeId,
    pub command: Command,
}

#[derive(Debug, Clone, Default)]
pub struct Cfg {
    vars: VarSet,
    nodes: Vec<StateNode>,
    edges: Vec<Edge>,
    start: Option<NodeId>,
    fail: Option<NodeId>,
}

impl Cfg {
    pub fn new(vars: VarSet) -> Self {
        Self {
            vars,
            nodes: Vec::new(),
            edges: Vec::new(),
            start: None,
            fail: None,
        }
    }

    pub fn vars(&self) -> &VarSet {
        &self.vars
    }

    pub fn var(&self, name: &str) -> Option<Var> {
        self.vars.find(name)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn start(&self) -> Option<NodeId> {
        self.start
    }

    pub fn fail(&self) -> Option<NodeId> {
        self.fail
    }

    pub fn node(&self, id: NodeId) -> &StateNode {
        &self.nodes[id.index()]
    }

    /// Add a node. The first node added becomes the start node.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(StateNode {
            name: name.into(),
            state: ConstantEqualityState::new(self.vars.len()),
            incoming: 0,
            outgoing: 0,
        });
        if self.start.is_none() {
            self.start = Some(id);
        }
        id
    }

    /// Look up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId::new(i as u32))
    }

    /// Designate `id` as the failure node.
    pub fn set_fail_node(&mut self, id: NodeId) -> Result<()> {
        if id.index() >= self.nodes.len() {
            return Err(Error::CfgMalformed(format!(
                "fail node {} does not exist",
                id
            )));
        }
        self.fail = Some(id);
        Ok(())
    }

    /// Add an edge carrying `command`. Both endpoints must already exist;
    /// a bad endpoint leaves the graph unmodified.
    pub fn add_edge(&mut self, source: NodeId, dest: NodeId, command: Command) -> Result<()> {
        for id in [source, dest] {
            if id.index() >= self.nodes.len() {
                return Err(Error::CfgMalformed(format!(
                    "edge endpoint {} does not exist",
                    id
                )));
            }
        }
        self.nodes[source.index()].outgoing += 1;
        self.nodes[dest.index()].incoming += 1;
        self.edges.push(Edge {
            source,
            dest,
            command,
        });
        Ok(())
    }

    /// Run the worklist analysis to a fixed point.
    ///
    /// Terminates because node states only move up a finite-height lattice
    /// and nodes are re-enqueued only on change.
    pub fn analyze(&mut self) -> Result<Verdict> {
        let start = self
            .start
            .ok_or_else(|| Error::CfgMalformed("graph has no nodes".into()))?;
        let fail = self
            .fail
            .ok_or_else(|| Error::CfgMalformed("no fail node designated".into()))?;

        // outgoing edge indices per node, in insertion order
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (i, edge) in self.edges.iter().enumerate() {
            successors[edge.source.index()].push(i);
        }

        let mut worklist: VecDeque<NodeId> = VecDeque::new();
        worklist.push_back(start);

        while let Some(current) = worklist.pop_front() {
            if current == fail {
                log::debug!("failure node {} dequeued", self.nodes[current.index()].name);
                return Ok(Verdict::Unproved);
            }
            for &edge_idx in &successors[current.index()] {
                let Edge {
                    source,
                    dest,
                    ref command,
                } = self.edges[edge_idx];
                // clone so a self-loop edge reads a stable source state
                let source_state = self.nodes[source.index()].state.clone();
                let dest_node = &mut self.nodes[dest.index()];
                let changed = command.apply(&source_state, &mut dest_node.state, dest == fail)?;
                if changed {
                    log::debug!(
                        "edge {} -> {} [{}] updated state to {}",
                        source,
                        dest,
                        command.display(&self.vars),
                        dest_node.state.display(&self.vars),
                    );
                    if !worklist.contains(&dest) {
                        worklist.push_back(dest);
                    }
                }
            }
        }

        Ok(Verdict::Proved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::constant::AbstractConstant::Value;
    use crate::expr::{Atom, Conjunction, Expr};

    fn graph_with_vars(names: &[&str]) -> Cfg {
        let mut vars = VarSet::new();
        for name in names {
            vars.add(*name);
        }
        Cfg::new(vars)
    }

    #[test]
    fn test_first_node_is_start() {
        let mut cfg = graph_with_vars(&["x"]);
        let a = cfg.add_node("L0");
        let _b = cfg.add_node("L1");
        assert_eq!(cfg.start(), Some(a));
        assert_eq!(cfg.node_id("L0"), Some(a));
        assert_eq!(cfg.node_id("missing"), None);
    }

    #[test]
    fn test_add_edge_rejects_unknown_endpoint() {
        let mut cfg = graph_with_vars(&["x"]);
        let a = cfg.add_node("L0");
        let bogus = NodeId::new(7);
        let err = cfg.add_edge(a, bogus, Command::Skip).unwrap_err();
        assert!(matches!(err, Error::CfgMalformed(_)));
        assert_eq!(cfg.num_edges(), 0);
        assert_eq!(cfg.node(a).outgoing(), 0);
    }

    #[test]
    fn test_edge_updates_degree_counts() {
        let mut cfg = graph_with_vars(&["x"]);
        let a = cfg.add_node("L0");
        let b = cfg.add_node("L1");
        cfg.add_edge(a, b, Command::Skip).unwrap();
        cfg.add_edge(a, b, Command::Skip).unwrap();
        assert_eq!(cfg.node(a).outgoing(), 2);
        assert_eq!(cfg.node(b).incoming(), 2);
        assert!(cfg.node(a).is_branch());
        assert!(!cfg.node(a).is_loop_head());
        assert!(cfg.node(b).is_loop_head());
        assert!(!cfg.node(b).is_branch());
    }

    #[test]
    fn test_analyze_requires_fail_node() {
        let mut cfg = graph_with_vars(&["x"]);
        cfg.add_node("L0");
        let err = cfg.analyze().unwrap_err();
        assert!(matches!(err, Error::CfgMalformed(_)));
    }

    #[test]
    fn test_analyze_requires_nodes() {
        let mut cfg = graph_with_vars(&["x"]);
        let err = cfg.analyze().unwrap_err();
        assert!(matches!(err, Error::CfgMalformed(_)));
    }

    #[test]
    fn test_straight_line_proved() {
        // a := 5; b := a; assert (a == b)
        let mut cfg = graph_with_vars(&["a", "b"]);
        let a = cfg.var("a").unwrap();
        let b = cfg.var("b").unwrap();
        let l0 = cfg.add_node("L0");
        let l1 = cfg.add_node("L1");
        let l2 = cfg.add_node("L2");
        let fail = cfg.add_node(FAIL_NODE_NAME);
        cfg.set_fail_node(fail).unwrap();
        let assertion = Expr::Conj(Conjunction::new(vec![Atom::VarEq(a, b)]));
        cfg.add_edge(l0, l1, Command::AssignConst { dst: a, value: 5 })
            .unwrap();
        cfg.add_edge(l1, l2, Command::AssignVar { dst: b, src: a })
            .unwrap();
        cfg.add_edge(l2, l2, Command::Assert(assertion.clone()))
            .unwrap();
        cfg.add_edge(l2, fail, Command::Assert(assertion)).unwrap();

        assert_eq!(cfg.analyze().unwrap(), Verdict::Proved);
        assert_eq!(cfg.node(l2).state().get(a), Value(5));
        assert_eq!(cfg.node(l2).state().get(b), Value(5));
        assert!(cfg.node(l2).state().has_equality(a, b));
    }

    #[test]
    fn test_false_assertion_unproved() {
        // x := 1; assert (x == 2)
        let mut cfg = graph_with_vars(&["x"]);
        let x = cfg.var("x").unwrap();
        let l0 = cfg.add_node("L0");
        let l1 = cfg.add_node("L1");
        let fail = cfg.add_node(FAIL_NODE_NAME);
        cfg.set_fail_node(fail).unwrap();
        let assertion = Expr::Conj(Conjunction::new(vec![Atom::VarEqConst(x, 2)]));
        cfg.add_edge(l0, l1, Command::AssignConst { dst: x, value: 1 })
            .unwrap();
        cfg.add_edge(l1, fail, Command::Assert(assertion)).unwrap();

        assert_eq!(cfg.analyze().unwrap(), Verdict::Unproved);
    }

    #[test]
    fn test_loop_widens_counter_to_top() {
        // i := 0; while (i != 10) i := i + 1; assert (i == 10)
        // the flat domain loses i in the loop, so the proof must fail
        let mut cfg = graph_with_vars(&["i"]);
        let i = cfg.var("i").unwrap();
        let l0 = cfg.add_node("L0");
        let l1 = cfg.add_node("L1");
        let l2 = cfg.add_node("L2");
        let l3 = cfg.add_node("L3");
        let fail = cfg.add_node(FAIL_NODE_NAME);
        cfg.set_fail_node(fail).unwrap();
        let guard = Expr::Conj(Conjunction::new(vec![Atom::VarNeqConst(i, 10)]));
        let assertion = Expr::Conj(Conjunction::new(vec![Atom::VarEqConst(i, 10)]));
        cfg.add_edge(l0, l1, Command::AssignConst { dst: i, value: 0 })
            .unwrap();
        cfg.add_edge(l1, l2, Command::Assume(guard)).unwrap();
        cfg.add_edge(l2, l1, Command::Increment { dst: i, src: i })
            .unwrap();
        cfg.add_edge(l1, l3, Command::Assert(assertion.clone()))
            .unwrap();
        cfg.add_edge(l1, fail, Command::Assert(assertion)).unwrap();

        assert_eq!(cfg.analyze().unwrap(), Verdict::Unproved);
    }

    #[test]
    fn test_guard_recovers_precision_after_join() {
        // x := 1 or x := 2 (joins to top), then assume (x == 3) refines
        // the guarded branch back to a concrete value
        let mut cfg = graph_with_vars(&["x"]);
        let x = cfg.var("x").unwrap();
        let l0 = cfg.add_node("L0");
        let l1 = cfg.add_node("L1");
        let l2 = cfg.add_node("L2");
        let fail = cfg.add_node(FAIL_NODE_NAME);
        cfg.set_fail_node(fail).unwrap();
        let guard = Expr::Conj(Conjunction::new(vec![Atom::VarEqConst(x, 3)]));
        let assertion = guard.clone();
        cfg.add_edge(l0, l1, Command::AssignConst { dst: x, value: 1 })
            .unwrap();
        cfg.add_edge(l0, l1, Command::AssignConst { dst: x, value: 2 })
            .unwrap();
        cfg.add_edge(l1, l2, Command::Assume(guard)).unwrap();
        cfg.add_edge(l2, fail, Command::Assert(assertion)).unwrap();

        assert_eq!(cfg.analyze().unwrap(), Verdict::Proved);
        assert_eq!(cfg.node(l1).state().get(x), crate::constant::AbstractConstant::Top);
        assert_eq!(cfg.node(l2).state().get(x), Value(3));
    }
}
