//! Type-safe handles for program variables and CFG nodes.
//!
//! Variables and nodes are allocated once by the owning [`Cfg`][crate::cfg::Cfg]
//! and referenced everywhere else by small integer handles. Two handles are
//! equal iff they denote the same entity, so identity comparison is a plain
//! integer compare and the graph structures stay free of lifetimes.

use std::fmt;

/// A program variable handle (index into the owning [`VarSet`]).
///
/// # Invariants
///
/// - Handles are dense: a `VarSet` with `n` variables hands out `0..n`.
/// - A handle is only meaningful together with the `VarSet` that created it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    pub(crate) fn new(index: u32) -> Self {
        Var(index)
    }

    /// Returns the raw handle as a `usize`, for indexing dense per-variable storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A CFG node handle (index into the owning graph's node list).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: u32) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The finite set of named variables known to one CFG.
///
/// Names are interned once at construction; every later structure (states,
/// expressions, commands) stores [`Var`] handles, never names.
#[derive(Debug, Clone, Default)]
pub struct VarSet {
    names: Vec<String>,
}

impl VarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a new variable name and return its handle.
    ///
    /// Duplicate detection is the caller's concern (the program reader
    /// rejects duplicate declarations before interning).
    pub fn add(&mut self, name: impl Into<String>) -> Var {
        let var = Var::new(self.names.len() as u32);
        self.names.push(name.into());
        var
    }

    /// Look up a variable by name.
    pub fn find(&self, name: &str) -> Option<Var> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| Var::new(i as u32))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn name(&self, var: Var) -> &str {
        &self.names[var.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all handles in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        (0..self.names.len() as u32).map(Var::new)
    }
}
