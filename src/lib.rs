//! # absint-rs: Abstract Interpretation over Control-Flow Graphs
//!
//! **`absint-rs`** is a small static-analysis library that proves assertions
//! about integer programs by abstract interpretation. It combines **constant
//! propagation** with **variable-equality tracking** and reasons about
//! predicates in **Kleene three-valued logic**.
//!
//! ## How it works
//!
//! A program is a control-flow graph: nodes carry abstract states, edges
//! carry commands (assignments, `assume`, `assert`). Each node's state is an
//! element of a product lattice:
//!
//! - a **flat constant lattice** per variable (`bottom` / a concrete integer
//!   / `top`), with parity derived from concrete values, and
//! - a **symmetric equality relation** over variables.
//!
//! The two halves exchange information through a *reduce* step: variables
//! holding the same concrete value become related, and concrete values
//! propagate along the relation. The analysis itself is a classic FIFO
//! worklist iteration that runs transfer functions over edges until the
//! states stop changing.
//!
//! Every `assert` contributes an extra edge into a designated *failure
//! node*. That edge fires unless the assertion evaluates to a definite
//! `true`; reaching the failure node therefore means "not provable in this
//! domain", which the analysis reports as [`Verdict::Unproved`][crate::cfg::Verdict].
//! Draining the worklist without reaching it proves every assertion.
//!
//! ## Basic Usage
//!
//! ```rust
//! use absint_rs::cfg::Verdict;
//! use absint_rs::program::parse_program;
//!
//! let program = "\
//!     a b\n\
//!     L0 a := 5 L1\n\
//!     L1 b := a L2\n\
//!     L2 assert (a == b) L2\n";
//!
//! let mut cfg = parse_program(program).unwrap();
//! assert_eq!(cfg.analyze().unwrap(), Verdict::Proved);
//! ```
//!
//! ## Core Components
//!
//! - **[`cfg`]**: The control-flow graph and the worklist fixed-point loop.
//! - **[`state`]**: The constant-times-equality abstract state and `reduce`.
//! - **[`expr`]** / **[`command`]**: Predicates and edge transfer functions.
//! - **[`program`]**: The textual program format.

pub mod cfg;
pub mod command;
pub mod constant;
pub mod error;
pub mod expr;
pub mod parse;
pub mod program;
pub mod state;
pub mod tribool;
pub mod types;
