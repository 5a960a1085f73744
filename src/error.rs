use thiserror::Error;

/// Fatal analysis failures.
///
/// The expected negative outcome of an analysis (an assertion that cannot be
/// proved) is *not* an error; it is reported as
/// [`Verdict::Unproved`][crate::cfg::Verdict]. Every variant here aborts
/// either CFG construction or the fixed-point iteration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An edge references a node outside the graph, or `analyze` was invoked
    /// on an incomplete graph (no fail node designated, or no nodes at all).
    #[error("malformed CFG: {0}")]
    CfgMalformed(String),

    /// Command text does not match the supported command grammar.
    #[error("cannot parse command `{0}`")]
    CommandParse(String),

    /// Expression text does not match the supported predicate grammar.
    #[error("cannot parse expression `{0}`")]
    ExpressionParse(String),

    /// `reduce` found two distinct concrete values forced equal by the
    /// equality relation. Either a transfer-function soundness bug or an
    /// infeasible path the domain cannot represent as Bottom.
    #[error("lattice inconsistency: {0}")]
    LatticeInconsistency(String),

    /// A tribool was constructed from a raw value outside {-1, 0, 1}.
    #[error("tribool raw value out of range: {0}")]
    InvalidTriboolValue(i8),
}

pub type Result<T> = std::result::Result<T, Error>;
