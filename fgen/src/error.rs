/// Error of the target function evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The function has no finite value at the input
    #[error("function is undefined at x = {0}")]
    Undefined(f64),
    /// Error reported by the evaluator itself
    #[error("{0}")]
    Message(String),
}

/// Fatal error of a synthesis task.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynError {
    /// Invalid function domain
    #[error("invalid domain [{x_min}, {x_max}], x_max must be greater than x_min")]
    Domain {
        /// Lower bound
        x_min: f64,
        /// Upper bound
        x_max: f64,
    },
    /// Invalid start angle or rotation span
    #[error("non-finite link angle: {0}")]
    Angle(f64),
    /// The function cannot be evaluated at a fixed point
    #[error("evaluation failed at x = {x}: {source}")]
    Eval {
        /// Input value
        x: f64,
        /// Evaluator error
        source: EvalError,
    },
    /// Invalid search options
    #[error("invalid search option: {0}")]
    Config(String),
    /// Every candidate of the sweep is rejected
    #[error("no feasible linkage found")]
    NoFeasible,
}

/// Reason of rejecting a sweep candidate.
///
/// These are expected outcomes of the sweep, the candidate is skipped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Reject {
    /// Flat angle mapping (`y(x_min) = y(x_max)`)
    #[error("degenerate angle mapping")]
    Mapping,
    /// The Freudenstein system has no unique solution
    #[error("singular Freudenstein system")]
    Singular,
    /// `K1` or `K2` vanishes
    #[error("vanishing Freudenstein coefficient")]
    Coefficient,
    /// No real coupler length
    #[error("no real coupler length")]
    NoRealCoupler,
    /// Some link length is zero or negative
    #[error("non-positive link length")]
    NonPositive,
    /// Grashof's inequality is violated
    #[error("non-Grashof linkage")]
    NonGrashof,
    /// The loop cannot close at the start position
    #[error("loop cannot close at the start position")]
    NotClosed,
}

impl Reject {
    /// All kinds in checking order.
    pub const LIST: [Self; 7] = [
        Self::Mapping,
        Self::Singular,
        Self::Coefficient,
        Self::NoRealCoupler,
        Self::NonPositive,
        Self::NonGrashof,
        Self::NotClosed,
    ];

    pub(crate) const fn index(&self) -> usize {
        *self as usize
    }
}
