use thiserror::Error;

/// Errors raised by curve & surface construction, mutation and sampling.
///
/// Variants fall into two groups: malformed arguments
/// ([`TooFewControlPoints`](SplineError::TooFewControlPoints) through
/// [`InvalidDivisionCount`](SplineError::InvalidDivisionCount)) and
/// out-of-range indexing
/// ([`IndexOutOfBounds`](SplineError::IndexOutOfBounds)).
/// Evaluation parameters outside the knot domain are not an error,
/// they are clamped to the nearest domain endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplineError {
    #[error("degree {degree} requires more than {degree} control points, got {count}")]
    TooFewControlPoints { degree: usize, count: usize },

    #[error("expected {expected} knots for {count} control points of degree {degree}, got {got}")]
    KnotSizeMismatch {
        expected: usize,
        got: usize,
        count: usize,
        degree: usize,
    },

    #[error("knot vector decreases at index {index}")]
    DecreasingKnots { index: usize },

    #[error("degree must be at least 1")]
    InvalidDegree,

    #[error("expected {expected} weights, got {got}")]
    WeightCountMismatch { expected: usize, got: usize },

    #[error("control point weights must be non-zero")]
    ZeroWeight,

    #[error("expected {expected} control points, got {got}")]
    PointCountMismatch { expected: usize, got: usize },

    #[error("control point grid rows must all have the same length")]
    RaggedGrid,

    #[error("division count must be at least 1, got {0}")]
    InvalidDivisionCount(usize),

    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
