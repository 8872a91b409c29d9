//! Error type shared by every fallible operation of the crate.
//!
//! Only structural problems are reported here: a misdeclared signature, a call
//! whose arguments do not match it, an undersized derivative buffer or an out
//! of range tracked-array index. Floating point anomalies (division by zero,
//! NaN) are never errors, they flow through the tape as IEEE-754 values.

use thiserror::Error;

use crate::diff::signature::ParamKind;
use crate::graph::TapeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradError {
    /// A parameter was requested by name but the signature does not declare it.
    #[error("unknown parameter '{name}' (declared: {declared:?})")]
    UnknownParameter { name: String, declared: Vec<String> },

    /// Two parameters share the same name.
    #[error("parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String },

    /// An output buffer was named as a differentiation variable.
    #[error("parameter '{name}' is an output buffer and cannot be differentiated")]
    NotDifferentiable { name: String },

    /// Gradients are only defined for functions returning a single scalar.
    #[error("gradient signature declares output buffer '{name}'; use a jacobian instead")]
    OutputInGradient { name: String },

    /// Number of call arguments differs from the declared signature.
    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A call argument has the wrong role for its position.
    #[error("argument {position} should be {expected}, got {actual}")]
    RoleMismatch {
        position: usize,
        expected: ParamKind,
        actual: ParamKind,
    },

    /// The caller's gradient buffer cannot hold one partial per active input.
    #[error("gradient buffer holds {actual} slots, {required} required")]
    GradientBufferTooSmall { required: usize, actual: usize },

    /// The caller's derivative matrix is smaller than the Jacobian.
    #[error("derivative matrix is {actual_rows}x{actual_cols}, at least {rows}x{cols} required")]
    MatrixTooSmall {
        rows: usize,
        cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// A handle recorded on one tape was used with another.
    #[error("value from tape {actual:?} used on tape {expected:?}")]
    ForeignTape { expected: TapeId, actual: TapeId },

    /// A tracked array was indexed past its end.
    #[error("index {index} out of bounds for tracked array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, GradError>;
