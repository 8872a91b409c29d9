//! # Tapegrad
//!
//! Tapegrad is a small reverse-mode automatic differentiation engine for
//! plain imperative numeric code written with scalars, arrays and branches.
//!
//! A target function is an ordinary Rust closure that receives an explicit
//! [`Tape`] and a [`Frame`] with its parameters. Every arithmetic helper on
//! the tape evaluates the operation and appends a node, so running the
//! closure once yields both the primal results and a recording of how they
//! were computed. The recording is then swept backwards to obtain
//! derivatives.
//!
//! ## Features
//!
//! - Gradients of scalar functions ([`gradient`])
//! - Full jacobians of functions writing into output buffers ([`jacobian`])
//! - Differentiation with respect to any subset of the parameters
//! - Branches, `relu`, `max`, `min` and `abs` with a documented convention at
//!   kinks ([`BranchPolicy`])
//! - Tracked arrays with recorded reads and writes
//! - GraphViz export of recorded tapes
//!
//! ```
//! use tapegrad::{Signature, gradient};
//!
//! let df = gradient(Signature::new().scalar("x"), |tape, frame| {
//!     let x = frame.scalar(0)?;
//!     Ok(tape.exp(x))
//! })?;
//!
//! let mut dx = [0.0];
//! df.execute(&[1.0], &mut dx)?;
//! assert!((dx[0] - std::f64::consts::E).abs() < 1e-12);
//! # Ok::<(), tapegrad::GradError>(())
//! ```
pub mod diff;
pub mod error;
pub mod graph;
pub mod ops;

// Re-export commonly used types for convenience
pub use diff::{
    Arg, DerivativeMatrix, Frame, Gradient, Jacobian, JacobianSink, ParamRole, Signature,
    gradient, jacobian,
};
pub use error::{GradError, Result};
pub use graph::{Boundary, BranchPolicy, Cond, NodeId, Tape, TrackedArray, Var};
pub use ops::Comparison;
