//! Differentiation driver: signatures, recording, assembly and the public
//! `gradient` / `jacobian` entry points.

pub mod assemble;
pub mod forward;
pub mod frame;
pub mod gradient;
pub mod jacobian;
pub mod matrix;
pub mod signature;
mod tests;

pub use forward::{InputBinding, OutputBinding, Recording};
pub use frame::Frame;
pub use gradient::{Gradient, gradient};
pub use jacobian::{Jacobian, jacobian};
pub use matrix::{DerivativeMatrix, JacobianSink};
pub use signature::{Arg, Param, ParamKind, ParamRole, Signature};
