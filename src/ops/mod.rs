// ops/mod.rs
// Elementary operations that can be recorded on a tape.
// Every operation knows how to compute its primal value from its operands and
// how to split an incoming adjoint between those operands (its local
// derivative rule). The tape and the propagator only ever go through
// `OpKind::compute` and `OpKind::gradient`.

use crate::graph::BranchPolicy;

pub mod array;
pub mod basic;
pub mod comparison;
pub mod unary;

pub use array::ArrayOp;
pub use basic::BasicOp;
pub use comparison::{Branch, BranchOp, Comparison, Tie};
pub use unary::UnaryOp;

/// Adjoint contributions for up to two operands. Unused slots are zero.
pub type Partials = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpKind {
    /// Differentiable leaf bound to a function parameter.
    Input,
    /// Leaf that is never differentiated (literals, fixed parameters).
    Constant,
    Basic(BasicOp),
    Unary(UnaryOp),
    Branch(BranchOp),
    Array(ArrayOp),
}

impl OpKind {
    pub fn num_inputs(&self) -> usize {
        match self {
            OpKind::Input | OpKind::Constant => 0,
            OpKind::Basic(op) => op.num_inputs(),
            OpKind::Unary(_) => 1,
            OpKind::Branch(op) => op.num_inputs(),
            OpKind::Array(_) => 1,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, OpKind::Input | OpKind::Constant)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Input => "Input",
            OpKind::Constant => "Constant",
            OpKind::Basic(op) => op.name(),
            OpKind::Unary(op) => op.name(),
            OpKind::Branch(op) => op.name(),
            OpKind::Array(op) => op.name(),
        }
    }

    /// Primal value of the operation. Leaves have no rule; their value is
    /// supplied when they are recorded, so this returns NaN for them.
    pub fn compute(&self, inputs: &[f64]) -> f64 {
        match self {
            OpKind::Input | OpKind::Constant => f64::NAN,
            OpKind::Basic(op) => op.compute(inputs),
            OpKind::Unary(op) => op.compute(inputs[0]),
            OpKind::Branch(op) => op.compute(inputs),
            OpKind::Array(_) => inputs[0],
        }
    }

    /// Local derivative rule: how `adjoint` (the sensitivity of this node)
    /// is distributed to the operands, evaluated at the recorded primal
    /// `inputs` and `output`.
    pub fn gradient(
        &self,
        adjoint: f64,
        inputs: &[f64],
        output: f64,
        policy: &BranchPolicy,
    ) -> Partials {
        match self {
            OpKind::Input | OpKind::Constant => [0.0, 0.0],
            OpKind::Basic(op) => op.gradient(adjoint, inputs),
            OpKind::Unary(op) => [op.gradient(adjoint, inputs[0], output), 0.0],
            OpKind::Branch(op) => op.gradient(adjoint, inputs, policy),
            OpKind::Array(_) => [adjoint, 0.0],
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Basic(BasicOp::AddScalar(c)) => write!(f, "AddScalar({c})"),
            OpKind::Basic(BasicOp::MulScalar(c)) => write!(f, "MulScalar({c})"),
            OpKind::Unary(UnaryOp::Powf(p)) => write!(f, "Powf({p})"),
            OpKind::Branch(BranchOp::Compare(cmp)) => write!(f, "Compare({cmp})"),
            OpKind::Array(op) => write!(f, "{}[{}]", op.name(), op.slot()),
            other => f.write_str(other.name()),
        }
    }
}
