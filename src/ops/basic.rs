// basic.rs
// Arithmetic operations: the building blocks of every recorded expression.

use super::Partials;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasicOp {
    /// a + b
    Add,
    /// a - b
    Sub,
    /// a * b
    Mul,
    /// a / b
    Div,
    /// -a
    Neg,
    /// a + c for a constant c
    AddScalar(f64),
    /// a * c for a constant c
    MulScalar(f64),
}

impl BasicOp {
    pub fn num_inputs(&self) -> usize {
        match self {
            BasicOp::Add | BasicOp::Sub | BasicOp::Mul | BasicOp::Div => 2,
            BasicOp::Neg | BasicOp::AddScalar(_) | BasicOp::MulScalar(_) => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BasicOp::Add => "Add",
            BasicOp::Sub => "Sub",
            BasicOp::Mul => "Mul",
            BasicOp::Div => "Div",
            BasicOp::Neg => "Neg",
            BasicOp::AddScalar(_) => "AddScalar",
            BasicOp::MulScalar(_) => "MulScalar",
        }
    }

    pub fn compute(&self, inputs: &[f64]) -> f64 {
        match self {
            BasicOp::Add => inputs[0] + inputs[1],
            BasicOp::Sub => inputs[0] - inputs[1],
            BasicOp::Mul => inputs[0] * inputs[1],
            BasicOp::Div => inputs[0] / inputs[1],
            BasicOp::Neg => -inputs[0],
            BasicOp::AddScalar(c) => inputs[0] + c,
            BasicOp::MulScalar(c) => inputs[0] * c,
        }
    }

    pub fn gradient(&self, adjoint: f64, inputs: &[f64]) -> Partials {
        match self {
            // d/da(a + b) = 1, d/db(a + b) = 1
            BasicOp::Add => [adjoint, adjoint],
            BasicOp::Sub => [adjoint, -adjoint],
            // Each side is scaled by the other side's primal value.
            BasicOp::Mul => [adjoint * inputs[1], adjoint * inputs[0]],
            // d/da(a / b) = 1 / b, d/db(a / b) = -a / b^2
            BasicOp::Div => {
                let (a, b) = (inputs[0], inputs[1]);
                [adjoint / b, -adjoint * a / (b * b)]
            }
            BasicOp::Neg => [-adjoint, 0.0],
            BasicOp::AddScalar(_) => [adjoint, 0.0],
            BasicOp::MulScalar(c) => [adjoint * c, 0.0],
        }
    }
}
