// unary.rs
// Transcendental and power functions of a single operand.
// Rules are evaluated at the primal values recorded in the forward pass;
// where the derivative is a function of the output (exp, tanh, sigmoid, sqrt)
// the recorded output is reused instead of recomputing it.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Square,
    Exp,
    /// Natural logarithm.
    Ln,
    Sqrt,
    /// x^p for a constant exponent p.
    Powf(f64),
    Tanh,
    Sigmoid,
    Sin,
    Cos,
}

impl UnaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Square => "Square",
            UnaryOp::Exp => "Exp",
            UnaryOp::Ln => "Ln",
            UnaryOp::Sqrt => "Sqrt",
            UnaryOp::Powf(_) => "Powf",
            UnaryOp::Tanh => "Tanh",
            UnaryOp::Sigmoid => "Sigmoid",
            UnaryOp::Sin => "Sin",
            UnaryOp::Cos => "Cos",
        }
    }

    pub fn compute(&self, x: f64) -> f64 {
        match self {
            UnaryOp::Square => x * x,
            UnaryOp::Exp => x.exp(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Powf(p) => x.powf(*p),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
        }
    }

    pub fn gradient(&self, adjoint: f64, x: f64, output: f64) -> f64 {
        match self {
            UnaryOp::Square => adjoint * 2.0 * x,
            // d/dx exp(x) = exp(x), which is the recorded output
            UnaryOp::Exp => adjoint * output,
            UnaryOp::Ln => adjoint / x,
            // d/dx sqrt(x) = 1 / (2 sqrt(x))
            UnaryOp::Sqrt => adjoint / (2.0 * output),
            UnaryOp::Powf(p) => adjoint * p * x.powf(p - 1.0),
            UnaryOp::Tanh => adjoint * (1.0 - output * output),
            UnaryOp::Sigmoid => adjoint * output * (1.0 - output),
            UnaryOp::Sin => adjoint * x.cos(),
            UnaryOp::Cos => -adjoint * x.sin(),
        }
    }
}
