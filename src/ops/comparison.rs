// comparison.rs
// Comparisons, selects and the piecewise-linear functions built on them.
// None of these is differentiable everywhere: the derivative rule follows the
// branch that was taken at the recorded primal values, and exact ties are
// settled by the tape's `BranchPolicy`.

use super::Partials;
use crate::graph::{Boundary, BranchPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    /// IEEE-754 comparison: anything involving NaN is false except `NotEqual`.
    pub fn holds(&self, a: f64, b: f64) -> bool {
        match self {
            Comparison::Greater => a > b,
            Comparison::GreaterEqual => a >= b,
            Comparison::Less => a < b,
            Comparison::LessEqual => a <= b,
            Comparison::Equal => a == b,
            Comparison::NotEqual => a != b,
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Comparison::Greater => ">",
            Comparison::GreaterEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessEqual => "<=",
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        };
        f.write_str(symbol)
    }
}

/// Operand of a `max`/`min` that owns an exact tie under
/// [`Boundary::Inactive`]. [`Boundary::Active`] hands the tie to the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tie {
    First,
    Second,
}

/// Which operand of a select was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Then,
    Else,
}

impl Branch {
    fn operand(self) -> usize {
        match self {
            Branch::Then => 0,
            Branch::Else => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    /// 1.0 if the comparison holds, 0.0 otherwise. A step function, so its
    /// derivative is zero on both sides.
    Compare(Comparison),
    /// Operands are (then, else); the value is the taken one.
    Select(Branch),
    /// max(x, 0)
    Relu,
    /// Larger operand. Ties go to the operand named by [`Tie`].
    Max(Tie),
    /// Smaller operand. Ties go to the operand named by [`Tie`].
    Min(Tie),
    Abs,
}

impl BranchOp {
    pub fn num_inputs(&self) -> usize {
        match self {
            BranchOp::Compare(_) | BranchOp::Select(_) | BranchOp::Max(_) | BranchOp::Min(_) => 2,
            BranchOp::Relu | BranchOp::Abs => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BranchOp::Compare(_) => "Compare",
            BranchOp::Select(_) => "Select",
            BranchOp::Relu => "ReLU",
            BranchOp::Max(_) => "Max",
            BranchOp::Min(_) => "Min",
            BranchOp::Abs => "Abs",
        }
    }

    pub fn compute(&self, inputs: &[f64]) -> f64 {
        match self {
            BranchOp::Compare(cmp) => {
                if cmp.holds(inputs[0], inputs[1]) {
                    1.0
                } else {
                    0.0
                }
            }
            BranchOp::Select(branch) => inputs[branch.operand()],
            BranchOp::Relu => {
                let x = inputs[0];
                if x > 0.0 || x.is_nan() { x } else { 0.0 }
            }
            BranchOp::Max(_) => {
                let (a, b) = (inputs[0], inputs[1]);
                if a < b { b } else { a }
            }
            BranchOp::Min(_) => {
                let (a, b) = (inputs[0], inputs[1]);
                if b < a { b } else { a }
            }
            BranchOp::Abs => inputs[0].abs(),
        }
    }

    pub fn gradient(&self, adjoint: f64, inputs: &[f64], policy: &BranchPolicy) -> Partials {
        match self {
            BranchOp::Compare(_) => [0.0, 0.0],
            BranchOp::Select(branch) => {
                let mut partials = [0.0, 0.0];
                partials[branch.operand()] = adjoint;
                partials
            }
            BranchOp::Relu => [adjoint * relu_slope(inputs[0], policy), 0.0],
            BranchOp::Max(tie) => tie_partials(adjoint, inputs[0], inputs[1], true, *tie, policy),
            BranchOp::Min(tie) => tie_partials(adjoint, inputs[0], inputs[1], false, *tie, policy),
            BranchOp::Abs => [adjoint * abs_slope(inputs[0], policy), 0.0],
        }
    }
}

fn relu_slope(x: f64, policy: &BranchPolicy) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        0.0
    } else {
        policy.at_boundary(0.0, 1.0)
    }
}

fn abs_slope(x: f64, policy: &BranchPolicy) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        policy.at_boundary(0.0, 1.0)
    }
}

// Routes the whole adjoint to the selected operand of max/min.
fn tie_partials(
    adjoint: f64,
    a: f64,
    b: f64,
    is_max: bool,
    tie: Tie,
    policy: &BranchPolicy,
) -> Partials {
    let second_wins = if is_max { a < b } else { b < a };
    let first_wins = if is_max { b < a } else { a < b };

    let take_second = if second_wins {
        true
    } else if first_wins {
        false
    } else {
        // Tie (or NaN): the recorded owner keeps the boundary unless the
        // policy moves it to the other side.
        let owner_is_second = tie == Tie::Second;
        match policy.boundary {
            Boundary::Inactive => owner_is_second,
            Boundary::Active => !owner_is_second,
        }
    };

    if take_second {
        [0.0, adjoint]
    } else {
        [adjoint, 0.0]
    }
}
