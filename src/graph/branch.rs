//! Branch policy: how conditionals and kinks are differentiated.
//!
//! Conditionals follow the sub-gradient convention: the branch taken at the
//! recorded primal values decides which local rule applies and the untaken
//! branch contributes nothing. Code may branch either through [`Tape::select`]
//! or with a plain `if` on [`Var::value`]; in the second case only the taken
//! path is ever recorded, which yields the same derivatives.
//!
//! Kinked primitives (`relu`, `max`, `min`, `abs`) need an extra decision at
//! the exact boundary, where no derivative exists. [`Boundary::Inactive`]
//! (the default) assigns the boundary to the "zero" side:
//!
//! * `relu'(0) = 0` and `abs'(0) = 0`,
//! * `max(a, b)` and `min(a, b)` with `a == b` send the adjoint to the
//!   constant operand when exactly one of them is a constant leaf, so both
//!   `max(z, 0)` and `max(0, z)` give `z` a zero derivative at `z == 0`.
//!   Otherwise the first operand takes it, as with C++ `std::max`.
//!
//! [`Boundary::Active`] moves every boundary to the other side. Either choice
//! is deterministic; neither is more correct than the other.

use super::node::Var;
use super::tape::Tape;
use crate::ops::{Branch, BranchOp, Comparison, OpKind, Tie};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Kinks belong to the flat (zero-derivative) side. A `max`/`min` tie
    /// between two non-constant operands goes to the first one.
    #[default]
    Inactive,
    /// Kinks belong to the sloped side. A `max`/`min` tie between two
    /// non-constant operands goes to the second one.
    Active,
}

/// Differentiation conventions carried by a tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BranchPolicy {
    pub boundary: Boundary,
}

impl BranchPolicy {
    pub fn new(boundary: Boundary) -> Self {
        Self { boundary }
    }

    /// Picks the derivative used exactly at a kink.
    pub fn at_boundary(&self, inactive: f64, active: f64) -> f64 {
        match self.boundary {
            Boundary::Inactive => inactive,
            Boundary::Active => active,
        }
    }
}

/// Result of a recorded comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cond {
    var: Var,
    holds: bool,
}

impl Cond {
    pub fn holds(&self) -> bool {
        self.holds
    }

    /// The comparison as a 1.0 / 0.0 value, usable in arithmetic such as
    /// `(x > 0) * x`.
    pub fn var(&self) -> Var {
        self.var
    }

    pub fn branch(&self) -> Branch {
        if self.holds { Branch::Then } else { Branch::Else }
    }
}

impl Tape {
    pub fn compare(&mut self, a: Var, cmp: Comparison, b: Var) -> Cond {
        let var = self.record(OpKind::Branch(BranchOp::Compare(cmp)), &[a, b]);
        Cond {
            var,
            holds: var.value == 1.0,
        }
    }

    /// `if cond { then } else { otherwise }`. Both operands must already be
    /// recorded; only the taken one receives an adjoint.
    pub fn select(&mut self, cond: Cond, then: Var, otherwise: Var) -> Var {
        self.record(OpKind::Branch(BranchOp::Select(cond.branch())), &[then, otherwise])
    }

    pub fn relu(&mut self, a: Var) -> Var {
        self.record(OpKind::Branch(BranchOp::Relu), &[a])
    }

    pub fn max(&mut self, a: Var, b: Var) -> Var {
        let tie = self.tie_owner(a, b);
        self.record(OpKind::Branch(BranchOp::Max(tie)), &[a, b])
    }

    pub fn min(&mut self, a: Var, b: Var) -> Var {
        let tie = self.tie_owner(a, b);
        self.record(OpKind::Branch(BranchOp::Min(tie)), &[a, b])
    }

    // A lone constant operand owns the tie; it is the flat side of the kink.
    fn tie_owner(&self, a: Var, b: Var) -> Tie {
        let is_constant =
            |v: Var| self.node(v.id).is_some_and(|node| node.op == OpKind::Constant);
        if is_constant(b) && !is_constant(a) {
            Tie::Second
        } else {
            Tie::First
        }
    }

    pub fn abs(&mut self, a: Var) -> Var {
        self.record(OpKind::Branch(BranchOp::Abs), &[a])
    }
}
