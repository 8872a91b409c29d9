use tracing::trace;

use super::branch::BranchPolicy;
use super::node::{Node, NodeId, TapeId, Var, next_tape_id};
use crate::ops::{BasicOp, OpKind, UnaryOp};

/// Append-only record of one forward evaluation.
///
/// Every recording primitive evaluates its operation on the primal values of
/// its operands, appends one node and returns a [`Var`] handle to it. Because
/// nodes are appended in execution order, operands always precede their
/// consumers and the tape is a topologically sorted DAG by construction.
///
/// A tape is meant to live for a single forward/backward cycle: the driver
/// creates one per `execute` call and drops it afterwards.
#[derive(Debug, Clone)]
pub struct Tape {
    pub(crate) id: TapeId,
    pub(crate) nodes: Vec<Node>,
    pub(crate) policy: BranchPolicy,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    pub fn new() -> Self {
        Self::with_policy(BranchPolicy::default())
    }

    pub fn with_policy(policy: BranchPolicy) -> Self {
        Self {
            id: next_tape_id(),
            nodes: Vec::new(),
            policy,
        }
    }

    pub fn with_capacity(capacity: usize, policy: BranchPolicy) -> Self {
        Self {
            id: next_tape_id(),
            nodes: Vec::with_capacity(capacity),
            policy,
        }
    }

    pub fn id(&self) -> TapeId {
        self.id
    }

    pub fn policy(&self) -> BranchPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Primal value of a recorded node.
    pub fn value(&self, id: NodeId) -> Option<f64> {
        self.node(id).map(|node| node.value)
    }

    /// Adjoint currently held by a node. Zero for unknown ids.
    pub fn adjoint(&self, id: NodeId) -> f64 {
        self.node(id).map_or(0.0, |node| node.adjoint)
    }

    /// Handle for an already recorded node.
    pub fn var(&self, id: NodeId) -> Option<Var> {
        self.node(id).map(|node| Var {
            id,
            value: node.value,
            tape: self.id,
        })
    }

    fn push_node(&mut self, op: OpKind, inputs: [NodeId; 2], value: f64) -> Var {
        let id = NodeId(self.nodes.len());
        trace!(node = id.0, op = op.name(), value, "record");
        self.nodes.push(Node::new(id, op, inputs, value));
        Var {
            id,
            value,
            tape: self.id,
        }
    }

    /// Records `op` applied to `operands` and returns the new node's handle.
    pub(crate) fn record(&mut self, op: OpKind, operands: &[Var]) -> Var {
        debug_assert_eq!(operands.len(), op.num_inputs());
        let mut ids = [NodeId(0); 2];
        let mut values = [0.0; 2];
        for (slot, operand) in operands.iter().enumerate() {
            debug_assert_eq!(
                operand.tape, self.id,
                "operand {} belongs to another tape",
                operand.id
            );
            ids[slot] = operand.id;
            values[slot] = operand.value;
        }
        let value = op.compute(&values[..operands.len()]);
        self.push_node(op, ids, value)
    }

    /// New differentiable leaf.
    pub fn input(&mut self, value: f64) -> Var {
        self.push_node(OpKind::Input, [NodeId(0); 2], value)
    }

    /// New constant leaf. Its adjoint is never reported.
    pub fn constant(&mut self, value: f64) -> Var {
        self.push_node(OpKind::Constant, [NodeId(0); 2], value)
    }

    pub fn add(&mut self, a: Var, b: Var) -> Var {
        self.record(OpKind::Basic(BasicOp::Add), &[a, b])
    }

    pub fn sub(&mut self, a: Var, b: Var) -> Var {
        self.record(OpKind::Basic(BasicOp::Sub), &[a, b])
    }

    pub fn mul(&mut self, a: Var, b: Var) -> Var {
        self.record(OpKind::Basic(BasicOp::Mul), &[a, b])
    }

    pub fn div(&mut self, a: Var, b: Var) -> Var {
        self.record(OpKind::Basic(BasicOp::Div), &[a, b])
    }

    pub fn neg(&mut self, a: Var) -> Var {
        self.record(OpKind::Basic(BasicOp::Neg), &[a])
    }

    pub fn add_scalar(&mut self, a: Var, c: f64) -> Var {
        self.record(OpKind::Basic(BasicOp::AddScalar(c)), &[a])
    }

    pub fn mul_scalar(&mut self, a: Var, c: f64) -> Var {
        self.record(OpKind::Basic(BasicOp::MulScalar(c)), &[a])
    }

    pub fn square(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Square), &[a])
    }

    pub fn exp(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Exp), &[a])
    }

    pub fn ln(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Ln), &[a])
    }

    pub fn sqrt(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Sqrt), &[a])
    }

    pub fn powf(&mut self, a: Var, exponent: f64) -> Var {
        self.record(OpKind::Unary(UnaryOp::Powf(exponent)), &[a])
    }

    pub fn tanh(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Tanh), &[a])
    }

    pub fn sigmoid(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Sigmoid), &[a])
    }

    pub fn sin(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Sin), &[a])
    }

    pub fn cos(&mut self, a: Var) -> Var {
        self.record(OpKind::Unary(UnaryOp::Cos), &[a])
    }
}
