use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ops::OpKind;

// Unique ID generator for tapes. Node ids are plain positions inside a tape,
// but handles must not wander from one tape into another.
static TAPE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn next_tape_id() -> TapeId {
    // Relaxed is enough: the counter only has to hand out distinct values.
    // `test_tape_id_atomicity` checks this across threads.
    TapeId(TAPE_COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TapeId(pub usize);

/// Position of a node in its tape. Operands always have smaller ids than the
/// node consuming them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One tape entry: the operation, its operands, the primal value computed in
/// the forward pass and the adjoint accumulated in the reverse pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub op: OpKind,
    // Only the first `op.num_inputs()` entries are meaningful.
    pub(crate) inputs: [NodeId; 2],
    pub value: f64,
    pub adjoint: f64,
}

impl Node {
    pub(crate) fn new(id: NodeId, op: OpKind, inputs: [NodeId; 2], value: f64) -> Self {
        Self {
            id,
            op,
            inputs,
            value,
            adjoint: 0.0,
        }
    }

    /// Operand ids, in the order the operation consumes them.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs[..self.op.num_inputs()]
    }

    /// Leaves (inputs and constants) have no operands and keep their adjoint
    /// after propagation.
    pub fn is_leaf(&self) -> bool {
        self.op.is_leaf()
    }
}

/// Handle to a recorded value. Cheap to copy; carries the primal value so
/// target functions can branch on it with plain `if`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Var {
    pub(crate) id: NodeId,
    pub(crate) value: f64,
    pub(crate) tape: TapeId,
}

impl Var {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn tape(&self) -> TapeId {
        self.tape
    }
}
