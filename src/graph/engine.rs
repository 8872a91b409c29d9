use tracing::trace;

use super::node::NodeId;
use super::tape::Tape;

/// Reverse sweep over a recorded tape.
///
/// Seeding writes an adjoint into an output node; [`Tape::propagate`] then
/// visits the nodes from the last one to the first, hands each node's adjoint
/// to its operands through the operation's local rule and clears it. Leaves
/// keep what they received, so after a sweep each input leaf holds the total
/// derivative of the seeded output with respect to that input.
impl Tape {
    /// Adds `adjoint` to the adjoint of `node`. Unknown ids are ignored.
    pub fn seed(&mut self, node: NodeId, adjoint: f64) {
        if let Some(node) = self.nodes.get_mut(node.0) {
            node.adjoint += adjoint;
        }
    }

    /// Zeroes every adjoint. Primal values are left untouched so the same
    /// recording can be swept again with a different seed.
    pub fn reset_adjoints(&mut self) {
        for node in &mut self.nodes {
            node.adjoint = 0.0;
        }
    }

    /// Distributes all seeded adjoints down to the leaves.
    ///
    /// Nodes whose adjoint is exactly zero are skipped. Host arithmetic would
    /// still multiply that zero by the local partial, so an infinite or NaN
    /// partial (e.g. `0 * ln(x)` at `x == 0`) reports `0` here instead of
    /// NaN. Non-zero adjoints meeting such partials propagate NaN/inf as usual.
    pub fn propagate(&mut self) {
        let policy = self.policy;
        let mut visited = 0usize;

        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            let adjoint = node.adjoint;
            // Nothing flows out of leaves, and zero adjoints contribute nothing.
            if node.is_leaf() || adjoint == 0.0 {
                continue;
            }

            let op = node.op;
            let arity = op.num_inputs();
            let inputs = node.inputs;
            let output = node.value;

            let mut operand_values = [0.0; 2];
            for slot in 0..arity {
                operand_values[slot] = self.nodes[inputs[slot].0].value;
            }

            let partials = op.gradient(adjoint, &operand_values[..arity], output, &policy);

            self.nodes[index].adjoint = 0.0;
            for slot in 0..arity {
                // Accumulate: a node reached through several paths sums them.
                self.nodes[inputs[slot].0].adjoint += partials[slot];
            }
            visited += 1;
        }

        trace!(tape = self.id.0, nodes = self.nodes.len(), visited, "propagated adjoints");
    }

    /// Full reverse pass for a single output: clears adjoints, seeds `output`
    /// with 1 and propagates.
    pub fn backward(&mut self, output: NodeId) {
        self.reset_adjoints();
        self.seed(output, 1.0);
        self.propagate();
    }
}
