//! Packs input adjoints into gradients and jacobians.

use ndarray::Array2;
use tracing::trace;

use super::forward::Recording;
use super::matrix::JacobianSink;

/// One reverse sweep seeded at the scalar output; returns the adjoints of the
/// active inputs in declaration order.
pub fn gradient(recording: &mut Recording) -> Vec<f64> {
    let Some(output) = recording.outputs.first() else {
        return vec![0.0; recording.inputs.len()];
    };
    recording.tape.backward(output.node);
    recording
        .inputs
        .iter()
        .map(|input| recording.tape.adjoint(input.node))
        .collect()
}

/// Jacobian of every output slot. Row `j` comes from a sweep seeded only at
/// slot `j`, with all adjoints cleared in between, so rows are independent.
///
/// Columns are the active inputs followed by one column per output slot;
/// those pass-through columns stay zero.
pub fn jacobian(recording: &mut Recording) -> Array2<f64> {
    let rows = recording.outputs.len();
    let cols = recording.inputs.len() + rows;
    let mut staging = Array2::zeros((rows, cols));

    for output in &recording.outputs {
        recording.tape.backward(output.node);
        for (col, input) in recording.inputs.iter().enumerate() {
            staging[[output.slot, col]] = recording.tape.adjoint(input.node);
        }
        trace!(row = output.slot, "assembled jacobian row");
    }

    recording.tape.reset_adjoints();
    staging
}

/// Copies a finished jacobian into the caller's sink. The sink has already
/// been checked to be large enough; cells outside `staging` are untouched.
pub fn write_into<S: JacobianSink + ?Sized>(staging: &Array2<f64>, sink: &mut S) {
    for ((row, col), &value) in staging.indexed_iter() {
        sink.set(row, col, value);
    }
}
