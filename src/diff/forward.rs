//! Forward evaluation with recording.
//!
//! Builds a fresh tape for one call, binds every parameter to a leaf (or a
//! tracked array for outputs), runs the target function on it and collects the
//! input and output bindings the assembler needs.

use tracing::debug;

use crate::error::Result;
use crate::graph::{BranchPolicy, NodeId, Tape, TrackedArray, Var};

use super::frame::{Binding, Frame};
use super::signature::{Arg, ParamRole, Signature};

/// Parameter position → leaf holding its value. Only active parameters get
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBinding {
    pub position: usize,
    pub node: NodeId,
}

/// Output slot → node holding its final value. `slot` indexes the flattened
/// outputs of the call; `index` is the position inside its own buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputBinding {
    pub position: usize,
    pub index: usize,
    pub slot: usize,
    pub node: NodeId,
    pub value: f64,
}

/// One forward pass: the tape plus its bindings.
#[derive(Debug, Clone)]
pub struct Recording {
    pub tape: Tape,
    pub inputs: Vec<InputBinding>,
    pub outputs: Vec<OutputBinding>,
}

fn bind_scalar(
    tape: &mut Tape,
    position: usize,
    role: ParamRole,
    value: f64,
    inputs: &mut Vec<InputBinding>,
) -> Binding {
    let var = if role == ParamRole::Active {
        let var = tape.input(value);
        inputs.push(InputBinding {
            position,
            node: var.id(),
        });
        var
    } else {
        tape.constant(value)
    };
    Binding::Scalar(var)
}

/// Records a scalar-valued target. `args` holds one value per parameter; the
/// caller has already checked it against `signature`.
pub fn record_scalar<F>(
    signature: &Signature,
    policy: BranchPolicy,
    args: &[f64],
    f: &F,
) -> Result<(Recording, Var)>
where
    F: Fn(&mut Tape, &mut Frame) -> Result<Var>,
{
    let mut tape = Tape::with_policy(policy);
    let mut inputs = Vec::with_capacity(signature.num_active());

    let bindings = signature
        .params()
        .iter()
        .zip(args)
        .enumerate()
        .map(|(position, (param, &value))| {
            bind_scalar(&mut tape, position, param.role, value, &mut inputs)
        })
        .collect();

    let mut frame = Frame::new(bindings);
    let output = f(&mut tape, &mut frame)?;

    debug!(
        tape = tape.id().0,
        nodes = tape.len(),
        inputs = inputs.len(),
        "recorded scalar function"
    );

    let outputs = vec![OutputBinding {
        position: 0,
        index: 0,
        slot: 0,
        node: output.id(),
        value: output.value(),
    }];

    Ok((
        Recording {
            tape,
            inputs,
            outputs,
        },
        output,
    ))
}

/// Records a target writing into output buffers. Output arrays start with
/// the buffers' current contents; nothing is written back here.
pub fn record_vector<F>(
    signature: &Signature,
    policy: BranchPolicy,
    args: &[Arg<'_>],
    f: &F,
) -> Result<Recording>
where
    F: Fn(&mut Tape, &mut Frame) -> Result<()>,
{
    let mut tape = Tape::with_policy(policy);
    let mut inputs = Vec::with_capacity(signature.num_active());

    let bindings = signature
        .params()
        .iter()
        .zip(args)
        .enumerate()
        .map(|(position, (param, arg))| match arg {
            Arg::Scalar(value) => bind_scalar(&mut tape, position, param.role, *value, &mut inputs),
            Arg::Output(buffer) => Binding::Output(TrackedArray::from_values(&mut tape, buffer)),
        })
        .collect();

    let mut frame = Frame::new(bindings);
    f(&mut tape, &mut frame)?;

    let mut outputs = Vec::new();
    for (position, array) in frame.into_outputs() {
        for (index, var) in array.slots().iter().enumerate() {
            outputs.push(OutputBinding {
                position,
                index,
                slot: outputs.len(),
                node: var.id(),
                value: var.value(),
            });
        }
    }

    debug!(
        tape = tape.id().0,
        nodes = tape.len(),
        inputs = inputs.len(),
        outputs = outputs.len(),
        "recorded vector function"
    );

    Ok(Recording {
        tape,
        inputs,
        outputs,
    })
}
