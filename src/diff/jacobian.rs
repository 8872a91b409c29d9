use tracing::debug;

use crate::error::{GradError, Result};
use crate::graph::{BranchPolicy, Tape};

use super::assemble;
use super::forward::{self, Recording};
use super::frame::Frame;
use super::matrix::{DerivativeMatrix, JacobianSink};
use super::signature::{Arg, Signature};

/// Jacobian of a function that writes its results into output buffers.
///
/// Rows follow the output slots (all output buffers flattened in declaration
/// order). Columns are the `Active` scalars in declaration order followed by
/// one column per output slot; the latter are reserved by the call convention
/// and always written as zero.
#[derive(Debug, Clone)]
pub struct Jacobian<F> {
    f: F,
    signature: Signature,
    policy: BranchPolicy,
}

/// Builds the jacobian of `f` with respect to the `Active` scalars of
/// `signature`.
///
/// ```
/// use tapegrad::{Arg, DerivativeMatrix, Signature, jacobian};
///
/// let signature = Signature::new().scalar("x").scalar("y").output("out");
/// let jf = jacobian(signature, |tape, frame| {
///     let (x, y) = (frame.scalar(0)?, frame.scalar(1)?);
///     let xx = tape.mul(x, x);
///     let first = tape.add(xx, y);
///     let second = tape.mul(x, y);
///     let out = frame.output(2)?;
///     out.write(tape, 0, first)?;
///     out.write(tape, 1, second)?;
///     Ok(())
/// })?;
///
/// let mut out = [0.0; 2];
/// let mut jac = DerivativeMatrix::new(2, 4);
/// jf.execute(&mut [Arg::Scalar(2.0), Arg::Scalar(3.0), Arg::Output(&mut out)], &mut jac)?;
/// assert_eq!(out, [7.0, 6.0]);
/// assert_eq!((jac[(0, 0)], jac[(0, 1)]), (4.0, 1.0));
/// assert_eq!((jac[(1, 0)], jac[(1, 1)]), (3.0, 2.0));
/// # Ok::<(), tapegrad::GradError>(())
/// ```
pub fn jacobian<F>(signature: Signature, f: F) -> Result<Jacobian<F>>
where
    F: Fn(&mut Tape, &mut Frame) -> Result<()>,
{
    signature.validate()?;
    Ok(Jacobian {
        f,
        signature,
        policy: BranchPolicy::default(),
    })
}

impl<F> Jacobian<F>
where
    F: Fn(&mut Tape, &mut Frame) -> Result<()>,
{
    pub fn with_policy(mut self, policy: BranchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn policy(&self) -> BranchPolicy {
        self.policy
    }

    /// `(rows, cols)` a sink must have for a call with `args`.
    pub fn required_shape(&self, args: &[Arg<'_>]) -> Result<(usize, usize)> {
        self.signature.check_args(args)?;
        let rows: usize = args
            .iter()
            .map(|arg| match arg {
                Arg::Output(buffer) => buffer.len(),
                Arg::Scalar(_) => 0,
            })
            .sum();
        Ok((rows, self.signature.num_active() + rows))
    }

    /// Records one forward pass without sweeping it or touching the buffers.
    pub fn record(&self, args: &[Arg<'_>]) -> Result<Recording> {
        self.signature.check_args(args)?;
        forward::record_vector(&self.signature, self.policy, args, &self.f)
    }

    /// Runs the function and writes its results into the output buffers,
    /// without differentiating.
    pub fn evaluate(&self, args: &mut [Arg<'_>]) -> Result<()> {
        let recording = self.record(args)?;
        write_outputs(&recording, args);
        Ok(())
    }

    /// Fills the output buffers with the primal results and `sink` with the
    /// jacobian. A sink smaller than [`required_shape`](Self::required_shape)
    /// is rejected before anything runs; on any error neither the buffers nor
    /// the sink are modified.
    pub fn execute<S>(&self, args: &mut [Arg<'_>], sink: &mut S) -> Result<()>
    where
        S: JacobianSink + ?Sized,
    {
        let (rows, cols) = self.required_shape(args)?;
        if sink.rows() < rows || sink.cols() < cols {
            return Err(GradError::MatrixTooSmall {
                rows,
                cols,
                actual_rows: sink.rows(),
                actual_cols: sink.cols(),
            });
        }

        let mut recording = forward::record_vector(&self.signature, self.policy, args, &self.f)?;
        let staging = assemble::jacobian(&mut recording);

        write_outputs(&recording, args);
        assemble::write_into(&staging, sink);

        debug!(
            nodes = recording.tape.len(),
            rows,
            cols,
            "jacobian executed"
        );
        Ok(())
    }

    /// [`execute`](Self::execute) into a freshly allocated matrix of exactly
    /// the required shape.
    pub fn compute(&self, args: &mut [Arg<'_>]) -> Result<DerivativeMatrix> {
        let (rows, cols) = self.required_shape(args)?;
        let mut matrix = DerivativeMatrix::new(rows, cols);
        self.execute(args, &mut matrix)?;
        Ok(matrix)
    }
}

fn write_outputs(recording: &Recording, args: &mut [Arg<'_>]) {
    for output in &recording.outputs {
        if let Some(Arg::Output(buffer)) = args.get_mut(output.position) {
            buffer[output.index] = output.value;
        }
    }
}
