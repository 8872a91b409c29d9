use tracing::debug;

use crate::error::{GradError, Result};
use crate::graph::{BranchPolicy, Tape, Var};

use super::assemble;
use super::forward::{self, Recording};
use super::frame::Frame;
use super::signature::Signature;

/// Gradient of a scalar-valued function.
///
/// Built by [`gradient`]. Every [`execute`](Gradient::execute) records a fresh
/// tape, so the object can be reused with different inputs and keeps no
/// derivative state between calls.
#[derive(Debug, Clone)]
pub struct Gradient<F> {
    f: F,
    signature: Signature,
    policy: BranchPolicy,
}

/// Builds the gradient of `f`, differentiating the `Active` scalars of
/// `signature`. Output buffers are not allowed: use a jacobian for those.
///
/// ```
/// use tapegrad::{Signature, gradient};
///
/// let df = gradient(Signature::new().scalar("x").scalar("y"), |tape, frame| {
///     let (x, y) = (frame.scalar(0)?, frame.scalar(1)?);
///     let xx = tape.mul(x, x);
///     let xy = tape.mul(x, y);
///     Ok(tape.add(xx, xy))
/// })?;
///
/// let mut grads = [0.0; 2];
/// let value = df.execute(&[2.0, 3.0], &mut grads)?;
/// assert_eq!(value, 10.0);
/// assert_eq!(grads, [7.0, 2.0]);
/// # Ok::<(), tapegrad::GradError>(())
/// ```
pub fn gradient<F>(signature: Signature, f: F) -> Result<Gradient<F>>
where
    F: Fn(&mut Tape, &mut Frame) -> Result<Var>,
{
    signature.validate()?;
    if let Some(output) = signature.first_output() {
        return Err(GradError::OutputInGradient {
            name: output.name.clone(),
        });
    }
    Ok(Gradient {
        f,
        signature,
        policy: BranchPolicy::default(),
    })
}

impl<F> Gradient<F>
where
    F: Fn(&mut Tape, &mut Frame) -> Result<Var>,
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

    /// Number of derivative slots `execute` writes.
    pub fn num_active(&self) -> usize {
        self.signature.num_active()
    }

    fn check_args(&self, args: &[f64]) -> Result<()> {
        if args.len() != self.signature.len() {
            return Err(GradError::ArityMismatch {
                expected: self.signature.len(),
                actual: args.len(),
            });
        }
        Ok(())
    }

    /// Records one forward pass without sweeping it.
    pub fn record(&self, args: &[f64]) -> Result<Recording> {
        self.check_args(args)?;
        let (recording, _) = forward::record_scalar(&self.signature, self.policy, args, &self.f)?;
        Ok(recording)
    }

    /// Primal value only.
    pub fn evaluate(&self, args: &[f64]) -> Result<f64> {
        self.check_args(args)?;
        let (_, output) = forward::record_scalar(&self.signature, self.policy, args, &self.f)?;
        Ok(output.value())
    }

    /// Evaluates the function at `args` and writes one partial derivative per
    /// active parameter, in declaration order, into the front of `grads`.
    /// Returns the primal value. Nothing is written on error.
    pub fn execute(&self, args: &[f64], grads: &mut [f64]) -> Result<f64> {
        self.check_args(args)?;
        let required = self.signature.num_active();
        if grads.len() < required {
            return Err(GradError::GradientBufferTooSmall {
                required,
                actual: grads.len(),
            });
        }

        let (mut recording, output) =
            forward::record_scalar(&self.signature, self.policy, args, &self.f)?;
        let partials = assemble::gradient(&mut recording);
        grads[..required].copy_from_slice(&partials);

        debug!(
            nodes = recording.tape.len(),
            active = required,
            value = output.value(),
            "gradient executed"
        );
        Ok(output.value())
    }
}
