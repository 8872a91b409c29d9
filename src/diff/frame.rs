use crate::error::{GradError, Result};
use crate::graph::{TrackedArray, Var};

use super::signature::ParamKind;

/// What a parameter position is bound to during one recording.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    Scalar(Var),
    Output(TrackedArray),
}

impl Binding {
    fn kind(&self) -> ParamKind {
        match self {
            Binding::Scalar(_) => ParamKind::Scalar,
            Binding::Output(_) => ParamKind::Output,
        }
    }
}

/// The arguments of one call of a target function, as tape handles.
///
/// Parameters are addressed by their declaration position in the signature.
/// Active scalars are differentiable leaves, fixed scalars are constants and
/// output parameters are [`TrackedArray`]s pre-filled with the caller's
/// buffer contents.
#[derive(Debug, Clone)]
pub struct Frame {
    bindings: Vec<Binding>,
}

impl Frame {
    pub(crate) fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn binding(&self, position: usize) -> Result<&Binding> {
        self.bindings.get(position).ok_or(GradError::ArityMismatch {
            expected: position + 1,
            actual: self.bindings.len(),
        })
    }

    /// Handle of the scalar parameter at `position`.
    pub fn scalar(&self, position: usize) -> Result<Var> {
        match self.binding(position)? {
            Binding::Scalar(var) => Ok(*var),
            other => Err(GradError::RoleMismatch {
                position,
                expected: ParamKind::Scalar,
                actual: other.kind(),
            }),
        }
    }

    /// All scalar parameters in declaration order, skipping outputs.
    pub fn scalars(&self) -> Vec<Var> {
        self.bindings
            .iter()
            .filter_map(|binding| match binding {
                Binding::Scalar(var) => Some(*var),
                Binding::Output(_) => None,
            })
            .collect()
    }

    /// Tracked array bound to the output parameter at `position`.
    pub fn output(&mut self, position: usize) -> Result<&mut TrackedArray> {
        let len = self.bindings.len();
        match self.bindings.get_mut(position) {
            Some(Binding::Output(array)) => Ok(array),
            Some(Binding::Scalar(_)) => Err(GradError::RoleMismatch {
                position,
                expected: ParamKind::Output,
                actual: ParamKind::Scalar,
            }),
            None => Err(GradError::ArityMismatch {
                expected: position + 1,
                actual: len,
            }),
        }
    }

    pub(crate) fn into_outputs(self) -> impl Iterator<Item = (usize, TrackedArray)> {
        self.bindings
            .into_iter()
            .enumerate()
            .filter_map(|(position, binding)| match binding {
                Binding::Output(array) => Some((position, array)),
                Binding::Scalar(_) => None,
            })
    }
}
