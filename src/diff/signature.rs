//! Parameter-role descriptors.
//!
//! A [`Signature`] lists the parameters of a target function in declaration
//! order together with their role. It is built once, validated when a driver
//! object is constructed, and then checked against the actual arguments of
//! every `execute` call.

use std::collections::HashSet;
use std::fmt;

use crate::error::{GradError, Result};

/// What the driver does with a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    /// Scalar input with its own derivative column.
    Active,
    /// Scalar input passed through without being differentiated.
    Fixed,
    /// Output buffer receiving primal values (pass-through).
    Output,
}

impl ParamRole {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamRole::Active | ParamRole::Fixed => ParamKind::Scalar,
            ParamRole::Output => ParamKind::Output,
        }
    }
}

/// Shape of an argument at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    Output,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Scalar => f.write_str("a scalar"),
            ParamKind::Output => f.write_str("an output buffer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub role: ParamRole,
}

/// Actual argument of a jacobian call.
#[derive(Debug)]
pub enum Arg<'a> {
    Scalar(f64),
    Output(&'a mut [f64]),
}

impl Arg<'_> {
    pub fn kind(&self) -> ParamKind {
        match self {
            Arg::Scalar(_) => ParamKind::Scalar,
            Arg::Output(_) => ParamKind::Output,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: impl Into<String>, role: ParamRole) -> Self {
        self.params.push(Param {
            name: name.into(),
            role,
        });
        self
    }

    /// Differentiable scalar parameter.
    pub fn scalar(self, name: impl Into<String>) -> Self {
        self.push(name, ParamRole::Active)
    }

    /// Scalar parameter that is not differentiated.
    pub fn fixed(self, name: impl Into<String>) -> Self {
        self.push(name, ParamRole::Fixed)
    }

    /// Output buffer parameter.
    pub fn output(self, name: impl Into<String>) -> Self {
        self.push(name, ParamRole::Output)
    }

    /// Keeps only the named scalars differentiable; every other scalar becomes
    /// [`ParamRole::Fixed`]. Names must exist and must not be outputs.
    pub fn wrt<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested = HashSet::new();
        for name in names {
            let name = name.as_ref();
            let position = self.position(name).ok_or_else(|| GradError::UnknownParameter {
                name: name.to_string(),
                declared: self.names(),
            })?;
            if self.params[position].role == ParamRole::Output {
                return Err(GradError::NotDifferentiable {
                    name: name.to_string(),
                });
            }
            requested.insert(position);
        }

        for (position, param) in self.params.iter_mut().enumerate() {
            if param.role != ParamRole::Output {
                param.role = if requested.contains(&position) {
                    ParamRole::Active
                } else {
                    ParamRole::Fixed
                };
            }
        }
        Ok(self)
    }

    /// [`Signature::wrt`] with a comma separated list, e.g. `"x, w"`.
    pub fn wrt_list(self, list: &str) -> Result<Self> {
        let names: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        self.wrt(names)
    }

    /// Rejects duplicate names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(GradError::DuplicateParameter {
                    name: param.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn role(&self, position: usize) -> Option<ParamRole> {
        self.params.get(position).map(|p| p.role)
    }

    /// Positions of the differentiable scalars, in declaration order. This is
    /// the column order of gradients and jacobians.
    pub fn active_positions(&self) -> Vec<usize> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.role == ParamRole::Active)
            .map(|(position, _)| position)
            .collect()
    }

    pub fn num_active(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.role == ParamRole::Active)
            .count()
    }

    pub fn num_scalars(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.role.kind() == ParamKind::Scalar)
            .count()
    }

    pub fn first_output(&self) -> Option<&Param> {
        self.params.iter().find(|p| p.role == ParamRole::Output)
    }

    /// Checks arity and the role of every argument against the declaration.
    pub fn check_args(&self, args: &[Arg<'_>]) -> Result<()> {
        if args.len() != self.params.len() {
            return Err(GradError::ArityMismatch {
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (position, (param, arg)) in self.params.iter().zip(args).enumerate() {
            let expected = param.role.kind();
            if arg.kind() != expected {
                return Err(GradError::RoleMismatch {
                    position,
                    expected,
                    actual: arg.kind(),
                });
            }
        }
        Ok(())
    }
}
