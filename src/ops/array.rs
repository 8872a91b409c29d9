/// Reads and writes of tracked arrays. Both copy their single operand, so the
/// adjoint passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayOp {
    /// `array[slot]` read back into an expression.
    Read { slot: usize },
    /// `array[slot] = value`.
    Write { slot: usize },
}

impl ArrayOp {
    pub fn name(&self) -> &'static str {
        match self {
            ArrayOp::Read { .. } => "ArrayRead",
            ArrayOp::Write { .. } => "ArrayWrite",
        }
    }

    pub fn slot(&self) -> usize {
        match self {
            ArrayOp::Read { slot } | ArrayOp::Write { slot } => *slot,
        }
    }
}
