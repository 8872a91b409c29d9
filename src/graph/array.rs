use super::node::{TapeId, Var};
use super::tape::Tape;
use crate::error::{GradError, Result};
use crate::ops::{ArrayOp, OpKind};

/// Fixed-length array whose reads and writes are recorded on a tape.
///
/// Each slot holds the handle of the node that was last stored in it. Writes
/// record an array-write node so every stored value gets its own node, which
/// is what output bindings point at; reads record an array-read node that
/// refers to the slot's current value.
#[derive(Debug, Clone)]
pub struct TrackedArray {
    tape: TapeId,
    slots: Vec<Var>,
}

impl TrackedArray {
    /// Array of `len` constant zeros.
    pub fn zeros(tape: &mut Tape, len: usize) -> Self {
        let slots = (0..len).map(|_| tape.constant(0.0)).collect();
        Self {
            tape: tape.id(),
            slots,
        }
    }

    /// Array initialised with constant leaves holding `values`. Slots that are
    /// never written keep these values and carry no derivative.
    pub fn from_values(tape: &mut Tape, values: &[f64]) -> Self {
        let slots = values.iter().map(|&v| tape.constant(v)).collect();
        Self {
            tape: tape.id(),
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check(&self, tape: &Tape, index: usize) -> Result<()> {
        if self.tape != tape.id() {
            return Err(GradError::ForeignTape {
                expected: tape.id(),
                actual: self.tape,
            });
        }
        if index >= self.slots.len() {
            return Err(GradError::IndexOutOfBounds {
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    /// `array[index]` inside an expression.
    pub fn read(&self, tape: &mut Tape, index: usize) -> Result<Var> {
        self.check(tape, index)?;
        let current = self.slots[index];
        Ok(tape.record(OpKind::Array(ArrayOp::Read { slot: index }), &[current]))
    }

    /// `array[index] = value`. Returns the handle of the stored node.
    pub fn write(&mut self, tape: &mut Tape, index: usize, value: Var) -> Result<Var> {
        self.check(tape, index)?;
        if value.tape != tape.id() {
            return Err(GradError::ForeignTape {
                expected: tape.id(),
                actual: value.tape,
            });
        }
        let stored = tape.record(OpKind::Array(ArrayOp::Write { slot: index }), &[value]);
        self.slots[index] = stored;
        Ok(stored)
    }

    /// Node currently stored in `index`, without recording anything.
    pub fn slot(&self, index: usize) -> Option<Var> {
        self.slots.get(index).copied()
    }

    pub fn slots(&self) -> &[Var] {
        &self.slots
    }

    /// Primal values of all slots.
    pub fn values(&self) -> Vec<f64> {
        self.slots.iter().map(|slot| slot.value).collect()
    }
}
