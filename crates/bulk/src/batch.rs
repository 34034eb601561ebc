//! Batch buffer - serialized instructions not yet sent.

use crate::domain::instruction::{Instruction, RenderError};

/// Append-only accumulator owned by the batch owner loop.
///
/// Appends are all-or-nothing: an instruction that fails to render leaves the
/// buffer exactly as it was.
#[derive(Debug, Default)]
pub struct BatchBuffer {
  bytes: Vec<u8>,
  ops: usize,
}

impl BatchBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Render `instruction` onto the end of the buffer
  pub fn append(&mut self, instruction: &dyn Instruction) -> Result<(), RenderError> {
    let mark = self.bytes.len();
    match instruction.write_to(&mut self.bytes) {
      Ok(()) => {
        self.ops += 1;
        Ok(())
      }
      Err(e) => {
        self.bytes.truncate(mark);
        Err(e)
      }
    }
  }

  /// Hand off everything accumulated so far, leaving a fresh empty buffer
  pub fn take(&mut self) -> Batch {
    Batch {
      bytes: std::mem::take(&mut self.bytes),
      ops: std::mem::take(&mut self.ops),
    }
  }

  /// Number of instructions in the buffer
  pub fn ops(&self) -> usize {
    self.ops
  }

  /// Number of bytes in the buffer
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ops == 0
  }
}

/// A filled batch, frozen at the moment of the flush.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Batch {
  bytes: Vec<u8>,
  ops: usize,
}

impl Batch {
  pub fn ops(&self) -> usize {
    self.ops
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ops == 0
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.bytes
  }
}
