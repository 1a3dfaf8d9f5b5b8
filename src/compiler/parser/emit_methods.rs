use super::*;
use crate::chunk::OpCode;

impl<'src, 'h> Parser<'src, 'h> {
  /// Appending a sequence of bytes to the chunk (in order).
  pub(crate) fn emit_bytes(&mut self, bytes: &[u8]) -> Result<(), InterpretError> {
    for &byte in bytes {
      self.emit_byte(byte)?;
    }
    Ok(())
  }

  /// Appending a single byte to the chunk, tagged with the line of the
  /// token that was just consumed.
  pub(crate) fn emit_byte(&mut self, byte: u8) -> Result<(), InterpretError> {
    self.chunk.write(byte, self.previous.line);
    Ok(())
  }

  /// Specifically appending the return instruction to the chunk.
  pub(crate) fn emit_return(&mut self) -> Result<(), InterpretError> {
    self.emit_byte(OpCode::Return as u8)
  }

  /// Wrapper for appending a `OP_CONSTANT` instruction and its operand to
  /// the chunk.
  pub(crate) fn emit_constant(&mut self, value: Value) -> Result<(), InterpretError> {
    let constant_index = self.make_constant(value)?;
    self.emit_bytes(&[OpCode::Constant as u8, constant_index])
  }

  /// Operations after the end of compilation: this grammar has no function
  /// bodies to close over, so all that's left is a trailing return.
  pub(crate) fn end_compiler(&mut self) -> Result<(), InterpretError> {
    self.emit_return()
  }
}
