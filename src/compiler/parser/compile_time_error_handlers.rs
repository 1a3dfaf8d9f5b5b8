use super::*;

impl<'src, 'h> Parser<'src, 'h> {
  /// Report error at current token.
  pub(crate) fn error_at_current(&mut self, message: String) -> Result<(), InterpretError> {
    self.error_at(true, message)
  }

  /// Report error at previous token.
  pub(crate) fn error(&mut self, message: String) -> Result<(), InterpretError> {
    self.error_at(false, message)
  }

  /// Report error at the selected token. The first error reported for a
  /// given `compile()` call wins: subsequent calls while `panic_mode` is
  /// still set are suppressed, though in practice this grammar has no
  /// synchronization point to resume parsing at, so the first error always
  /// propagates straight out of `compile()`.
  pub(crate) fn error_at(&mut self, if_current: bool, message: String) -> Result<(), InterpretError> {
    if self.panic_mode {
      return Ok(());
    }
    self.panic_mode = true;
    self.had_error = true;

    let token = if if_current { &self.current } else { &self.previous };
    let mut error_str = format!("[line {}] error", token.line);
    match token.token_type {
      TokenType::Eof => error_str += " at eof",
      TokenType::Error => {}
      _ => error_str += &format!(" at '{}'", token.lexeme),
    }
    error_str += &format!(": {message}");

    Err(InterpretError::CompileError(error_str))
  }
}
