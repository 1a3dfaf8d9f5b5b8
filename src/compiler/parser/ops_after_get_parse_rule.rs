use super::*;
use crate::chunk::OpCode;

impl<'src, 'h> Parser<'src, 'h> {
  pub(crate) fn number(&mut self, _can_assign: bool) -> Result<(), InterpretError> {
    match self.previous.lexeme.parse::<f64>() {
      Ok(value) => self.emit_constant(value.into()),
      Err(_) => Err(InterpretError::CompileError(
        "Failed to parse number literal.".to_owned(),
      )),
    }
  }

  /// `previous.lexeme` is the token's whole lexeme, quotes included — strip
  /// them before interning.
  pub(crate) fn string(&mut self, _can_assign: bool) -> Result<(), InterpretError> {
    let lexeme = self.previous.lexeme;
    let bytes = &lexeme.as_bytes()[1..lexeme.len() - 1];
    let handle = self.interner.copy_string(bytes);
    self.emit_constant(Value::obj_val(handle))
  }

  /// `!` and unary `-`. Grounded on `compiler.c`'s `unary`, which compiles
  /// its operand by recursing into `expression()` rather than
  /// `parsePrecedence(PREC_UNARY)` — that quirk is preserved here rather
  /// than fixed, per the open question this behavior resolves.
  pub(crate) fn unary(&mut self, _can_assign: bool) -> Result<(), InterpretError> {
    let operator_type = self.previous.token_type;

    self.expression()?;

    match operator_type {
      TokenType::Bang => self.emit_byte(OpCode::Not as u8),
      TokenType::Minus => self.emit_byte(OpCode::Negate as u8),
      _ => unreachable!("unary() only ever has a rule for Bang and Minus"),
    }
  }

  pub(crate) fn binary(&mut self, _can_assign: bool) -> Result<(), InterpretError> {
    let operator_type = self.previous.token_type;
    let rule = self.get_rule(operator_type);
    self.parse_precedence(rule.precedence.next())?;

    match operator_type {
      // `!=`/`<=`/`>=` have no dedicated opcode; compose them out of the
      // opcode for the opposite-sense comparison plus `OP_NOT`.
      TokenType::BangEqual => self.emit_bytes(&[OpCode::Equal as u8, OpCode::Not as u8]),
      TokenType::EqualEqual => self.emit_byte(OpCode::Equal as u8),
      TokenType::Greater => self.emit_byte(OpCode::Greater as u8),
      TokenType::GreaterEqual => self.emit_bytes(&[OpCode::Less as u8, OpCode::Not as u8]),
      TokenType::Less => self.emit_byte(OpCode::Less as u8),
      TokenType::LessEqual => self.emit_bytes(&[OpCode::Greater as u8, OpCode::Not as u8]),
      TokenType::Plus => self.emit_byte(OpCode::Add as u8),
      TokenType::Minus => self.emit_byte(OpCode::Subtract as u8),
      TokenType::Star => self.emit_byte(OpCode::Multiply as u8),
      TokenType::Slash => self.emit_byte(OpCode::Divide as u8),
      _ => unreachable!("binary() only ever has a rule for the above token types"),
    }
  }

  pub(crate) fn literal(&mut self, _can_assign: bool) -> Result<(), InterpretError> {
    match self.previous.token_type {
      TokenType::False => self.emit_byte(OpCode::False as u8),
      TokenType::Nil => self.emit_byte(OpCode::Nil as u8),
      TokenType::True => self.emit_byte(OpCode::True as u8),
      _ => unreachable!("literal() only ever has a rule for False, Nil and True"),
    }
  }

  pub(crate) fn grouping(&mut self, _can_assign: bool) -> Result<(), InterpretError> {
    self.expression()?;
    self.consume_token(TokenType::RightParen, "Expect ')' after expression".to_owned())
  }
}
