//! # Parser
//!
//! Submodule of `compiler`, the single-pass Pratt parser that turns a token
//! stream into bytecode.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::{
  chunk::Chunk,
  compiler::Precedence,
  scanner::{Scanner, Token, TokenType},
  utils::Init,
  value::Value,
  vm::{InterpretError, StringInterner},
};

use super::*;

type ParseFn = fn(&mut Parser<'_, '_>, bool) -> Result<(), InterpretError>;

pub mod compile_time_error_handlers;
pub mod emit_methods;
pub mod ops_after_get_parse_rule;

/// ## ParseRule
///
/// A struct which represents the parse rule, with:
///
/// - prefix: the prefix parse function
/// - infix: the infix parse function
/// - precedence: the precedence of the operator
#[derive(Default, Clone, Copy)]
pub struct ParseRule {
  pub prefix: Option<ParseFn>,
  pub infix: Option<ParseFn>,
  pub precedence: Precedence,
}

impl ParseRule {
  pub fn new(prefix: Option<ParseFn>, infix: Option<ParseFn>, precedence: Precedence) -> Self {
    Self {
      prefix,
      infix,
      precedence,
    }
  }
}

/// ## RULES_VEC
///
/// A vec which contains the rules for the different tokens.
static RULES_VEC: Lazy<Vec<(TokenType, ParseRule)>> = Lazy::new(|| {
  vec![
    (
      TokenType::LeftParen,
      ParseRule::new(Some(Parser::grouping), None, Precedence::None),
    ),
    (TokenType::RightParen, ParseRule::new(None, None, Precedence::None)),
    (TokenType::LeftBrace, ParseRule::new(None, None, Precedence::None)),
    (TokenType::RightBrace, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Comma, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Dot, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::Minus,
      ParseRule::new(Some(Parser::unary), Some(Parser::binary), Precedence::Term),
    ),
    (
      TokenType::Plus,
      ParseRule::new(None, Some(Parser::binary), Precedence::Term),
    ),
    (TokenType::Semicolon, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::Slash,
      ParseRule::new(None, Some(Parser::binary), Precedence::Factor),
    ),
    (
      TokenType::Star,
      ParseRule::new(None, Some(Parser::binary), Precedence::Factor),
    ),
    (
      TokenType::Bang,
      ParseRule::new(Some(Parser::unary), None, Precedence::None),
    ),
    (
      TokenType::BangEqual,
      ParseRule::new(None, Some(Parser::binary), Precedence::Equality),
    ),
    (TokenType::Equal, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::EqualEqual,
      ParseRule::new(None, Some(Parser::binary), Precedence::Equality),
    ),
    (
      TokenType::Greater,
      ParseRule::new(None, Some(Parser::binary), Precedence::Comparison),
    ),
    (
      TokenType::GreaterEqual,
      ParseRule::new(None, Some(Parser::binary), Precedence::Comparison),
    ),
    (
      TokenType::Less,
      ParseRule::new(None, Some(Parser::binary), Precedence::Comparison),
    ),
    (
      TokenType::LessEqual,
      ParseRule::new(None, Some(Parser::binary), Precedence::Comparison),
    ),
    // `Identifier` deliberately has no prefix rule: variables are out of
    // scope for this grammar, so a bare identifier is a syntax error, same
    // as any other token with no prefix parser.
    (TokenType::Identifier, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::String,
      ParseRule::new(Some(Parser::string), None, Precedence::None),
    ),
    (
      TokenType::Number,
      ParseRule::new(Some(Parser::number), None, Precedence::None),
    ),
    (TokenType::And, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Class, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Else, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::False,
      ParseRule::new(Some(Parser::literal), None, Precedence::None),
    ),
    (TokenType::For, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Fun, ParseRule::new(None, None, Precedence::None)),
    (TokenType::If, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::Nil,
      ParseRule::new(Some(Parser::literal), None, Precedence::None),
    ),
    (TokenType::Or, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Print, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Return, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Super, ParseRule::new(None, None, Precedence::None)),
    (TokenType::This, ParseRule::new(None, None, Precedence::None)),
    (
      TokenType::True,
      ParseRule::new(Some(Parser::literal), None, Precedence::None),
    ),
    (TokenType::Var, ParseRule::new(None, None, Precedence::None)),
    (TokenType::While, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Error, ParseRule::new(None, None, Precedence::None)),
    (TokenType::Eof, ParseRule::new(None, None, Precedence::None)),
  ]
});

/// ## RULES
///
/// `HashMap` form of `RULES_VEC`, for O(1) lookup by `get_rule`.
static RULES: Lazy<HashMap<TokenType, ParseRule>> = Lazy::new(|| {
  let mut map = HashMap::new();
  for (token_type, rule) in RULES_VEC.iter() {
    map.insert(*token_type, *rule);
  }
  map
});

/// ## Parser
///
/// One per `compile()` call. `'src` is the lifetime of the source text
/// (tokens borrow their lexemes straight out of it); `'h` is the lifetime of
/// the borrow into the VM's heap and intern table, needed to allocate string
/// literal constants as they're parsed.
pub struct Parser<'src, 'h> {
  pub(crate) chunk: Chunk,
  pub(crate) scanner: Scanner<'src>,
  pub(crate) current: Token<'src>,
  pub(crate) previous: Token<'src>,
  pub(crate) had_error: bool,
  pub(crate) panic_mode: bool,
  pub(crate) interner: StringInterner<'h>,
}

impl<'src, 'h> Parser<'src, 'h> {
  fn new(source: &'src str, interner: StringInterner<'h>) -> Self {
    Self {
      chunk: Chunk::init(),
      scanner: Scanner::init(source),
      current: Token::init(),
      previous: Token::init(),
      had_error: false,
      panic_mode: false,
      interner,
    }
  }
}

impl<'src, 'h> Parser<'src, 'h> {
  /// This function starts at the current token, then parses any expression
  /// at the given precedence level or higher.
  fn parse_precedence(&mut self, precedence: Precedence) -> Result<(), InterpretError> {
    self.advance_token()?;
    let prefix_rule = self.get_rule(self.previous.token_type).prefix;
    let prefix_rule = match prefix_rule {
      Some(rule) => rule,
      None => return Err(self.error("Expected expression".to_owned()).unwrap_err()),
    };
    prefix_rule(self, precedence <= Precedence::Assignment)?;

    // Look for an `infix` parser for the next token, as long as it binds at
    // least as tightly as `precedence`.
    while precedence <= self.get_rule(self.current.token_type).precedence {
      self.advance_token()?;
      let infix_rule = self.get_rule(self.previous.token_type).infix;
      match infix_rule {
        Some(infix_rule) => infix_rule(self, false)?,
        None => break,
      }
    }

    Ok(())
  }

  fn get_rule(&self, token_type: TokenType) -> ParseRule {
    *RULES.get(&token_type).unwrap()
  }

  /// Parse a full expression: `parse_precedence(Assignment)`.
  pub(crate) fn expression(&mut self) -> Result<(), InterpretError> {
    self.parse_precedence(Precedence::Assignment)
  }
}

impl<'src, 'h> Parser<'src, 'h> {
  /// Ask the scanner for the next token and stash the old current token in
  /// `previous`. Scanner error tokens are reported and skipped in a loop, so
  /// `current` always ends up holding a non-error token.
  pub(crate) fn advance_token(&mut self) -> Result<(), InterpretError> {
    self.previous = self.current;
    loop {
      self.current = self.scanner.scan_token();
      if self.current.token_type != TokenType::Error {
        break;
      }
      self.error_at_current(self.current.lexeme.to_owned())?;
    }
    Ok(())
  }

  /// Consume the current token if it matches `token_type`, else error.
  pub(crate) fn consume_token(
    &mut self,
    token_type: TokenType,
    message: String,
  ) -> Result<(), InterpretError> {
    if self.current.token_type == token_type {
      self.advance_token()
    } else {
      self.error_at_current(message)
    }
  }

  fn check_token(&self, expected_type: TokenType) -> bool {
    self.current.token_type == expected_type
  }

  #[allow(dead_code)]
  pub(crate) fn match_token(&mut self, expected_type: TokenType) -> Result<bool, InterpretError> {
    if !self.check_token(expected_type) {
      Ok(false)
    } else {
      self.advance_token()?;
      Ok(true)
    }
  }
}

impl<'src, 'h> Parser<'src, 'h> {
  /// Append a constant to the chunk's pool, returning its index — or a
  /// compile error if the pool is already full (the one-byte `OP_CONSTANT`
  /// operand can address at most 256 entries).
  fn make_constant(&mut self, value: Value) -> Result<u8, InterpretError> {
    let index = self.chunk.add_constant(value);
    if index > u8::MAX as usize {
      self.error("Too many constants in one chunk.".to_owned())?;
      Ok(0)
    } else {
      Ok(index as u8)
    }
  }
}

/// Top-level entry point: compile `source` into a fresh [`Chunk`], using
/// `interner` to intern any string literals along the way. Returns `Err` on
/// the first compile error encountered (scanner or parser); the caller
/// (`VM::interpret`) is left holding no chunk to run in that case.
pub fn compile(source: &str, interner: StringInterner<'_>) -> Result<Chunk, InterpretError> {
  let mut parser = Parser::new(source, interner);
  parser.advance_token()?;
  parser.expression()?;
  parser.consume_token(TokenType::Eof, "Expected end of expression".to_owned())?;
  parser.end_compiler()?;

  if parser.had_error {
    Err(InterpretError::CompileError(
      "compilation failed with one or more errors".to_owned(),
    ))
  } else {
    #[cfg(feature = "debug_print_code")]
    {
      use crate::debug::Debug;
      parser.chunk.disassemble("code", parser.interner.heap);
    }
    Ok(parser.chunk)
  }
}
