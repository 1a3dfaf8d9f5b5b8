//! # Scanner
//!
//! The scanner is responsible for:
//!
//! - reading the source code
//! - producing a stream of tokens.

use crate::utils::Init;

/// ## TokenType
///
/// An enum which represents the different types of tokens.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenType {
  // Single-character tokens.
  LeftParen,
  RightParen,
  LeftBrace,
  RightBrace,
  Comma,
  Dot,
  Minus,
  Plus,
  Semicolon,
  Slash,
  Star,
  // One or two character tokens.
  Bang,
  BangEqual,
  Equal,
  EqualEqual,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,
  // Literals.
  Identifier,
  String,
  Number,
  // Keywords.
  And,
  Class,
  Else,
  False,
  For,
  Fun,
  If,
  Nil,
  Or,
  Print,
  Return,
  Super,
  This,
  True,
  Var,
  While,
  // Error and EOF.
  Error,
  Eof,
}

/// ## Token
///
/// A struct which represents a token. `lexeme` borrows straight out of the
/// source buffer (zero-copy) for every kind except `Error`, whose `lexeme`
/// is instead the borrowed diagnostic message.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
  pub(crate) token_type: TokenType,
  pub(crate) line: usize,
  pub(crate) lexeme: &'a str,
}

impl<'a> Init for Token<'a> {}

impl<'a> Default for Token<'a> {
  fn default() -> Self {
    Self {
      token_type: TokenType::Eof,
      line: 1,
      lexeme: "",
    }
  }
}

/// ## Scanner
///
/// A struct which represents a scanner: a source buffer and three cursors
/// into it (`start` of the current lexeme, `current` read head, `line`).
#[derive(Debug)]
pub struct Scanner<'a> {
  pub(crate) source: &'a str,
  pub(crate) start: usize,
  pub(crate) current: usize,
  pub(crate) line: usize,
}

impl<'a> Scanner<'a> {
  /// Make a token, specifically from `string`.
  fn string(&mut self) -> Token<'a> {
    while self.peek() != b'"' && !self.is_at_end() {
      if self.peek() == b'\n' {
        self.line += 1;
      }
      self.advance();
    }

    if self.is_at_end() {
      return self.error_token("Unterminated string.");
    }

    // the closing quote
    self.advance();
    self.make_token(TokenType::String)
  }

  /// Make a token, specifically from `number`.
  fn number(&mut self) -> Token<'a> {
    while self.peek().is_ascii_digit() {
      self.advance();
    }

    // Seeking for a fractional part
    if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
      // Consume the "."
      self.advance();

      // Consume the fractional part
      while self.peek().is_ascii_digit() {
        self.advance();
      }
    }

    self.make_token(TokenType::Number)
  }

  /// Make a token, specifically from `identifier`/keyword.
  fn identifier(&mut self) -> Token<'a> {
    while is_alpha(self.peek()) || self.peek().is_ascii_digit() {
      self.advance();
    }
    self.make_token(self.identifier_type())
  }

  /// Classify the lexeme just consumed as a keyword, or fall back to a
  /// plain identifier. A hand-coded first-letter switch followed by a
  /// `rest`-of-lexeme comparison, mirroring the keyword trie in
  /// `scanner.c`'s `identifierType`/`checkKeyword`.
  fn identifier_type(&self) -> TokenType {
    let lexeme = &self.source.as_bytes()[self.start..self.current];
    match lexeme.first() {
      Some(b'a') => self.check_keyword(1, "nd", TokenType::And),
      Some(b'c') => self.check_keyword(1, "lass", TokenType::Class),
      Some(b'e') => self.check_keyword(1, "lse", TokenType::Else),
      Some(b'f') if lexeme.len() > 1 => match lexeme[1] {
        b'a' => self.check_keyword(2, "lse", TokenType::False),
        b'o' => self.check_keyword(2, "r", TokenType::For),
        b'u' => self.check_keyword(2, "n", TokenType::Fun),
        _ => TokenType::Identifier,
      },
      Some(b'i') => self.check_keyword(1, "f", TokenType::If),
      Some(b'n') => self.check_keyword(1, "il", TokenType::Nil),
      Some(b'o') => self.check_keyword(1, "r", TokenType::Or),
      Some(b'p') => self.check_keyword(1, "rint", TokenType::Print),
      Some(b'r') => self.check_keyword(1, "eturn", TokenType::Return),
      Some(b's') => self.check_keyword(1, "uper", TokenType::Super),
      Some(b't') if lexeme.len() > 1 => match lexeme[1] {
        b'h' => self.check_keyword(2, "is", TokenType::This),
        b'r' => self.check_keyword(2, "ue", TokenType::True),
        _ => TokenType::Identifier,
      },
      Some(b'v') => self.check_keyword(1, "ar", TokenType::Var),
      // NB: rest is "hile", not "while" — "while".len() == 5 can never
      // equal `lexeme.len() - start`, so the original C's length-4 check
      // against a 5-byte rest can never match. This is the fixed form; see
      // DESIGN.md Open Question 3.
      Some(b'w') => self.check_keyword(1, "hile", TokenType::While),
      // Every other first letter (and any first letter above whose inner
      // match falls through) is a plain identifier — the original's
      // `identifierType` is missing this trailing case on its `f`/`t`
      // branches; see DESIGN.md Open Question 4.
      _ => TokenType::Identifier,
    }
  }

  /// Compare the lexeme's tail (after the first `start` bytes already
  /// matched by the caller's first-letter dispatch) against `rest`.
  fn check_keyword(&self, start: usize, rest: &str, token_type: TokenType) -> TokenType {
    let lexeme = &self.source.as_bytes()[self.start..self.current];
    let tail = &lexeme[start.min(lexeme.len())..];
    if tail == rest.as_bytes() {
      token_type
    } else {
      TokenType::Identifier
    }
  }
}

impl<'a> Scanner<'a> {
  /// Make a token.
  fn make_token(&self, token_type: TokenType) -> Token<'a> {
    Token {
      token_type,
      line: self.line,
      lexeme: &self.source[self.start..self.current],
    }
  }

  /// Make an error token.
  fn error_token(&self, message: &'a str) -> Token<'a> {
    Token {
      token_type: TokenType::Error,
      line: self.line,
      lexeme: message,
    }
  }
}

impl<'a> Scanner<'a> {
  /// Scan the next token from the source.
  pub fn scan_token(&mut self) -> Token<'a> {
    self.skip_white_space();

    // reset start position
    self.start = self.current;

    if self.is_at_end() {
      return self.make_token(TokenType::Eof);
    }

    let c = self.advance();

    if is_alpha(c) {
      return self.identifier();
    }
    if c.is_ascii_digit() {
      return self.number();
    }

    match c {
      // mono-character tokens
      b'(' => self.make_token(TokenType::LeftParen),
      b')' => self.make_token(TokenType::RightParen),
      b'{' => self.make_token(TokenType::LeftBrace),
      b'}' => self.make_token(TokenType::RightBrace),
      b';' => self.make_token(TokenType::Semicolon),
      b',' => self.make_token(TokenType::Comma),
      b'.' => self.make_token(TokenType::Dot),
      b'-' => self.make_token(TokenType::Minus),
      b'+' => self.make_token(TokenType::Plus),
      b'/' => self.make_token(TokenType::Slash),
      b'*' => self.make_token(TokenType::Star),
      // possible two-character tokens
      b'!' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::BangEqual)
        } else {
          self.make_token(TokenType::Bang)
        }
      }
      b'=' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::EqualEqual)
        } else {
          self.make_token(TokenType::Equal)
        }
      }
      b'<' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::LessEqual)
        } else {
          // The original C source falls through to TOKEN_EQUAL here; fixed
          // per DESIGN.md Open Question 2.
          self.make_token(TokenType::Less)
        }
      }
      b'>' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::GreaterEqual)
        } else {
          self.make_token(TokenType::Greater)
        }
      }
      // string
      b'"' => self.string(),
      _ => self.error_token("Unexpected character."),
    }
  }
}

impl<'a> Scanner<'a> {
  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  /// Get current char, then advance the scanner (one step).
  fn advance(&mut self) -> u8 {
    self.current += 1;
    self.source.as_bytes()[self.current - 1]
  }

  /// Check if the next char matches the expected char.
  ///
  /// If it matches, advance the scanner (one step) immediately.
  fn match_next(&mut self, expected: u8) -> bool {
    if self.is_at_end() {
      return false;
    }
    if self.source.as_bytes()[self.current] != expected {
      return false;
    }
    self.current += 1;
    true
  }

  /// Get current char, without advancing the scanner.
  fn peek(&self) -> u8 {
    if self.is_at_end() {
      return b'\0';
    }
    self.source.as_bytes()[self.current]
  }

  /// Get the next char, without advancing the scanner.
  fn peek_next(&self) -> u8 {
    if self.current + 1 >= self.source.len() {
      return b'\0';
    }
    self.source.as_bytes()[self.current + 1]
  }

  fn skip_white_space(&mut self) {
    loop {
      let c = self.peek();
      match c {
        b' ' | b'\r' | b'\t' => {
          self.advance();
        }
        b'\n' => {
          self.line += 1;
          self.advance();
        }
        b'/' => {
          if self.peek_next() == b'/' {
            while self.peek() != b'\n' && !self.is_at_end() {
              self.advance();
            }
          } else {
            return;
          }
        }
        _ => return,
      }
    }
  }
}

fn is_alpha(c: u8) -> bool {
  c.is_ascii_alphabetic() || c == b'_'
}

impl<'a> Scanner<'a> {
  /// Bind a new scanner to the source code.
  #[inline]
  pub fn init(src: &'a str) -> Self {
    Self {
      source: src,
      start: 0,
      current: 0,
      line: 1,
    }
  }

  /// Bind a new scanner to the source code.
  #[inline]
  pub fn bind(src: &'a str) -> Self {
    Scanner::init(src)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenType> {
    let mut scanner = Scanner::init(src);
    let mut out = Vec::new();
    loop {
      let tok = scanner.scan_token();
      let done = tok.token_type == TokenType::Eof;
      out.push(tok.token_type);
      if done {
        break;
      }
    }
    out
  }

  #[test]
  fn keywords_are_recognized() {
    assert_eq!(
      kinds("and class else false for fun if nil or print return super this true var while"),
      vec![
        TokenType::And,
        TokenType::Class,
        TokenType::Else,
        TokenType::False,
        TokenType::For,
        TokenType::Fun,
        TokenType::If,
        TokenType::Nil,
        TokenType::Or,
        TokenType::Print,
        TokenType::Return,
        TokenType::Super,
        TokenType::This,
        TokenType::True,
        TokenType::Var,
        TokenType::While,
        TokenType::Eof,
      ]
    );
  }

  #[test]
  fn identifiers_that_share_a_keyword_prefix_are_not_keywords() {
    assert_eq!(kinds("andromeda"), vec![TokenType::Identifier, TokenType::Eof]);
    assert_eq!(kinds("forest"), vec![TokenType::Identifier, TokenType::Eof]);
    assert_eq!(kinds("thisness"), vec![TokenType::Identifier, TokenType::Eof]);
  }

  #[test]
  fn disambiguates_two_char_operators() {
    assert_eq!(
      kinds("!= == <= >= < >"),
      vec![
        TokenType::BangEqual,
        TokenType::EqualEqual,
        TokenType::LessEqual,
        TokenType::GreaterEqual,
        TokenType::Less,
        TokenType::Greater,
        TokenType::Eof,
      ]
    );
  }

  #[test]
  fn line_comments_are_skipped() {
    assert_eq!(
      kinds("1 // comment\n2"),
      vec![TokenType::Number, TokenType::Number, TokenType::Eof]
    );
  }

  #[test]
  fn unterminated_string_is_an_error_token() {
    let mut scanner = Scanner::init("\"abc");
    let tok = scanner.scan_token();
    assert_eq!(tok.token_type, TokenType::Error);
  }

  #[test]
  fn newlines_inside_strings_advance_the_line_counter() {
    let mut scanner = Scanner::init("\"a\nb\"");
    let tok = scanner.scan_token();
    assert_eq!(tok.token_type, TokenType::String);
    assert_eq!(scanner.line, 2);
  }
}
