use loxvm::{chunk::OpCode, compiler, vm::VM};

/// `unary()` parses its operand by recursing into a full `expression()`
/// rather than `parse_precedence(Precedence::Unary)` — a quirk carried over
/// from the original compiler rather than fixed. The observable consequence:
/// `-1 + 2` binds as `-(1 + 2)`, not `(-1) + 2`, because the `-`'s operand
/// parse doesn't stop at `Unary` precedence and swallows the trailing `+ 2`.
/// This pins that emitted instruction order so the behavior doesn't drift
/// back to the "more obviously correct" precedence-bounded parse.
#[test]
fn unary_operand_swallows_trailing_binary_expression() {
  let mut vm = VM::init();
  let chunk = compiler::compile("-1 + 2", vm.interner()).unwrap();

  let code = chunk.code();
  let add_pos = code.iter().position(|&b| OpCode::from(b) == OpCode::Add);
  let negate_pos = code.iter().position(|&b| OpCode::from(b) == OpCode::Negate);

  let (add_pos, negate_pos) = (
    add_pos.expect("chunk should contain OP_ADD"),
    negate_pos.expect("chunk should contain OP_NEGATE"),
  );

  // OP_NEGATE emitted after OP_ADD means the negation applies to the whole
  // `1 + 2`, not just the `1` — i.e. `-1 + 2` compiles as `-(1 + 2)`.
  assert!(
    negate_pos > add_pos,
    "expected OP_NEGATE after OP_ADD (operand swallowed the trailing `+ 2`), got negate@{negate_pos} add@{add_pos}"
  );

  vm.free();
}
