use loxvm::{utils::Init, vm::{InterpretError, VM}};

/// Runs `src` against a fresh `VM` and expects it to succeed; value output
/// goes to stdout (there's no in-process hook to capture it), so this only
/// pins the success/failure outcome, same as the teacher's own hand-compiled
/// and fixture-loading tests.
fn run_ok(src: &str) {
  let mut vm = VM::init();
  let result = vm.interpret(src);
  vm.free();
  assert!(result.is_ok(), "expected {src:?} to succeed, got {result:?}");
}

#[test]
fn precedence_multiply_before_add() {
  run_ok("1 + 2 * 3");
}

#[test]
fn grouping_overrides_precedence() {
  run_ok("(1 + 2) * 3");
}

#[test]
fn boolean_and_comparison_chain() {
  run_ok("!(5 - 4 > 3 * 2 == !nil)");
}

#[test]
fn string_concatenation_chain() {
  run_ok("\"st\" + \"ri\" + \"ng\"");
}

#[test]
fn interned_strings_compare_equal() {
  run_ok("\"a\" == \"a\"");
}

#[test]
fn negating_a_non_number_is_a_runtime_error() {
  let mut vm = VM::init();
  let result = vm.interpret("-true");
  vm.free();
  match result {
    Err(InterpretError::RuntimeError(message)) => {
      assert!(message.starts_with("Operand must be a number"));
    }
    other => panic!("expected a runtime error, got {other:?}"),
  }
}

#[test]
fn unclosed_paren_is_a_compile_error() {
  let mut vm = VM::init();
  let result = vm.interpret("(1 + 2");
  vm.free();
  match result {
    Err(InterpretError::CompileError(message)) => {
      assert!(message.contains("Expect ')' after expression"));
    }
    other => panic!("expected a compile error, got {other:?}"),
  }
}

#[test]
fn bare_operator_is_a_compile_error() {
  let mut vm = VM::init();
  let result = vm.interpret("+");
  vm.free();
  match result {
    Err(InterpretError::CompileError(message)) => {
      assert!(message.contains("Expected expression"));
    }
    other => panic!("expected a compile error, got {other:?}"),
  }
}
