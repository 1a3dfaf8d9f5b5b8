use loxvm::{utils::Init, vm::VM};

/// Exercises `project-root`-relative fixture loading (useful once
/// file-driven test cases grow past a handful of inline strings) and
/// confirms a fixture file actually interprets successfully end to end.
#[test]
fn load_and_run_demo_fixture() {
  use project_root::get_project_root;
  use std::fs::read_to_string;

  let project_root = get_project_root().expect("there is no project root");
  let demo_path = project_root.join("demos").join("meaningless.lox");
  let source = read_to_string(demo_path).unwrap();

  let mut vm = VM::init();
  vm.interpret(&source).unwrap();
  vm.free();
}
