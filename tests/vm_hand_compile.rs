use loxvm::{
  chunk::{Chunk, OpCode},
  debug::Debug,
  utils::Init,
  vm::VM,
};

/// Hand-assemble `-((1.2 + 2.3) / 5.6)` directly as bytecode, bypassing the
/// compiler entirely, the same way the upstream VM's own first test did
/// before the parser existed.
#[test]
fn hand_compiled_arithmetic() {
  let mut vm = VM::init();
  let mut chunk = Chunk::init();

  let constant = chunk.add_constant(1.2.into());
  chunk.write(OpCode::Constant as u8, 123);
  chunk.write(constant as u8, 123);

  let constant = chunk.add_constant(2.3.into());
  chunk.write(OpCode::Constant as u8, 123);
  chunk.write(constant as u8, 123);

  chunk.write(OpCode::Add as u8, 123);

  let constant = chunk.add_constant(5.6.into());
  chunk.write(OpCode::Constant as u8, 123);
  chunk.write(constant as u8, 123);

  chunk.write(OpCode::Divide as u8, 123);
  chunk.write(OpCode::Negate as u8, 123);
  chunk.write(OpCode::Return as u8, 123);

  chunk.disassemble("hand_compiled_arithmetic", vm.heap());
  vm.interpret_chunk(chunk).unwrap();
  vm.free();
}
