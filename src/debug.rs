//! # Debug
//!
//! Disassembly/debug-dump utilities for the virtual machine. These are only
//! ever invoked behind the `debug_print_code`/`debug_trace_execution`
//! Cargo features (see `vm.rs`) — a normal build never calls into this
//! module.

use crate::{
  chunk::{Chunk, OpCode},
  object::Heap,
};

pub trait Debug {
  /// Disassemble every instruction in the chunk.
  fn disassemble(&self, name: &str, heap: &Heap);

  /// Disassemble a single instruction at `offset`, returning the offset of
  /// the next one.
  fn disassemble_instruction(&self, offset: usize, heap: &Heap) -> usize;
}

impl Debug for Chunk {
  fn disassemble(&self, name: &str, heap: &Heap) {
    println!("== {name} ==");
    let mut offset = 0;
    while offset < self.len() {
      offset = self.disassemble_instruction(offset, heap);
    }
  }

  fn disassemble_instruction(&self, offset: usize, heap: &Heap) -> usize {
    print!("{offset:04} ");

    if offset > 0 && self.line(offset) == self.line(offset - 1) {
      print!("   | ");
    } else {
      print!("{:4} ", self.line(offset));
    }

    let instruction = self.code()[offset];
    match OpCode::from(instruction) {
      OpCode::Constant => self.constant_instruction("OP_CONSTANT", offset, heap),
      OpCode::Nil => simple_instruction("OP_NIL", offset),
      OpCode::True => simple_instruction("OP_TRUE", offset),
      OpCode::False => simple_instruction("OP_FALSE", offset),
      OpCode::Equal => simple_instruction("OP_EQUAL", offset),
      OpCode::Greater => simple_instruction("OP_GREATER", offset),
      OpCode::Less => simple_instruction("OP_LESS", offset),
      OpCode::Not => simple_instruction("OP_NOT", offset),
      OpCode::Negate => simple_instruction("OP_NEGATE", offset),
      OpCode::Add => simple_instruction("OP_ADD", offset),
      OpCode::Subtract => simple_instruction("OP_SUBTRACT", offset),
      OpCode::Multiply => simple_instruction("OP_MULTIPLY", offset),
      OpCode::Divide => simple_instruction("OP_DIVIDE", offset),
      OpCode::Return => simple_instruction("OP_RETURN", offset),
    }
  }
}

impl Chunk {
  fn constant_instruction(&self, name: &str, offset: usize, heap: &Heap) -> usize {
    let constant_index = self.code()[offset + 1];
    let value = self.constant(constant_index);
    println!("{name:-16} {constant_index:4} '{}'", value.format(heap));
    offset + 2
  }
}

/// Print a single-byte (no-operand) instruction and return the next offset.
fn simple_instruction(name: &str, offset: usize) -> usize {
  println!("{name}");
  offset + 1
}
