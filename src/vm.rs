//! # VM
//!
//! ## Based on Stack
//!
//! The VM (aka. Virtual Machine) is the core of the interpreter.
//!
//! It is responsible for:
//!
//! - executing the bytecode

#[cfg(feature = "debug_trace_execution")]
use crate::debug::Debug;
use crate::{
  chunk::{Chunk, OpCode},
  compiler,
  object::{fnv1a_hash, Heap, ObjHandle},
  table::InternTable,
  utils::Init,
  value::Value,
};

/// ## InterpretError
///
/// An enum which represents the different errors that can occur
/// during the interpretation.
#[derive(Debug, Clone)]
pub enum InterpretError {
  CompileError(String),
  RuntimeError(String),
}

/// Intern `bytes`, copying them into a fresh heap allocation on a miss.
/// Shared by [`VM::copy_string`] and [`StringInterner::copy_string`].
fn copy_string_into(heap: &mut Heap, strings: &mut InternTable, bytes: &[u8]) -> ObjHandle {
  let hash = fnv1a_hash(bytes);
  if let Some(handle) = strings.find_string(hash, bytes, heap) {
    return handle;
  }
  let (handle, hash) = heap.alloc_string(bytes.to_vec().into_boxed_slice());
  strings.insert(hash, heap.string(handle).as_bytes(), handle, heap);
  handle
}

/// Intern an already-owned buffer (e.g. the result of string
/// concatenation), skipping the copy `copy_string_into` would otherwise
/// need on the common "this content was already interned" path.
fn take_string_into(heap: &mut Heap, strings: &mut InternTable, bytes: Box<[u8]>) -> ObjHandle {
  let hash = fnv1a_hash(&bytes);
  if let Some(handle) = strings.find_string(hash, &bytes, heap) {
    return handle;
  }
  let (handle, hash) = heap.alloc_string(bytes);
  strings.insert(hash, heap.string(handle).as_bytes(), handle, heap);
  handle
}

/// ## StringInterner
///
/// A borrow of the VM's heap and intern table, bundled together so the
/// compiler can allocate string-literal constants without holding a
/// reference to the whole [`VM`]. `VM::interner` is the only constructor.
pub struct StringInterner<'a> {
  pub(crate) heap: &'a mut Heap,
  pub(crate) strings: &'a mut InternTable,
}

impl<'a> StringInterner<'a> {
  pub fn copy_string(&mut self, bytes: &[u8]) -> ObjHandle {
    copy_string_into(self.heap, self.strings, bytes)
  }
}

/// ## VM
///
/// A struct which represents the virtual machine.
#[derive(Debug, Default)]
pub struct VM {
  /// The chunk currently executing.
  pub(crate) chunk: Chunk,
  /// The instruction pointer (actually, the index).
  pub(crate) ip: usize,
  /// The stack of the virtual machine.
  pub(crate) stack: Vec<Value>,
  /// Every heap-allocated object (currently: interned strings) this VM owns.
  pub(crate) heap: Heap,
  /// Interned strings, so that `"a" == "a"` compares equal by handle.
  pub(crate) strings: InternTable,
}

impl VM {
  /// Compile and run one source string: a fresh `Chunk` per call, same as
  /// the REPL re-entering `interpret` for every line.
  pub fn interpret(&mut self, src: &str) -> Result<(), InterpretError> {
    let chunk = compiler::compile(src, self.interner())?;
    self.rebind(chunk);
    self.run()
  }

  /// Borrow this VM's heap and intern table as a [`StringInterner`], for
  /// callers (the compiler, or a test driving `compiler::compile` directly)
  /// that need to allocate string constants without the rest of `VM`.
  pub fn interner(&mut self) -> StringInterner<'_> {
    StringInterner {
      heap: &mut self.heap,
      strings: &mut self.strings,
    }
  }

  pub(crate) fn copy_string(&mut self, bytes: &[u8]) -> ObjHandle {
    copy_string_into(&mut self.heap, &mut self.strings, bytes)
  }

  pub(crate) fn take_string(&mut self, bytes: Box<[u8]>) -> ObjHandle {
    take_string_into(&mut self.heap, &mut self.strings, bytes)
  }

  /// The heap this VM owns, for callers (debug tooling, tests) that want to
  /// format a `Value` or disassemble a chunk outside of `run`.
  pub fn heap(&self) -> &Heap {
    &self.heap
  }

  /// Link a hand-assembled chunk directly to the VM and run it, bypassing
  /// the compiler. Exists for tests that want to drive the VM's opcode
  /// dispatch without going through source text.
  pub fn interpret_chunk(&mut self, chunk: Chunk) -> Result<(), InterpretError> {
    self.rebind(chunk);
    self.run()
  }
}

impl VM {
  fn push(&mut self, value: Value) {
    self.stack.push(value);
  }

  fn pop(&mut self) -> Result<Value, InterpretError> {
    self
      .stack
      .pop()
      .ok_or_else(|| InterpretError::RuntimeError("Operate on an empty stack.".to_owned()))
  }

  fn unary_op<F>(&mut self, op: F) -> Result<(), InterpretError>
  where
    F: Fn(Value) -> Result<Value, InterpretError>,
  {
    let value = self.pop()?;
    self.push(op(value)?);
    Ok(())
  }

  fn binary_op<F>(&mut self, op: F) -> Result<(), InterpretError>
  where
    F: Fn(Value, Value) -> Result<Value, InterpretError>,
  {
    let b = self.pop()?;
    let a = self.pop()?;
    self.push(op(a, b)?);
    Ok(())
  }

  /// `<`/`>`: unlike `==`, these only accept two numbers.
  fn compare_op(&mut self, cmp: fn(f64, f64) -> bool) -> Result<(), InterpretError> {
    let b = self.pop()?;
    let a = self.pop()?;
    match (a, b) {
      (Value::Number(x), Value::Number(y)) => {
        self.push(Value::bool_val(cmp(x, y)));
        Ok(())
      }
      _ => Err(InterpretError::RuntimeError(
        "Operands must be numbers".to_owned(),
      )),
    }
  }

  /// `+`: two numbers add, two strings concatenate, anything else errors.
  fn add_op(&mut self) -> Result<(), InterpretError> {
    let b = self.pop()?;
    let a = self.pop()?;
    match (a, b) {
      (Value::Number(x), Value::Number(y)) => {
        self.push(Value::Number(x + y));
        Ok(())
      }
      (a, b) if a.is_string(&self.heap) && b.is_string(&self.heap) => {
        let mut bytes = self.heap.string(a.as_obj()).as_bytes().to_vec();
        bytes.extend_from_slice(self.heap.string(b.as_obj()).as_bytes());
        let handle = self.take_string(bytes.into_boxed_slice());
        self.push(Value::obj_val(handle));
        Ok(())
      }
      _ => Err(InterpretError::RuntimeError(
        "Operands must be two numbers or two strings".to_owned(),
      )),
    }
  }
}

impl VM {
  fn read_byte(&mut self) -> u8 {
    let byte = self.chunk.code()[self.ip];
    self.ip += 1;
    byte
  }

  fn read_constant(&mut self) -> Value {
    let index = self.read_byte();
    self.chunk.constant(index)
  }
}

impl VM {
  #[cfg(feature = "debug_trace_execution")]
  #[allow(dead_code)]
  fn disassemble_instruction(&self) -> Result<(), InterpretError> {
    self.chunk.disassemble_instruction(self.ip, &self.heap);
    Ok(())
  }

  #[cfg(feature = "debug_trace_stack")]
  pub fn trace_stack(&self) {
    print!("        | [");
    for (i, value) in self.stack.iter().enumerate() {
      if i > 0 {
        print!(", ");
      }
      print!("{}", value.format(&self.heap));
    }
    println!("]");
  }
}

impl VM {
  /// Run the virtual machine from `self.ip` to the chunk's end (or a
  /// terminating `OP_RETURN`).
  pub fn run(&mut self) -> Result<(), InterpretError> {
    let mut result = Ok(());
    while self.ip < self.chunk.len() {
      #[cfg(feature = "debug_trace_stack")]
      self.trace_stack();
      #[cfg(feature = "debug_trace_execution")]
      self.disassemble_instruction()?;

      result = self.run_one_step();
      if result.is_err() {
        break;
      }
    }
    result
  }

  #[inline]
  fn run_one_step(&mut self) -> Result<(), InterpretError> {
    let raw_result = match self.read_byte().into() {
      OpCode::Constant => {
        let constant = self.read_constant();
        self.push(constant);
        Ok(())
      }
      OpCode::Nil => {
        self.push(Value::nil_val());
        Ok(())
      }
      OpCode::True => {
        self.push(Value::bool_val(true));
        Ok(())
      }
      OpCode::False => {
        self.push(Value::bool_val(false));
        Ok(())
      }
      OpCode::Equal => self.binary_op(|l, r| Ok(Value::bool_val(l == r))),
      OpCode::Greater => self.compare_op(|l, r| l > r),
      OpCode::Less => self.compare_op(|l, r| l < r),
      OpCode::Not => {
        let value = self.pop()?;
        self.push(Value::bool_val(value.is_falsey()));
        Ok(())
      }
      OpCode::Negate => self.unary_op(|v| -v),
      OpCode::Add => self.add_op(),
      OpCode::Subtract => self.binary_op(|l, r| l - r),
      OpCode::Multiply => self.binary_op(|l, r| l * r),
      OpCode::Divide => self.binary_op(|l, r| l / r),
      OpCode::Return => {
        let value = self.pop()?;
        println!("{}", value.format(&self.heap));
        return Ok(());
      }
    };
    if let Err(InterpretError::RuntimeError(message)) = raw_result {
      self.runtime_error(message)
    } else {
      raw_result
    }
  }
}

impl VM {
  pub fn runtime_error(&mut self, message: String) -> Result<(), InterpretError> {
    // ip has already moved past the instruction that failed.
    let inst_index = self.ip - 1;
    let line = self.chunk.line(inst_index);
    let message = format!("{message}\n[line {line}] in script");

    self.stack.clear();

    Err(InterpretError::RuntimeError(message))
  }
}

impl Init for VM {}

impl VM {
  /// Release the heap, intern table and chunk this VM owns. Called once the
  /// caller is done interpreting (end of REPL session, or after a single
  /// file run).
  pub fn free(&mut self) {
    self.chunk.free();
    self.stack.clear();
    self.heap.free();
    self.strings.free();
  }

  /// Swap in a freshly compiled chunk, resetting the instruction pointer.
  fn rebind(&mut self, chunk: Chunk) {
    self.chunk = chunk;
    self.ip = 0;
  }
}
