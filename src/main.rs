use std::io::{self, Write};

use loxvm::{
  utils::{get_args, Init},
  vm::{InterpretError, VM},
};

const REPL_LINE_MAX: usize = 1024;

/// Run a prompt, reading one line of source at a time and feeding it to the
/// same long-lived `VM` — so string interning and (once the language grows)
/// globals persist across lines, the same way the upstream REPL works.
fn repl(vm: &mut VM) {
  let stdin = io::stdin();
  loop {
    print!("> ");
    if io::stdout().flush().is_err() {
      break;
    }

    let mut line = String::new();
    match stdin.lock().read_line_capped(&mut line, REPL_LINE_MAX) {
      Ok(0) => {
        println!();
        break;
      }
      Ok(_) => {
        // A read error mid-expression shouldn't kill the whole session.
        if let Err(err) = vm.interpret(&line) {
          report(err);
        }
      }
      Err(_) => break,
    }
  }
}

/// `std::io::Stdin::read_line` has no built-in length cap; clox's REPL caps
/// each line at 1024 bytes, so this mirrors that instead of trusting an
/// unbounded read.
trait ReadLineCapped {
  fn read_line_capped(&mut self, buf: &mut String, max: usize) -> io::Result<usize>;
}

impl ReadLineCapped for io::StdinLock<'_> {
  fn read_line_capped(&mut self, buf: &mut String, max: usize) -> io::Result<usize> {
    use std::io::{BufRead, Read};
    let mut limited = Read::take(self, max as u64);
    limited.read_line(buf)
  }
}

fn run_file(path: &str) -> Result<(), InterpretError> {
  let source = std::fs::read_to_string(path).map_err(|err| {
    InterpretError::CompileError(format!("Could not read file '{path}': {err}"))
  })?;
  let mut vm = VM::init();
  let result = vm.interpret(&source);
  vm.free();
  result
}

fn report(err: InterpretError) -> i32 {
  match err {
    InterpretError::CompileError(message) => {
      eprintln!("{message}");
      65
    }
    InterpretError::RuntimeError(message) => {
      eprintln!("{message}");
      70
    }
  }
}

pub fn main() {
  let args = get_args();

  let exit_code = match args.len() {
    0 => {
      let mut vm = VM::init();
      repl(&mut vm);
      vm.free();
      0
    }
    1 => match run_file(&args[0]) {
      Ok(()) => 0,
      Err(err) if is_io_error(&err) => 74,
      Err(err) => report(err),
    },
    _ => {
      eprintln!("Usage: clox: [path]");
      64
    }
  };

  std::process::exit(exit_code);
}

/// `run_file` funnels file-read failures through the same `CompileError`
/// variant as an actual parse failure (there's no dedicated I/O error
/// variant); this tells the two apart so file-not-found exits 74, not 65.
fn is_io_error(err: &InterpretError) -> bool {
  matches!(err, InterpretError::CompileError(message) if message.starts_with("Could not read file"))
}
