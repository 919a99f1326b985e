//! A tiny Brainfuck interpreter library.
//!
//! Programs run on a fixed-length tape of `u8` cells (30,000 by default)
//! with a single data pointer and a bounded loop stack (1,000 open loops by
//! default). Pointer moves past either end of the tape, unmatched brackets,
//! loops left open at the end of the program and loop stack overflow all
//! abort the run with an [`ExecutionError`].
//!
//! Quick start:
//!
//! ```no_run
//! use brainfuk::{Config, Interpreter, Program};
//!
//! let program = Program::from_file("hello.bf").expect("readable file");
//! let mut bf = Interpreter::new(program, &Config::default());
//! bf.run_stdio().expect("program should run");
//! ```

pub mod cli_util;
pub mod config;
pub mod engine;
pub mod source;
pub mod tape;

pub use config::{Config, ConfigError};
pub use engine::{find_matching_bracket, BracketKind, Direction, ExecutionError, Interpreter, LoopStack};
pub use source::{LoadError, Program};
pub use tape::{Bound, Tape};
