//! The execution engine.
//!
//! Behaviors:
//! - Memory tape initialized to 0, its length taken from [`Config`].
//! - Strict pointer bounds: moving left from cell 0 or right past the end
//!   aborts the run with [`ExecutionError::PointerOutOfBounds`].
//! - Input `,` reads a single byte; on EOF the current cell is left unchanged.
//! - Output `.` writes the current cell as one byte and flushes immediately.
//! - Loops are matched on demand: `[` on a zero cell scans forward for its
//!   matching `]`, while `]` jumps back using the loop stack.
//! - Any character outside `><+-.,[]` is a comment and is skipped.
//!
//! ```no_run
//! use brainfuk::{Config, Interpreter, Program};
//!
//! let program = Program::inline("++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.");
//! let mut bf = Interpreter::new(program, &Config::default());
//! bf.run_stdio().expect("program should run");
//! ```

use std::fmt;
use std::io::{self, Read, Write};

use tracing::{debug, trace};

use crate::config::Config;
use crate::source::Program;
use crate::tape::{Bound, Tape};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The data pointer attempted to leave the tape.
    #[error("Memory pointer out of bounds ({bound}) at position {ip} (ptr={ptr})")]
    PointerOutOfBounds { ip: usize, ptr: usize, bound: Bound },

    /// A `[` with no matching `]`, or a `]` with no open loop.
    #[error("Unmatched {kind} at position {ip}")]
    UnmatchedBracket { ip: usize, kind: BracketKind },

    /// The program ended with loops still open.
    #[error("Unmatched '[' - {open} loops left open")]
    UnterminatedLoop { open: usize },

    /// More loops open at once than the loop stack allows.
    #[error("Loop stack overflow at position {ip} (depth {depth})")]
    StackOverflow { ip: usize, depth: usize },

    /// Reading input or writing output failed.
    #[error("I/O error at position {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: io::Error,
    },
}

impl ExecutionError {
    /// Position in the program the error refers to, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            ExecutionError::PointerOutOfBounds { ip, .. }
            | ExecutionError::UnmatchedBracket { ip, .. }
            | ExecutionError::StackOverflow { ip, .. }
            | ExecutionError::Io { ip, .. } => Some(*ip),
            ExecutionError::UnterminatedLoop { .. } => None,
        }
    }
}

/// Which side of a loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Scan direction for [`find_matching_bracket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From a `[` towards its `]`.
    Forward,
    /// From a `]` towards its `[`.
    Backward,
}

/// Find the bracket matching the one at `start`.
///
/// Scanning begins at the neighbour of `start` and keeps a depth counter
/// starting at 1: brackets of the same kind as `start` deepen it, the other
/// kind closes it. Returns `None` if the program ends first.
pub fn find_matching_bracket(code: &[u8], start: usize, direction: Direction) -> Option<usize> {
    let (open, close) = match direction {
        Direction::Forward => (b'[', b']'),
        Direction::Backward => (b']', b'['),
    };
    let mut depth: isize = 1;
    let mut i = start;

    loop {
        i = match direction {
            Direction::Forward => i.checked_add(1).filter(|&n| n < code.len())?,
            Direction::Backward => i.checked_sub(1)?,
        };
        let c = code[i];
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
}

/// A bounded stack of positions of currently open `[` instructions.
#[derive(Debug, Clone)]
pub struct LoopStack {
    entries: Vec<usize>,
    capacity: usize,
}

impl LoopStack {
    /// Empty stack holding at most `capacity` entries. Storage grows as loops open.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Push `ip`; fails without modifying the stack when it is full.
    pub fn push(&mut self, ip: usize) -> Result<(), usize> {
        if self.entries.len() >= self.capacity {
            return Err(self.capacity);
        }
        self.entries.push(ip);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<usize> {
        self.entries.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single run of a program over its own tape and loop stack.
///
/// Every interpreter owns all of its state, so separate instances never
/// interfere with each other.
pub struct Interpreter<'a> {
    program: Program<'a>,
    tape: Tape,
    ip: usize,
    loop_stack: LoopStack,
}

impl<'a> Interpreter<'a> {
    /// Process exit code for a failed run.
    pub const EXIT_FAILURE: i32 = -1;

    pub fn new(program: Program<'a>, config: &Config) -> Self {
        Self {
            program,
            tape: Tape::new(config.tape_size),
            ip: 0,
            loop_stack: LoopStack::with_capacity(config.stack_depth),
        }
    }

    /// Run against the process's stdin and stdout.
    pub fn run_stdio(&mut self) -> Result<(), ExecutionError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Execute the program until completion.
    ///
    /// `.` writes to `output` and flushes it after every byte; `,` reads one
    /// byte from `input`.
    pub fn run<R: Read, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), ExecutionError> {
        let code_len = self.program.len();
        let mut step: u64 = 0;
        debug!(len = code_len, tape = self.tape.len(), "starting run");

        while self.ip < code_len {
            let ip = self.ip;
            let instr = self.program.as_bytes()[ip];

            match instr {
                b'>' => {
                    self.tape.move_right().map_err(|bound| self.out_of_bounds(bound))?;
                }
                b'<' => {
                    self.tape.move_left().map_err(|bound| self.out_of_bounds(bound))?;
                }
                b'+' => {
                    self.tape.increment();
                }
                b'-' => {
                    self.tape.decrement();
                }
                b'.' => {
                    let byte = [self.tape.get()];
                    output
                        .write_all(&byte)
                        .and_then(|()| output.flush())
                        .map_err(|source| ExecutionError::Io { ip, source })?;
                }
                b',' => {
                    if let Some(byte) = read_byte(&mut input).map_err(|source| ExecutionError::Io { ip, source })? {
                        self.tape.set(byte);
                    }
                }
                b'[' => {
                    if self.tape.get() == 0 {
                        let Some(j) = find_matching_bracket(self.program.as_bytes(), ip, Direction::Forward) else {
                            return Err(ExecutionError::UnmatchedBracket {
                                ip,
                                kind: BracketKind::Open,
                            });
                        };
                        self.ip = j;
                    } else {
                        self.loop_stack
                            .push(ip)
                            .map_err(|depth| ExecutionError::StackOverflow { ip, depth })?;
                    }
                }
                b']' => {
                    let Some(open) = self.loop_stack.top() else {
                        return Err(ExecutionError::UnmatchedBracket {
                            ip,
                            kind: BracketKind::Close,
                        });
                    };
                    // Resume just after the '[' it matches; the entry stays
                    // on the stack until the loop exits.
                    if self.tape.get() != 0 {
                        self.ip = open;
                    } else {
                        self.loop_stack.pop();
                    }
                }
                _ => {}
            }

            if is_instruction(instr) {
                trace!(
                    step,
                    ip,
                    ptr = self.tape.pointer(),
                    cell = self.tape.get(),
                    instr = %(instr as char),
                    "executed"
                );
                step += 1;
            }

            self.ip += 1;
        }

        if !self.loop_stack.is_empty() {
            return Err(ExecutionError::UnterminatedLoop {
                open: self.loop_stack.depth(),
            });
        }

        debug!(steps = step, "run finished");
        Ok(())
    }

    fn out_of_bounds(&self, bound: Bound) -> ExecutionError {
        ExecutionError::PointerOutOfBounds {
            ip: self.ip,
            ptr: self.tape.pointer(),
            bound,
        }
    }

    pub fn program(&self) -> &Program<'a> {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn loop_stack(&self) -> &LoopStack {
        &self.loop_stack
    }

    /// Current instruction pointer; equals the program length after a successful run.
    pub fn ip(&self) -> usize {
        self.ip
    }
}

fn is_instruction(c: u8) -> bool {
    matches!(c, b'>' | b'<' | b'+' | b'-' | b'.' | b',' | b'[' | b']')
}

/// Read one byte, retrying interrupted reads. `Ok(None)` means end of input.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
