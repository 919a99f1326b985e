use std::io::{self, Write};

use tracing_subscriber::{fmt, EnvFilter};

use crate::ExecutionError;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BF_LOG";

/// Initialize logging to stderr.
///
/// `BF_LOG` overrides the default `warn` filter; `BF_LOG=brainfuk=trace`
/// prints every executed instruction.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Pretty-print an execution error, with caret positioning when it has a position.
/// If `program` is `Some("bf")`, messages are prefixed with "bf: ...".
pub fn print_execution_error(program: Option<&str>, code: &[u8], err: &ExecutionError) {
    let msg = match program {
        Some(p) => format!("{p}: Error: {err}"),
        None => format!("Error: {err}"),
    };

    match err.position() {
        Some(pos) => print_error_with_context(&msg, code, pos),
        None => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error followed by a window of the program with a caret
/// under position `pos`. Non-printable bytes are shown as '.'.
pub fn print_error_with_context(msg: &str, code: &[u8], pos: usize) {
    eprintln!("{msg}");

    const WINDOW: usize = 32;

    let start = pos.saturating_sub(WINDOW);
    let end = (pos + WINDOW + 1).min(code.len());
    if start < end {
        eprintln!("  {}", render(&code[start..end]));
        eprintln!("  {}^", " ".repeat(pos - start));
    }
    let _ = io::stderr().flush();
}

fn render(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_masks_control_bytes() {
        assert_eq!(render(b"+\n[\t]\xff"), "+.[.].");
    }
}
