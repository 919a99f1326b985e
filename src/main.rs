use brainfuk::cli_util::{init_logging, print_execution_error};
use brainfuk::{Config, Interpreter, Program};
use clap::Parser;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn usage(program: &str) -> String {
    format!(
        r#"Usage: {0} [options] <brainfuck_file>
Options:
  -c <code>              Execute Brainfuck code directly from command line
  -h, --help             Show this help message
  -d                     Print 'I use Arch btw!'
  --tape-size <N>        Number of tape cells (env BF_TAPE_SIZE; default 30000)
  --stack-depth <N>      Maximum number of open loops (env BF_STACK_DEPTH; default 1000)

Notes:
- Input (`,`) reads a single byte from stdin; on EOF the current cell is left unchanged.
- Characters outside of Brainfuck's ><+-.,[] are ignored as comments.
- Defaults for the limits can be set in the [interpreter] table of bf.toml
  in the XDG config directory.
- Set BF_LOG=trace to log every executed instruction to stderr.

Examples:
  {0} hello.bf
  {0} -c "{1}"
  {0} -d
"#,
        program, HELLO_WORLD
    )
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    if code == 0 {
        print!("{}", usage(program));
        let _ = io::stdout().flush();
    } else {
        eprint!("{}", usage(program));
        let _ = io::stderr().flush();
    }
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Execute Brainfuck code directly from the command line
    #[arg(short = 'c', value_name = "code", allow_hyphen_values = true)]
    code: Option<String>,

    /// Print 'I use Arch btw!' and exit
    #[arg(short = 'd', action = clap::ArgAction::SetTrue)]
    arch: bool,

    /// Number of tape cells
    #[arg(long = "tape-size", value_name = "N", env = "BF_TAPE_SIZE")]
    tape_size: Option<usize>,

    /// Maximum number of simultaneously open loops
    #[arg(long = "stack-depth", value_name = "N", env = "BF_STACK_DEPTH")]
    stack_depth: Option<usize>,

    /// Brainfuck source file
    #[arg(value_name = "brainfuck_file")]
    file: Option<PathBuf>,
}

fn run(program: &str, cli: Cli) -> i32 {
    if cli.help {
        usage_and_exit(program, 0);
    }

    if cli.arch {
        println!("I use Arch btw!");
        let _ = io::stdout().flush();
        return 0;
    }

    let Cli {
        code,
        file,
        tape_size,
        stack_depth,
        ..
    } = cli;

    let source = match (code.as_deref(), file) {
        (Some(_), Some(_)) => {
            eprintln!("{program}: cannot use -c together with a file");
            usage_and_exit(program, 1)
        }
        (Some(code), None) => Program::inline(code),
        (None, Some(path)) => match Program::from_file(&path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{program}: Error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
        (None, None) => usage_and_exit(program, 1),
    };

    let config = match Config::resolve(tape_size, stack_depth) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };
    debug!(?config, len = source.len(), "resolved configuration");

    let mut bf = Interpreter::new(source, &config);
    match bf.run_stdio() {
        Ok(()) => 0,
        Err(err) => {
            print_execution_error(Some(program), bf.program().as_bytes(), &err);
            Interpreter::EXIT_FAILURE
        }
    }
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let msg = e.to_string();
            let first = msg.lines().next().unwrap_or("invalid arguments");
            eprintln!("{program}: {first}");
            usage_and_exit(&program, 1);
        }
    };

    let code = run(&program, cli);
    std::process::exit(code);
}
