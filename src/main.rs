use std::fs;

use clap::{ArgAction, Parser};
use tabula::{get_result_with_config, interpreter::evaluator::core::EvalConfig};
use tracing_subscriber::EnvFilter;

/// tabula evaluates programs in a small typed lambda calculus with records
/// and relational tables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells tabula to read the program from a file instead of the argument.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode prints the value of the last statement once the program
    /// finishes.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Log to stderr. Repeat for more detail (`-v` debug, `-vv` trace).
    /// Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Stop with an error after this many reduction steps.
    #[arg(long)]
    max_steps: Option<u64>,

    contents: String,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let script = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        })
    } else {
        args.contents
    };

    let config = EvalConfig { max_steps: args.max_steps };
    if let Err(e) = get_result_with_config(&script, args.pipe_mode, config) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
