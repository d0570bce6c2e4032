//! TinyVM CLI: assemble, disassemble, run, and check conformance.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/decode/assembly/load/usage error
//! - 2: Conformance mismatch
//! - 3: Runtime fault or step budget exhausted

mod commands;

use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "assemble" => commands::assemble(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "run" => commands::run(&args[2..]),
        "conformance" => commands::conformance(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: tinyvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  assemble <input.tasm> [-o output.tvmb]    Assemble text to a binary module");
    eprintln!("  disassemble <input.tvmb>                  Disassemble a binary module to text");
    eprintln!("  run <file> [--entry NAME] [ARGS...]       Execute a method (default: main)");
    eprintln!("  conformance <fixture|dir>...              Check @expect/@fault fixtures");
    eprintln!();
    eprintln!("Limits (run, conformance):");
    eprintln!("  --max-steps N    Stop after N instructions");
    eprintln!("  --max-depth N    Maximum call depth");
    eprintln!("  --max-stack N    Maximum operand stack per frame");
    eprintln!();
    eprintln!("Set RUST_LOG=debug (or trace) for execution logs.");
}
