//! CLI command implementations.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use tinyvm_cli::conformance::{self, Limits, Outcome};
use tinyvm_common::Program;

/// Assemble a .tasm text file to a .tvmb binary module.
pub fn assemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: assemble requires an input file");
        eprintln!("Usage: tinyvm assemble <input.tasm> [-o output.tvmb]");
        return Err(1);
    }

    let input = &args[0];

    // Parse -o flag
    let output = if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if let Some(stem) = input.strip_suffix(".tasm") {
        format!("{stem}.tvmb")
    } else {
        format!("{input}.tvmb")
    };

    let text = read_text(input)?;
    let program = tinyvm_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let bytes = program.encode();
    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!(
        "assembled {} method(s) ({} bytes) -> {output}",
        program.len(),
        bytes.len()
    );
    Ok(())
}

/// Disassemble a .tvmb binary to text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: tinyvm disassemble <input.tvmb>");
        return Err(1);
    }

    let program = read_binary(&args[0])?;
    print!("{}", tinyvm_assembler::disassemble(&program));
    Ok(())
}

/// Execute one entry method of a .tvmb or .tasm program.
pub fn run(args: &[String]) -> Result<(), i32> {
    const USAGE: &str = "Usage: tinyvm run <file> [--entry NAME] [--max-steps N] \
                         [--max-depth N] [--max-stack N] [ARGS...]";

    let options = parse_options(args, true)?;
    let Some((input, rest)) = options.positional.split_first() else {
        eprintln!("error: run requires an input file");
        eprintln!("{USAGE}");
        return Err(1);
    };

    let mut call_args = Vec::with_capacity(rest.len());
    for arg in rest {
        call_args.push(parse_value::<i32>("argument", arg)?);
    }

    let program = load_program(input)?;
    let entry = options.entry.as_deref().unwrap_or("main");
    debug!("running {entry}{call_args:?} from {input}");

    match conformance::execute(&program, entry, &call_args, &options.limits) {
        Outcome::Returned(value) => {
            println!("{value}");
            Ok(())
        }
        Outcome::Faulted(fault) => {
            eprintln!("runtime error: {fault}");
            Err(3)
        }
        exhausted @ Outcome::Exhausted { .. } => {
            eprintln!("error: {exhausted}");
            Err(3)
        }
    }
}

/// Check annotated .tasm fixtures (files or directories of them).
pub fn conformance(args: &[String]) -> Result<(), i32> {
    let options = parse_options(args, false)?;
    if options.positional.is_empty() {
        eprintln!("error: conformance requires at least one fixture or directory");
        eprintln!("Usage: tinyvm conformance <fixture.tasm|dir>... [--max-steps N]");
        return Err(1);
    }

    let mut fixtures = Vec::new();
    for path in &options.positional {
        collect_fixtures(Path::new(path), &mut fixtures)?;
    }

    let (mut passed, mut failed, mut broken) = (0usize, 0usize, 0usize);
    for fixture in &fixtures {
        let name = fixture.display();
        let text = match fs::read_to_string(fixture) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("error: cannot read '{name}': {e}");
                broken += 1;
                continue;
            }
        };

        match conformance::check_fixture(&text, &options.limits) {
            Ok(results) => {
                for result in &results {
                    println!("{name}: {result}");
                    if result.passed() {
                        passed += 1;
                    } else {
                        failed += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("error: {name}: {e}");
                broken += 1;
            }
        }
    }

    println!(
        "{passed} passed, {failed} failed, {broken} fixture error(s) across {} file(s)",
        fixtures.len()
    );

    if broken > 0 {
        Err(1)
    } else if failed > 0 {
        Err(2)
    } else {
        Ok(())
    }
}

// --- Helpers ---

/// Flags shared by `run` and `conformance`.
#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    entry: Option<String>,
    limits: Limits,
}

/// Split `--flag value` pairs from positional arguments.
///
/// Only `--` prefixed words are flags, so negative numbers stay positional.
fn parse_options(args: &[String], allow_entry: bool) -> Result<Options, i32> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if !arg.starts_with("--") {
            options.positional.push(arg.clone());
            i += 1;
            continue;
        }

        let Some(value) = args.get(i + 1) else {
            eprintln!("error: {arg} requires a value");
            return Err(1);
        };
        match arg.as_str() {
            "--entry" if allow_entry => options.entry = Some(value.clone()),
            "--max-steps" => options.limits.max_steps = Some(parse_value(arg, value)?),
            "--max-depth" => options.limits.config.max_call_depth = parse_value(arg, value)?,
            "--max-stack" => options.limits.config.max_operand_stack = parse_value(arg, value)?,
            _ => {
                eprintln!("error: unknown flag '{arg}'");
                return Err(1);
            }
        }
        i += 2;
    }
    Ok(options)
}

fn parse_value<T: FromStr>(what: &str, value: &str) -> Result<T, i32> {
    value.parse().map_err(|_| {
        eprintln!("error: invalid {what} '{value}'");
        1
    })
}

/// Expand `path` into fixture files: a file as-is, a directory's `.tasm`
/// files in name order.
fn collect_fixtures(path: &Path, out: &mut Vec<PathBuf>) -> Result<(), i32> {
    if !path.is_dir() {
        out.push(path.to_path_buf());
        return Ok(());
    }

    let entries = fs::read_dir(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        1
    })?;
    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "tasm"))
        .collect();
    found.sort();
    debug!("{} fixture(s) in {}", found.len(), path.display());
    out.extend(found);
    Ok(())
}

/// Load a program from assembly text (`.tasm`) or a binary module.
fn load_program(path: &str) -> Result<Program, i32> {
    if path.ends_with(".tasm") {
        let text = read_text(path)?;
        tinyvm_assembler::assemble(&text).map_err(|e| {
            eprintln!("error: {e}");
            1
        })
    } else {
        read_binary(path)
    }
}

fn read_text(path: &str) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })
}

/// Read and decode a .tvmb binary file.
fn read_binary(path: &str) -> Result<Program, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    Program::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary: {e}");
        1
    })
}
