//! Disassembler: program → canonical assembly text.
//!
//! One `.method` block per method, in load order, separated by a blank
//! line. Instructions are indented four spaces. Branch targets are
//! absolute indices; no labels or comments are emitted.

use std::fmt::Write;

use tinyvm_common::Program;

/// Disassemble a program into canonical assembly text.
///
/// The output reassembles to an identical program
/// (`assemble(disassemble(program)) == program`).
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    for (i, method) in program.methods().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            ".method {} {} {}",
            method.name(),
            method.arity(),
            method.local_count()
        );
        for instr in method.code() {
            let _ = writeln!(out, "    {instr}");
        }
        out.push_str(".end\n");
    }
    out
}
