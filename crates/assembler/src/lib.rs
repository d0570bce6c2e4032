//! TinyVM assembler: text assembly ↔ [`Program`] translation.
//!
//! The assembler is a mechanical 1:1 translation with one convenience:
//! branch operands may name a method-local label instead of an absolute
//! instruction index.
//!
//! # Usage
//!
//! ```
//! use tinyvm_assembler::{assemble, disassemble};
//!
//! let text = ".method main 0 0\n    PUSH_CONST 42\n    RETURN\n.end\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for all valid programs.
//! The disassembler outputs canonical text; the assembler also accepts
//! labels, comments, lowercase mnemonics and hex literals.

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::disassemble;
pub use error::AsmError;

use std::collections::HashMap;

use lexer::tokenize_line;
use parser::{parse_line, Item, Pending, Target};
use tinyvm_common::{Instruction, Method, Opcode, Program};

/// Assemble text into a loaded program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut methods = Vec::new();
    let mut open: Option<MethodBuilder> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let parsed = parse_line(&tokenize_line(line, line_num)?, line_num)?;

        if let Some(label) = parsed.label {
            let builder = open
                .as_mut()
                .ok_or(AsmError::InstructionOutsideMethod { line: line_num })?;
            builder.define_label(label, line_num)?;
        }

        match parsed.item {
            None => {}
            Some(Item::Method {
                name,
                arity,
                local_count,
            }) => {
                if let Some(outer) = &open {
                    return Err(AsmError::NestedMethod {
                        line: line_num,
                        outer: outer.name.clone(),
                    });
                }
                open = Some(MethodBuilder::new(name, arity, local_count, line_num));
            }
            Some(Item::End) => match open.take() {
                Some(builder) => methods.push(builder.finish()?),
                None => {
                    return Err(AsmError::UnexpectedToken {
                        line: line_num,
                        token: ".end".to_string(),
                    })
                }
            },
            Some(Item::Instr(pending)) => {
                let builder = open
                    .as_mut()
                    .ok_or(AsmError::InstructionOutsideMethod { line: line_num })?;
                builder.code.push((pending, line_num));
            }
        }
    }

    if let Some(builder) = open {
        return Err(AsmError::UnterminatedMethod {
            line: builder.line,
            name: builder.name,
        });
    }

    Ok(Program::new(methods)?)
}

/// A method body being collected between `.method` and `.end`.
struct MethodBuilder {
    name: String,
    arity: u16,
    local_count: u16,
    /// Line of the `.method` directive.
    line: usize,
    code: Vec<(Pending, usize)>,
    labels: HashMap<String, u32>,
}

impl MethodBuilder {
    fn new(name: String, arity: u16, local_count: u16, line: usize) -> Self {
        Self {
            name,
            arity,
            local_count,
            line,
            code: Vec::new(),
            labels: HashMap::new(),
        }
    }

    /// Bind `label` to the next instruction index.
    fn define_label(&mut self, label: String, line_num: usize) -> Result<(), AsmError> {
        let here = self.code.len() as u32;
        if self.labels.contains_key(&label) {
            return Err(AsmError::DuplicateLabel {
                line: line_num,
                label,
            });
        }
        self.labels.insert(label, here);
        Ok(())
    }

    /// Resolve labels and run the method load checks.
    fn finish(self) -> Result<Method, AsmError> {
        let mut code = Vec::with_capacity(self.code.len());
        for (pending, line_num) in self.code {
            let instr = match pending {
                Pending::Ready(instr) => instr,
                Pending::Branch { opcode, target } => {
                    let target = match target {
                        Target::Index(index) => index,
                        Target::Label(label) => match self.labels.get(&label) {
                            Some(&index) => index,
                            None => {
                                return Err(AsmError::UndefinedLabel {
                                    line: line_num,
                                    label,
                                })
                            }
                        },
                    };
                    match opcode {
                        Opcode::Jump => Instruction::Jump(target),
                        _ => Instruction::JumpIfFalse(target),
                    }
                }
            };
            code.push(instr);
        }
        Ok(Method::new(self.name, self.arity, self.local_count, code)?)
    }
}
