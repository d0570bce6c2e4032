//! Error types for the TinyVM assembler.

use thiserror::Error;
use tinyvm_common::LoadError;

/// Errors produced while assembling text into a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic or directive was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode or directive did not have enough arguments.
    #[error("line {line}: {opcode} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// A branch names a label its method never defines.
    #[error("line {line}: undefined label '{label}'")]
    UndefinedLabel { line: usize, label: String },

    /// A label is defined twice in one method.
    #[error("line {line}: duplicate label '{label}'")]
    DuplicateLabel { line: usize, label: String },

    /// An instruction or label appeared outside `.method` ... `.end`.
    #[error("line {line}: instruction outside of a method")]
    InstructionOutsideMethod { line: usize },

    /// Input ended inside a method body.
    #[error("line {line}: method '{name}' is missing .end")]
    UnterminatedMethod { line: usize, name: String },

    /// `.method` appeared inside another method body.
    #[error("line {line}: .method inside method '{outer}'")]
    NestedMethod { line: usize, outer: String },

    /// The assembled method or program failed its load checks.
    #[error(transparent)]
    Load(#[from] LoadError),
}
