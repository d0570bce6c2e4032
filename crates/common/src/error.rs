//! Decode and load errors for TinyVM programs.

use thiserror::Error;

/// Errors that occur while decoding a binary module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opcode 0x00 is illegal and always rejected.
    #[error("illegal opcode 0x00")]
    IllegalOpcode,

    /// Opcode byte is not assigned to any instruction.
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    /// The reserved byte of an instruction was not zero.
    #[error("reserved byte is {0:#04x} (must be 0)")]
    ReservedByte(u8),

    /// The module does not start with the `TVMB` magic.
    #[error("bad magic (expected \"TVMB\")")]
    BadMagic,

    /// The module format version is not supported.
    #[error("unsupported module version {0}")]
    UnsupportedVersion(u8),

    /// The byte stream ended in the middle of a structure.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    /// A name in the name table is not valid UTF-8.
    #[error("name {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    /// An instruction or method header referenced a missing name.
    #[error("name index {index} out of range (table has {count} names)")]
    NameIndexOutOfRange { index: usize, count: usize },

    /// Bytes remained after the last method.
    #[error("{0} trailing byte(s) after last method")]
    TrailingBytes(usize),

    /// The decoded methods failed load-time checks.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Structural errors detected once, when a program is loaded.
///
/// A program that passes these checks never branches outside its method
/// and never runs off the end of an instruction sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A method has no instructions.
    #[error("method '{method}' has no instructions")]
    EmptyMethod { method: String },

    /// A method declares more parameters than local slots.
    #[error("method '{method}' has arity {arity} but only {local_count} local slot(s)")]
    ArityExceedsLocals {
        method: String,
        arity: u16,
        local_count: u16,
    },

    /// A branch names an instruction index outside its method.
    #[error("method '{method}' instruction {at}: branch target {target} out of range (length {len})")]
    BranchOutOfRange {
        method: String,
        at: usize,
        target: u32,
        len: usize,
    },

    /// The last instruction of a method can fall through past the end.
    #[error("method '{method}' can fall off the end (last instruction is {last})")]
    FallsOffEnd { method: String, last: &'static str },

    /// Two methods share a name.
    #[error("duplicate method '{method}'")]
    DuplicateMethod { method: String },

    /// A method name, declared or called, that assembly text cannot spell.
    #[error("method '{method}': invalid method name '{name}'")]
    InvalidName { method: String, name: String },
}
