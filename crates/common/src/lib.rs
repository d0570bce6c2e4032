//! TinyVM common types and instruction encoding.
//!
//! This crate provides the foundational data structures for the TinyVM
//! instruction set:
//!
//! - [`Opcode`]: the opcode vocabulary and its byte values
//! - [`Instruction`]: a decoded instruction with its operands, plus the
//!   8-byte encoding
//! - [`Method`]: a static method (name, arity, locals, code)
//! - [`Program`]: a flat table of methods and the `.tvmb` module format
//! - [`DecodeError`] / [`LoadError`]: binary and structural errors
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod method;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, LoadError};
pub use instruction::{Instruction, NameTable};
pub use method::Method;
pub use opcode::Opcode;
pub use program::Program;
