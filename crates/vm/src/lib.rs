//! TinyVM: a stack-based interpreter for a flat table of static methods.
//!
//! The machine has:
//! - One [`Frame`] per activation, with its own operand stack and locals
//! - An explicit call stack of owned frames, bounded by [`VmConfig`]
//! - An [`ArrayHeap`] of fixed-length `i32` arrays addressed by handles
//!
//! All values are 32-bit signed integers; arithmetic wraps.
//!
//! # Usage
//!
//! ```
//! use tinyvm_common::{Instruction, Method, Program};
//! use tinyvm_vm::run;
//!
//! let program = Program::new(vec![Method::new(
//!     "main",
//!     0,
//!     0,
//!     vec![
//!         Instruction::PushConst(40),
//!         Instruction::PushConst(2),
//!         Instruction::Add,
//!         Instruction::Return,
//!     ],
//! )
//! .unwrap()])
//! .unwrap();
//!
//! assert_eq!(run(&program, "main", &[]), Ok(42));
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod frame;
pub mod heap;
pub mod machine;

pub use config::VmConfig;
pub use error::{Fault, FaultKind, Location};
pub use frame::Frame;
pub use heap::ArrayHeap;
pub use machine::{Interpreter, State};

use tinyvm_common::Program;

/// Call `entry` with `args` and run to completion with default limits.
///
/// Each call gets a fresh call stack and heap.
///
/// # Errors
///
/// Returns a [`Fault`] if the entry method cannot be entered or any
/// instruction fails (array bounds, stack limits, unknown methods, etc.).
pub fn run(program: &Program, entry: &str, args: &[i32]) -> Result<i32, Fault> {
    run_with_config(program, entry, args, VmConfig::default())
}

/// Like [`run`], with explicit resource limits.
pub fn run_with_config(
    program: &Program,
    entry: &str,
    args: &[i32],
    config: VmConfig,
) -> Result<i32, Fault> {
    Interpreter::new(program, entry, args, config).run()
}
