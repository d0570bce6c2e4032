//! Interpreter state: call stack, array heap, and the run state machine.

use log::debug;
use tinyvm_common::Program;

use crate::config::VmConfig;
use crate::error::{Fault, FaultKind};
use crate::frame::Frame;
use crate::heap::ArrayHeap;

/// Where the interpreter is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// More instructions to execute.
    Running,
    /// The outermost frame returned this value.
    Returned(i32),
    /// Execution stopped at a fault. Nothing executes after this.
    Faulted(Fault),
}

impl State {
    /// True once the machine has returned or faulted.
    pub fn is_halted(&self) -> bool {
        !matches!(self, State::Running)
    }
}

/// One interpreter session over a loaded program.
///
/// A session owns its call stack and heap; separate sessions never share
/// mutable state.
#[derive(Debug)]
pub struct Interpreter<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    pub(crate) config: VmConfig,
    /// Call stack, outermost frame first. Non-empty while `Running`.
    pub(crate) frames: Vec<Frame>,
    pub(crate) heap: ArrayHeap,
    pub(crate) state: State,
    /// Instructions executed so far.
    pub(crate) steps: u64,
}

impl<'a> Interpreter<'a> {
    /// Set up a session whose single frame is `entry` called with `args`.
    ///
    /// If `entry` cannot be entered the session starts out `Faulted`, with
    /// no location.
    pub fn new(program: &'a Program, entry: &str, args: &[i32], config: VmConfig) -> Self {
        let mut vm = Self {
            program,
            config,
            frames: Vec::new(),
            heap: ArrayHeap::new(config.max_heap_cells),
            state: State::Running,
            steps: 0,
        };

        match vm.resolve_call(entry, args.len()) {
            Ok(index) => {
                debug!("enter {entry}{args:?}");
                let local_count = program.methods()[index].local_count();
                vm.frames
                    .push(Frame::new(index, local_count, args, config.max_operand_stack));
            }
            Err(kind) => {
                debug!("cannot enter {entry}: {kind}");
                vm.state = State::Faulted(Fault::at_entry(kind));
            }
        }
        vm
    }

    /// Resolve `name` for a call with `argc` arguments, checking arity and
    /// call depth. Returns the callee's method index.
    pub(crate) fn resolve_call(&self, name: &str, argc: usize) -> Result<usize, FaultKind> {
        let index = self
            .program
            .resolve(name)
            .ok_or_else(|| FaultKind::UnknownMethod {
                name: name.to_string(),
            })?;
        let method = &self.program.methods()[index];

        if argc != method.arity() as usize {
            return Err(FaultKind::ArityMismatch {
                name: name.to_string(),
                expected: method.arity(),
                found: argc,
            });
        }
        if self.frames.len() >= self.config.max_call_depth {
            return Err(FaultKind::StackOverflow {
                limit: self.config.max_call_depth,
            });
        }
        Ok(index)
    }

    /// Run until the machine returns or faults.
    pub fn run(&mut self) -> Result<i32, Fault> {
        loop {
            match &self.state {
                State::Running => {
                    self.step();
                }
                State::Returned(value) => return Ok(*value),
                State::Faulted(fault) => return Err(fault.clone()),
            }
        }
    }

    /// Execute at most `budget` instructions. The returned state is still
    /// `Running` if the budget ran out first.
    pub fn run_for(&mut self, budget: u64) -> &State {
        let limit = self.steps.saturating_add(budget);
        while !self.state.is_halted() && self.steps < limit {
            self.step();
        }
        &self.state
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current call-stack depth.
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Call stack, outermost frame first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn heap(&self) -> &ArrayHeap {
        &self.heap
    }
}
