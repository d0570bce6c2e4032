//! Fetch-decode-execute loop and opcode dispatch.

use log::{debug, trace};
use tinyvm_common::{Instruction, Method};

use crate::error::{Fault, FaultKind};
use crate::frame::Frame;
use crate::machine::{Interpreter, State};

impl<'a> Interpreter<'a> {
    /// Execute one instruction of the active frame.
    ///
    /// Once the machine has halted this does nothing and returns the final
    /// state.
    pub fn step(&mut self) -> &State {
        if self.state.is_halted() {
            return &self.state;
        }

        let program = self.program;
        let (method_index, pc) = self
            .frames
            .last()
            .map(|frame| (frame.method(), frame.pc()))
            .expect("call stack is non-empty while running");
        let method: &'a Method = &program.methods()[method_index];
        let instr = method
            .instruction(pc)
            .expect("load checks keep pc inside the method");

        trace!("{}@{pc}: {instr}", method.name());
        self.steps += 1;

        match self.execute(instr) {
            Ok(None) => {}
            Ok(Some(value)) => {
                debug!("returned {value} after {} step(s)", self.steps);
                self.state = State::Returned(value);
            }
            Err(kind) => {
                let fault = Fault::at(kind, method.name(), pc);
                debug!("fault: {fault}");
                self.state = State::Faulted(fault);
            }
        }
        &self.state
    }

    /// Execute `instr` against the active frame. Returns the program result
    /// when the outermost frame returns.
    fn execute(&mut self, instr: &'a Instruction) -> Result<Option<i32>, FaultKind> {
        let frame = top(&mut self.frames);

        match instr {
            Instruction::PushConst(value) => frame.push(*value)?,
            Instruction::LoadLocal(slot) => {
                let value = frame.load_local(*slot)?;
                frame.push(value)?;
            }
            Instruction::StoreLocal(slot) => {
                let value = frame.pop()?;
                frame.store_local(*slot, value)?;
            }
            Instruction::Dup => {
                let value = frame.peek()?;
                frame.push(value)?;
            }
            Instruction::Pop => {
                frame.pop()?;
            }

            Instruction::Add => binary(frame, |a, b| Ok(a.wrapping_add(b)))?,
            Instruction::Sub => binary(frame, |a, b| Ok(a.wrapping_sub(b)))?,
            Instruction::Mul => binary(frame, |a, b| Ok(a.wrapping_mul(b)))?,
            Instruction::Div => binary(frame, |a, b| match b {
                0 => Err(FaultKind::DivisionByZero),
                _ => Ok(a.wrapping_div(b)),
            })?,
            Instruction::Rem => binary(frame, |a, b| match b {
                0 => Err(FaultKind::DivisionByZero),
                _ => Ok(a.wrapping_rem(b)),
            })?,
            Instruction::Neg => {
                let a = frame.pop()?;
                frame.push(a.wrapping_neg())?;
            }

            Instruction::CmpEq => binary(frame, |a, b| Ok(flag(a == b)))?,
            Instruction::CmpNe => binary(frame, |a, b| Ok(flag(a != b)))?,
            Instruction::CmpLt => binary(frame, |a, b| Ok(flag(a < b)))?,
            Instruction::CmpLe => binary(frame, |a, b| Ok(flag(a <= b)))?,
            Instruction::CmpGt => binary(frame, |a, b| Ok(flag(a > b)))?,
            Instruction::CmpGe => binary(frame, |a, b| Ok(flag(a >= b)))?,

            Instruction::Jump(target) => {
                frame.jump(*target);
                return Ok(None);
            }
            Instruction::JumpIfFalse(target) => {
                if frame.pop()? == 0 {
                    frame.jump(*target);
                    return Ok(None);
                }
            }

            Instruction::NewArray => {
                let length = frame.pop()?;
                let reference = self.heap.allocate(length)?;
                frame.push(reference)?;
            }
            Instruction::ArrayLoad => {
                let index = frame.pop()?;
                let reference = frame.pop()?;
                let value = self.heap.load(reference, index)?;
                frame.push(value)?;
            }
            Instruction::ArrayStore => {
                let value = frame.pop()?;
                let index = frame.pop()?;
                let reference = frame.pop()?;
                self.heap.store(reference, index, value)?;
            }
            Instruction::ArrayLength => {
                let reference = frame.pop()?;
                let length = self.heap.length(reference)?;
                frame.push(length)?;
            }

            Instruction::InvokeStatic { method, argc } => {
                self.invoke(method, *argc)?;
                return Ok(None);
            }
            Instruction::Return => return self.ret(),
        }

        top(&mut self.frames).advance();
        Ok(None)
    }

    /// Push a frame for `name`, taking `argc` arguments from the caller.
    fn invoke(&mut self, name: &str, argc: u16) -> Result<(), FaultKind> {
        let index = self.resolve_call(name, argc as usize)?;

        let caller = top(&mut self.frames);
        let args = caller.pop_args(argc as usize)?;
        caller.advance();

        let method = &self.program.methods()[index];
        debug!("invoke {name}{args:?} at depth {}", self.frames.len() + 1);
        self.frames.push(Frame::new(
            index,
            method.local_count(),
            &args,
            self.config.max_operand_stack,
        ));
        Ok(())
    }

    /// Pop the active frame and hand its return value to the caller.
    fn ret(&mut self) -> Result<Option<i32>, FaultKind> {
        let value = top(&mut self.frames).pop()?;
        self.frames.pop();
        let depth = self.frames.len();
        match self.frames.last_mut() {
            Some(caller) => {
                trace!("return {value} to depth {depth}");
                caller.push(value)?;
                Ok(None)
            }
            None => Ok(Some(value)),
        }
    }
}

/// The active frame. Only called while `Running`, when the call stack is
/// non-empty.
fn top(frames: &mut [Frame]) -> &mut Frame {
    frames
        .last_mut()
        .expect("call stack is non-empty while running")
}

/// Pop b, pop a, push `op(a, b)`.
fn binary(
    frame: &mut Frame,
    op: impl FnOnce(i32, i32) -> Result<i32, FaultKind>,
) -> Result<(), FaultKind> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    frame.push(op(a, b)?)
}

fn flag(b: bool) -> i32 {
    b as i32
}
