//! Call frames: one activation record per method call.

use crate::error::FaultKind;

/// One activation of a method: its program counter, operand stack, and
/// local slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    method: usize,
    pc: usize,
    locals: Vec<i32>,
    stack: Vec<i32>,
    max_stack: usize,
}

impl Frame {
    /// Create a frame for the method at `method` with `local_count` zeroed
    /// slots, the leading ones bound to `args`.
    ///
    /// Callers check arity first; `args.len()` never exceeds `local_count`
    /// for a loaded method.
    pub fn new(method: usize, local_count: u16, args: &[i32], max_stack: usize) -> Self {
        let mut locals = vec![0; local_count as usize];
        locals[..args.len()].copy_from_slice(args);
        Self {
            method,
            pc: 0,
            locals,
            stack: Vec::new(),
            max_stack,
        }
    }

    /// Index of the executing method in the program's method table.
    pub fn method(&self) -> usize {
        self.method
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn locals(&self) -> &[i32] {
        &self.locals
    }

    /// Operand stack, bottom first.
    pub fn stack(&self) -> &[i32] {
        &self.stack
    }

    pub fn push(&mut self, value: i32) -> Result<(), FaultKind> {
        if self.stack.len() >= self.max_stack {
            return Err(FaultKind::OperandStackOverflow {
                limit: self.max_stack,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<i32, FaultKind> {
        self.stack.pop().ok_or(FaultKind::StackUnderflow)
    }

    pub fn peek(&self) -> Result<i32, FaultKind> {
        self.stack.last().copied().ok_or(FaultKind::StackUnderflow)
    }

    /// Pop the top `count` values, returned in push order.
    pub fn pop_args(&mut self, count: usize) -> Result<Vec<i32>, FaultKind> {
        if self.stack.len() < count {
            return Err(FaultKind::StackUnderflow);
        }
        let split = self.stack.len() - count;
        Ok(self.stack.split_off(split))
    }

    pub fn load_local(&self, slot: u16) -> Result<i32, FaultKind> {
        self.locals
            .get(slot as usize)
            .copied()
            .ok_or_else(|| self.invalid_slot(slot))
    }

    pub fn store_local(&mut self, slot: u16, value: i32) -> Result<(), FaultKind> {
        let err = self.invalid_slot(slot);
        let cell = self.locals.get_mut(slot as usize).ok_or(err)?;
        *cell = value;
        Ok(())
    }

    /// Move to the next instruction.
    pub(crate) fn advance(&mut self) {
        self.pc += 1;
    }

    /// Move to an absolute instruction index (validated at load time).
    pub(crate) fn jump(&mut self, target: u32) {
        self.pc = target as usize;
    }

    fn invalid_slot(&self, slot: u16) -> FaultKind {
        FaultKind::InvalidSlot {
            slot,
            local_count: self.locals.len() as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_bind_leading_slots() {
        let frame = Frame::new(0, 4, &[7, 8], 16);
        assert_eq!(frame.locals(), &[7, 8, 0, 0]);
        assert_eq!(frame.pc(), 0);
        assert!(frame.stack().is_empty());
    }

    #[test]
    fn push_pop_lifo() {
        let mut frame = Frame::new(0, 0, &[], 16);
        frame.push(1).unwrap();
        frame.push(2).unwrap();
        assert_eq!(frame.peek(), Ok(2));
        assert_eq!(frame.pop(), Ok(2));
        assert_eq!(frame.pop(), Ok(1));
        assert_eq!(frame.pop(), Err(FaultKind::StackUnderflow));
        assert_eq!(frame.peek(), Err(FaultKind::StackUnderflow));
    }

    #[test]
    fn push_respects_limit() {
        let mut frame = Frame::new(0, 0, &[], 2);
        frame.push(1).unwrap();
        frame.push(2).unwrap();
        assert_eq!(
            frame.push(3),
            Err(FaultKind::OperandStackOverflow { limit: 2 })
        );
        assert_eq!(frame.stack(), &[1, 2]);
    }

    #[test]
    fn pop_args_keeps_push_order() {
        let mut frame = Frame::new(0, 0, &[], 16);
        for v in [1, 2, 3, 4] {
            frame.push(v).unwrap();
        }
        assert_eq!(frame.pop_args(3), Ok(vec![2, 3, 4]));
        assert_eq!(frame.stack(), &[1]);
        assert_eq!(frame.pop_args(2), Err(FaultKind::StackUnderflow));
        assert_eq!(frame.stack(), &[1]);
        assert_eq!(frame.pop_args(0), Ok(vec![]));
    }

    #[test]
    fn locals_bounds_checked() {
        let mut frame = Frame::new(0, 2, &[], 16);
        frame.store_local(1, 42).unwrap();
        assert_eq!(frame.load_local(1), Ok(42));
        let err = FaultKind::InvalidSlot {
            slot: 2,
            local_count: 2,
        };
        assert_eq!(frame.load_local(2), Err(err.clone()));
        assert_eq!(frame.store_local(2, 0), Err(err));
    }

    #[test]
    fn advance_and_jump() {
        let mut frame = Frame::new(0, 0, &[], 16);
        frame.advance();
        frame.advance();
        assert_eq!(frame.pc(), 2);
        frame.jump(0);
        assert_eq!(frame.pc(), 0);
    }
}
