//! Resource limits for an interpreter session.

/// Default maximum number of frames on the call stack.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Default maximum operand-stack depth of a single frame.
pub const DEFAULT_MAX_OPERAND_STACK: usize = 4096;

/// Default maximum number of array elements live on the heap at once.
pub const DEFAULT_MAX_HEAP_CELLS: usize = 1 << 24;

/// Limits applied to one interpreter session. Exceeding any of them is a
/// deterministic fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Call-stack depth limit; exceeding it faults with `StackOverflow`.
    pub max_call_depth: usize,
    /// Per-frame operand-stack limit; exceeding it faults with
    /// `OperandStackOverflow`.
    pub max_operand_stack: usize,
    /// Total array cells the heap may hold; exceeding it faults with
    /// `HeapExhausted`.
    pub max_heap_cells: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_operand_stack: DEFAULT_MAX_OPERAND_STACK,
            max_heap_cells: DEFAULT_MAX_HEAP_CELLS,
        }
    }
}

impl VmConfig {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_operand_stack(mut self, depth: usize) -> Self {
        self.max_operand_stack = depth;
        self
    }

    pub fn with_max_heap_cells(mut self, cells: usize) -> Self {
        self.max_heap_cells = cells;
        self
    }
}
