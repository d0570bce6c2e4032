//! Runtime faults for the TinyVM interpreter.
//!
//! A fault halts the interpreter immediately. Every fault raised by an
//! instruction records where it happened (method name and instruction
//! index) so the condition can be reproduced.

use std::fmt;

use thiserror::Error;

/// The kind of condition that halted execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultKind {
    /// Pop on an empty operand stack.
    #[error("operand stack underflow")]
    StackUnderflow,

    /// Call-stack depth exceeded the configured maximum.
    #[error("call stack overflow (max depth {limit})")]
    StackOverflow { limit: usize },

    /// A frame's operand stack exceeded the configured maximum.
    #[error("operand stack overflow (max depth {limit})")]
    OperandStackOverflow { limit: usize },

    /// Local slot index outside the method's declared range.
    #[error("local slot {slot} out of range ({local_count} slot(s))")]
    InvalidSlot { slot: u16, local_count: u16 },

    /// No method with this name exists in the program.
    #[error("unknown method '{name}'")]
    UnknownMethod { name: String },

    /// The argument count disagrees with the method's arity.
    #[error("method '{name}' takes {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: u16,
        found: usize,
    },

    /// NEW_ARRAY with a negative length.
    #[error("negative array size {length}")]
    NegativeArraySize { length: i32 },

    /// Array index outside `0..length`.
    #[error("array index {index} out of bounds (length {length})")]
    IndexOutOfBounds { index: i32, length: usize },

    /// The value used as an array reference does not denote a live array.
    #[error("null or dangling array reference {reference}")]
    NullReference { reference: i32 },

    /// DIV or REM with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// An allocation would exceed the configured heap size.
    #[error("heap exhausted: {requested} more cell(s) exceeds limit {limit}")]
    HeapExhausted { requested: usize, limit: usize },
}

impl FaultKind {
    /// Every value [`FaultKind::name`] can return.
    pub const NAMES: [&'static str; 11] = [
        "StackUnderflow",
        "StackOverflow",
        "OperandStackOverflow",
        "InvalidSlot",
        "UnknownMethod",
        "ArityMismatch",
        "NegativeArraySize",
        "IndexOutOfBounds",
        "NullReference",
        "DivisionByZero",
        "HeapExhausted",
    ];

    /// Stable identifier for this kind, as used in fixture expectations.
    pub fn name(&self) -> &'static str {
        match self {
            FaultKind::StackUnderflow => "StackUnderflow",
            FaultKind::StackOverflow { .. } => "StackOverflow",
            FaultKind::OperandStackOverflow { .. } => "OperandStackOverflow",
            FaultKind::InvalidSlot { .. } => "InvalidSlot",
            FaultKind::UnknownMethod { .. } => "UnknownMethod",
            FaultKind::ArityMismatch { .. } => "ArityMismatch",
            FaultKind::NegativeArraySize { .. } => "NegativeArraySize",
            FaultKind::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            FaultKind::NullReference { .. } => "NullReference",
            FaultKind::DivisionByZero => "DivisionByZero",
            FaultKind::HeapExhausted { .. } => "HeapExhausted",
        }
    }
}

/// The instruction that raised a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub method: String,
    pub pc: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' instruction {}", self.method, self.pc)
    }
}

/// A terminal runtime error: its kind and, unless the entry method itself
/// could not be entered, the failing instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{}", location_suffix(.location))]
pub struct Fault {
    pub kind: FaultKind,
    pub location: Option<Location>,
}

impl Fault {
    pub fn at(kind: FaultKind, method: impl Into<String>, pc: usize) -> Self {
        Self {
            kind,
            location: Some(Location {
                method: method.into(),
                pc,
            }),
        }
    }

    /// A fault raised while setting up the entry frame.
    pub fn at_entry(kind: FaultKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }
}

fn location_suffix(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" at {loc}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cover_every_kind() {
        let kinds = [
            FaultKind::StackUnderflow,
            FaultKind::StackOverflow { limit: 1 },
            FaultKind::OperandStackOverflow { limit: 1 },
            FaultKind::InvalidSlot {
                slot: 0,
                local_count: 0,
            },
            FaultKind::UnknownMethod {
                name: String::new(),
            },
            FaultKind::ArityMismatch {
                name: String::new(),
                expected: 0,
                found: 1,
            },
            FaultKind::NegativeArraySize { length: -1 },
            FaultKind::IndexOutOfBounds {
                index: 0,
                length: 0,
            },
            FaultKind::NullReference { reference: 0 },
            FaultKind::DivisionByZero,
            FaultKind::HeapExhausted {
                requested: 1,
                limit: 0,
            },
        ];
        let names: Vec<_> = kinds.iter().map(FaultKind::name).collect();
        assert_eq!(names, FaultKind::NAMES);
    }

    #[test]
    fn fault_display_with_location() {
        let fault = Fault::at(
            FaultKind::IndexOutOfBounds {
                index: 5,
                length: 5,
            },
            "outOfBounds",
            7,
        );
        assert_eq!(
            fault.to_string(),
            "array index 5 out of bounds (length 5) at 'outOfBounds' instruction 7"
        );
    }

    #[test]
    fn fault_display_without_location() {
        let fault = Fault::at_entry(FaultKind::UnknownMethod {
            name: "nope".to_string(),
        });
        assert_eq!(fault.to_string(), "unknown method 'nope'");
    }

    #[test]
    fn kind_display_formats() {
        assert_eq!(
            FaultKind::StackOverflow { limit: 16 }.to_string(),
            "call stack overflow (max depth 16)"
        );
        assert_eq!(
            FaultKind::ArityMismatch {
                name: "fib".to_string(),
                expected: 1,
                found: 2
            }
            .to_string(),
            "method 'fib' takes 1 argument(s), got 2"
        );
        assert_eq!(
            FaultKind::InvalidSlot {
                slot: 3,
                local_count: 2
            }
            .to_string(),
            "local slot 3 out of range (2 slot(s))"
        );
    }

    #[test]
    fn kind_names_are_variant_names() {
        assert_eq!(FaultKind::StackUnderflow.name(), "StackUnderflow");
        assert_eq!(
            FaultKind::NullReference { reference: 0 }.name(),
            "NullReference"
        );
        assert_eq!(
            FaultKind::NegativeArraySize { length: -1 }.name(),
            "NegativeArraySize"
        );
    }
}
