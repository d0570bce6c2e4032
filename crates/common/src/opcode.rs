//! Opcode definitions for the TinyVM instruction set.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The `#[repr(u8)]` attribute gives each variant the stable byte value
/// used by the binary encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Constants, locals & stack shuffling
    /// Push a 32-bit signed constant.
    PushConst = 0x01,
    /// Push the value of local slot `a`.
    LoadLocal = 0x02,
    /// Pop one value into local slot `a`.
    StoreLocal = 0x03,
    /// Push a copy of the top value.
    Dup = 0x04,
    /// Discard the top value.
    Pop = 0x05,

    // Arithmetic
    /// Pop b, pop a, push a + b (wrapping).
    Add = 0x10,
    /// Pop b, pop a, push a - b (wrapping).
    Sub = 0x11,
    /// Pop b, pop a, push a * b (wrapping).
    Mul = 0x12,
    /// Pop b, pop a, push a / b. Division by zero is a fault.
    Div = 0x13,
    /// Pop b, pop a, push a % b. Division by zero is a fault.
    Rem = 0x14,
    /// Pop a, push -a (wrapping).
    Neg = 0x15,

    // Comparison (push 1 for true, 0 for false)
    /// a == b
    CmpEq = 0x20,
    /// a != b
    CmpNe = 0x21,
    /// a < b
    CmpLt = 0x22,
    /// a <= b
    CmpLe = 0x23,
    /// a > b
    CmpGt = 0x24,
    /// a >= b
    CmpGe = 0x25,

    // Control flow
    /// Unconditional branch to an absolute instruction index.
    Jump = 0x30,
    /// Pop one value, branch when it equals 0.
    JumpIfFalse = 0x31,

    // Arrays
    /// Pop length, push a reference to a fresh zeroed array.
    NewArray = 0x40,
    /// Pop index, pop reference, push element.
    ArrayLoad = 0x41,
    /// Pop value, pop index, pop reference, store element.
    ArrayStore = 0x42,
    /// Pop reference, push the array length.
    ArrayLength = 0x43,

    // Invocation
    /// Call a static method by name with `argc` arguments.
    InvokeStatic = 0x50,
    /// Return the top of stack to the caller.
    Return = 0x51,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 25] = [
    Opcode::PushConst,
    Opcode::LoadLocal,
    Opcode::StoreLocal,
    Opcode::Dup,
    Opcode::Pop,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Rem,
    Opcode::Neg,
    Opcode::CmpEq,
    Opcode::CmpNe,
    Opcode::CmpLt,
    Opcode::CmpLe,
    Opcode::CmpGt,
    Opcode::CmpGe,
    Opcode::Jump,
    Opcode::JumpIfFalse,
    Opcode::NewArray,
    Opcode::ArrayLoad,
    Opcode::ArrayStore,
    Opcode::ArrayLength,
    Opcode::InvokeStatic,
    Opcode::Return,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Err(DecodeError::IllegalOpcode),

            0x01 => Ok(Opcode::PushConst),
            0x02 => Ok(Opcode::LoadLocal),
            0x03 => Ok(Opcode::StoreLocal),
            0x04 => Ok(Opcode::Dup),
            0x05 => Ok(Opcode::Pop),

            0x10 => Ok(Opcode::Add),
            0x11 => Ok(Opcode::Sub),
            0x12 => Ok(Opcode::Mul),
            0x13 => Ok(Opcode::Div),
            0x14 => Ok(Opcode::Rem),
            0x15 => Ok(Opcode::Neg),

            0x20 => Ok(Opcode::CmpEq),
            0x21 => Ok(Opcode::CmpNe),
            0x22 => Ok(Opcode::CmpLt),
            0x23 => Ok(Opcode::CmpLe),
            0x24 => Ok(Opcode::CmpGt),
            0x25 => Ok(Opcode::CmpGe),

            0x30 => Ok(Opcode::Jump),
            0x31 => Ok(Opcode::JumpIfFalse),

            0x40 => Ok(Opcode::NewArray),
            0x41 => Ok(Opcode::ArrayLoad),
            0x42 => Ok(Opcode::ArrayStore),
            0x43 => Ok(Opcode::ArrayLength),

            0x50 => Ok(Opcode::InvokeStatic),
            0x51 => Ok(Opcode::Return),

            _ => Err(DecodeError::InvalidOpcode(value)),
        }
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::PushConst => "PUSH_CONST",
            Opcode::LoadLocal => "LOAD_LOCAL",
            Opcode::StoreLocal => "STORE_LOCAL",
            Opcode::Dup => "DUP",
            Opcode::Pop => "POP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Rem => "REM",
            Opcode::Neg => "NEG",
            Opcode::CmpEq => "CMP_EQ",
            Opcode::CmpNe => "CMP_NE",
            Opcode::CmpLt => "CMP_LT",
            Opcode::CmpLe => "CMP_LE",
            Opcode::CmpGt => "CMP_GT",
            Opcode::CmpGe => "CMP_GE",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfFalse => "JUMP_IF_FALSE",
            Opcode::NewArray => "NEW_ARRAY",
            Opcode::ArrayLoad => "ARRAY_LOAD",
            Opcode::ArrayStore => "ARRAY_STORE",
            Opcode::ArrayLength => "ARRAY_LENGTH",
            Opcode::InvokeStatic => "INVOKE_STATIC",
            Opcode::Return => "RETURN",
        }
    }

    /// Look up an opcode by its mnemonic. The comparison is exact; callers
    /// normalize case first.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// True for opcodes that end straight-line execution within a method.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Opcode::Jump | Opcode::Return)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
