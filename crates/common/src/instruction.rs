//! Instructions and their fixed-width binary encoding.
//!
//! Every instruction is exactly 64 bits (8 bytes), encoded little-endian:
//! ```text
//! Byte 0:    opcode (u8)
//! Byte 1:    reserved, always 0
//! Bytes 2-3: a (u16): local slot, or argc for INVOKE_STATIC
//! Bytes 4-7: b (u32): constant bits, branch target, or name-table index
//! ```
//!
//! `INVOKE_STATIC` carries its method by name. In the binary form the name
//! lives in the module's name table and `b` holds its index.

use std::collections::HashMap;

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// Size of one encoded instruction in bytes.
pub const INSTRUCTION_SIZE: usize = 8;

/// A single decoded instruction with its immediate operands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    PushConst(i32),
    LoadLocal(u16),
    StoreLocal(u16),
    Dup,
    Pop,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    CmpEq,
    CmpNe,
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,
    /// Branch to an absolute instruction index in the current method.
    Jump(u32),
    /// Pop; branch to an absolute instruction index when the value is 0.
    JumpIfFalse(u32),
    NewArray,
    ArrayLoad,
    ArrayStore,
    ArrayLength,
    InvokeStatic {
        method: String,
        argc: u16,
    },
    Return,
}

impl Instruction {
    /// Shorthand for an `INVOKE_STATIC`.
    pub fn invoke(method: impl Into<String>, argc: u16) -> Self {
        Instruction::InvokeStatic {
            method: method.into(),
            argc,
        }
    }

    /// The opcode tag of this instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::PushConst(_) => Opcode::PushConst,
            Instruction::LoadLocal(_) => Opcode::LoadLocal,
            Instruction::StoreLocal(_) => Opcode::StoreLocal,
            Instruction::Dup => Opcode::Dup,
            Instruction::Pop => Opcode::Pop,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Rem => Opcode::Rem,
            Instruction::Neg => Opcode::Neg,
            Instruction::CmpEq => Opcode::CmpEq,
            Instruction::CmpNe => Opcode::CmpNe,
            Instruction::CmpLt => Opcode::CmpLt,
            Instruction::CmpLe => Opcode::CmpLe,
            Instruction::CmpGt => Opcode::CmpGt,
            Instruction::CmpGe => Opcode::CmpGe,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIfFalse(_) => Opcode::JumpIfFalse,
            Instruction::NewArray => Opcode::NewArray,
            Instruction::ArrayLoad => Opcode::ArrayLoad,
            Instruction::ArrayStore => Opcode::ArrayStore,
            Instruction::ArrayLength => Opcode::ArrayLength,
            Instruction::InvokeStatic { .. } => Opcode::InvokeStatic,
            Instruction::Return => Opcode::Return,
        }
    }

    /// The branch target, for `JUMP` and `JUMP_IF_FALSE`.
    pub fn branch_target(&self) -> Option<u32> {
        match self {
            Instruction::Jump(t) | Instruction::JumpIfFalse(t) => Some(*t),
            _ => None,
        }
    }

    /// Encode this instruction to 8 bytes, interning any method name.
    pub fn encode(&self, names: &mut NameTable) -> [u8; INSTRUCTION_SIZE] {
        let (a, b): (u16, u32) = match self {
            Instruction::PushConst(v) => (0, *v as u32),
            Instruction::LoadLocal(slot) | Instruction::StoreLocal(slot) => (*slot, 0),
            Instruction::Jump(t) | Instruction::JumpIfFalse(t) => (0, *t),
            Instruction::InvokeStatic { method, argc } => (*argc, names.intern(method)),
            _ => (0, 0),
        };

        let mut bytes = [0u8; INSTRUCTION_SIZE];
        bytes[0] = self.opcode() as u8;
        bytes[2..4].copy_from_slice(&a.to_le_bytes());
        bytes[4..8].copy_from_slice(&b.to_le_bytes());
        bytes
    }

    /// Decode 8 bytes into an instruction, resolving names against `names`.
    pub fn decode(bytes: [u8; INSTRUCTION_SIZE], names: &[String]) -> Result<Self, DecodeError> {
        let opcode = Opcode::try_from(bytes[0])?;
        if bytes[1] != 0 {
            return Err(DecodeError::ReservedByte(bytes[1]));
        }
        let a = u16::from_le_bytes([bytes[2], bytes[3]]);
        let b = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        let instr = match opcode {
            Opcode::PushConst => Instruction::PushConst(b as i32),
            Opcode::LoadLocal => Instruction::LoadLocal(a),
            Opcode::StoreLocal => Instruction::StoreLocal(a),
            Opcode::Dup => Instruction::Dup,
            Opcode::Pop => Instruction::Pop,
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::Div => Instruction::Div,
            Opcode::Rem => Instruction::Rem,
            Opcode::Neg => Instruction::Neg,
            Opcode::CmpEq => Instruction::CmpEq,
            Opcode::CmpNe => Instruction::CmpNe,
            Opcode::CmpLt => Instruction::CmpLt,
            Opcode::CmpLe => Instruction::CmpLe,
            Opcode::CmpGt => Instruction::CmpGt,
            Opcode::CmpGe => Instruction::CmpGe,
            Opcode::Jump => Instruction::Jump(b),
            Opcode::JumpIfFalse => Instruction::JumpIfFalse(b),
            Opcode::NewArray => Instruction::NewArray,
            Opcode::ArrayLoad => Instruction::ArrayLoad,
            Opcode::ArrayStore => Instruction::ArrayStore,
            Opcode::ArrayLength => Instruction::ArrayLength,
            Opcode::InvokeStatic => {
                let index = b as usize;
                let method = names
                    .get(index)
                    .ok_or(DecodeError::NameIndexOutOfRange {
                        index,
                        count: names.len(),
                    })?
                    .clone();
                Instruction::InvokeStatic { method, argc: a }
            }
            Opcode::Return => Instruction::Return,
        };
        Ok(instr)
    }
}

impl std::fmt::Display for Instruction {
    /// Canonical assembly form, with numeric branch targets.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.opcode().mnemonic();
        match self {
            Instruction::PushConst(v) => write!(f, "{m} {v}"),
            Instruction::LoadLocal(s) | Instruction::StoreLocal(s) => write!(f, "{m} {s}"),
            Instruction::Jump(t) | Instruction::JumpIfFalse(t) => write!(f, "{m} {t}"),
            Instruction::InvokeStatic { method, argc } => write!(f, "{m} {method} {argc}"),
            _ => f.write_str(m),
        }
    }
}

/// Interned method names, shared by every instruction in a module.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `name`, adding it if it is new.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), i);
        i
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(instr: Instruction) -> Instruction {
        let mut names = NameTable::new();
        let bytes = instr.encode(&mut names);
        Instruction::decode(bytes, names.names()).unwrap()
    }

    #[test]
    fn simple_opcodes_roundtrip() {
        for instr in [
            Instruction::Add,
            Instruction::CmpGe,
            Instruction::ArrayStore,
            Instruction::Return,
        ] {
            assert_eq!(roundtrip(instr.clone()), instr);
        }
    }

    #[test]
    fn negative_constant_roundtrip() {
        assert_eq!(roundtrip(Instruction::PushConst(-13)), Instruction::PushConst(-13));
        assert_eq!(
            roundtrip(Instruction::PushConst(i32::MIN)),
            Instruction::PushConst(i32::MIN)
        );
    }

    #[test]
    fn little_endian_layout() {
        let mut names = NameTable::new();
        let bytes = Instruction::PushConst(0x1234_5678).encode(&mut names);
        assert_eq!(bytes, [0x01, 0x00, 0x00, 0x00, 0x78, 0x56, 0x34, 0x12]);

        let bytes = Instruction::StoreLocal(0x0102).encode(&mut names);
        assert_eq!(bytes, [0x03, 0x00, 0x02, 0x01, 0, 0, 0, 0]);
    }

    #[test]
    fn invoke_interns_names() {
        let mut names = NameTable::new();
        let a = Instruction::invoke("square", 1).encode(&mut names);
        let b = Instruction::invoke("sumToN", 1).encode(&mut names);
        let c = Instruction::invoke("square", 1).encode(&mut names);
        assert_eq!(names.names(), ["square".to_string(), "sumToN".to_string()]);
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(&a[2..4], &[1, 0]);
    }

    #[test]
    fn decode_rejects_reserved_byte() {
        let bytes = [0x10, 0x01, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            Instruction::decode(bytes, &[]),
            Err(DecodeError::ReservedByte(0x01))
        );
    }

    #[test]
    fn decode_rejects_missing_name() {
        let bytes = [0x50, 0x00, 0, 0, 3, 0, 0, 0];
        assert_eq!(
            Instruction::decode(bytes, &["main".to_string()]),
            Err(DecodeError::NameIndexOutOfRange { index: 3, count: 1 })
        );
    }

    #[test]
    fn decode_rejects_illegal_opcode() {
        assert_eq!(
            Instruction::decode([0; 8], &[]),
            Err(DecodeError::IllegalOpcode)
        );
    }

    #[test]
    fn display_is_canonical_assembly() {
        assert_eq!(Instruction::PushConst(-5).to_string(), "PUSH_CONST -5");
        assert_eq!(Instruction::JumpIfFalse(12).to_string(), "JUMP_IF_FALSE 12");
        assert_eq!(Instruction::invoke("fib", 1).to_string(), "INVOKE_STATIC fib 1");
        assert_eq!(Instruction::ArrayLength.to_string(), "ARRAY_LENGTH");
    }

    #[test]
    fn branch_target_only_for_branches() {
        assert_eq!(Instruction::Jump(4).branch_target(), Some(4));
        assert_eq!(Instruction::JumpIfFalse(0).branch_target(), Some(0));
        assert_eq!(Instruction::LoadLocal(4).branch_target(), None);
    }
}
