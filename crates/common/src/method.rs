//! Static method definitions.

use crate::error::LoadError;
use crate::instruction::Instruction;

/// A static method: a name, a parameter count, a local-slot count, and
/// its instruction sequence.
///
/// Construction runs the per-method load checks, so a `Method` value always
/// has a valid name, in-range branch targets, and ends in `RETURN` or `JUMP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    name: String,
    arity: u16,
    local_count: u16,
    code: Vec<Instruction>,
}

impl Method {
    /// Build a method, validating its structure.
    ///
    /// Parameters occupy local slots `0..arity`, so `local_count` must be at
    /// least `arity`.
    pub fn new(
        name: impl Into<String>,
        arity: u16,
        local_count: u16,
        code: Vec<Instruction>,
    ) -> Result<Self, LoadError> {
        let name = name.into();

        if !is_valid_name(&name) {
            return Err(LoadError::InvalidName {
                name: name.clone(),
                method: name,
            });
        }

        if arity > local_count {
            return Err(LoadError::ArityExceedsLocals {
                method: name,
                arity,
                local_count,
            });
        }

        let last = match code.last() {
            Some(last) => last,
            None => return Err(LoadError::EmptyMethod { method: name }),
        };
        if !last.opcode().is_terminator() {
            return Err(LoadError::FallsOffEnd {
                method: name,
                last: last.opcode().mnemonic(),
            });
        }

        for (at, instr) in code.iter().enumerate() {
            if let Instruction::InvokeStatic { method, .. } = instr {
                if !is_valid_name(method) {
                    return Err(LoadError::InvalidName {
                        method: name,
                        name: method.clone(),
                    });
                }
            }
            if let Some(target) = instr.branch_target() {
                if target as usize >= code.len() {
                    return Err(LoadError::BranchOutOfRange {
                        method: name,
                        at,
                        target,
                        len: code.len(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            arity,
            local_count,
            code,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parameters, bound to the leading local slots.
    pub fn arity(&self) -> u16 {
        self.arity
    }

    /// Number of local slots, parameters included.
    pub fn local_count(&self) -> u16 {
        self.local_count
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// Instruction at `pc`, if any.
    pub fn instruction(&self, pc: usize) -> Option<&Instruction> {
        self.code.get(pc)
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the method has no instructions.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Whether `name` reads back from assembly text as a single method name.
///
/// Rejects empty names, whitespace, `;`, a leading `.`, a trailing `:` and
/// anything that starts like a number (an ASCII digit, optionally after `-`).
pub fn is_valid_name(name: &str) -> bool {
    let digits = name.strip_prefix('-').unwrap_or(name);
    !name.is_empty()
        && !name.chars().any(|c| c.is_whitespace() || c == ';')
        && !name.starts_with('.')
        && !name.strip_suffix(':').is_some_and(|rest| !rest.is_empty())
        && !digits.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_method() {
        let m = Method::new(
            "square",
            1,
            1,
            vec![
                Instruction::LoadLocal(0),
                Instruction::LoadLocal(0),
                Instruction::Mul,
                Instruction::Return,
            ],
        )
        .unwrap();
        assert_eq!(m.name(), "square");
        assert_eq!(m.arity(), 1);
        assert_eq!(m.local_count(), 1);
        assert_eq!(m.len(), 4);
        assert_eq!(m.instruction(2), Some(&Instruction::Mul));
        assert_eq!(m.instruction(4), None);
    }

    #[test]
    fn empty_method_rejected() {
        assert_eq!(
            Method::new("f", 0, 0, vec![]),
            Err(LoadError::EmptyMethod {
                method: "f".to_string()
            })
        );
    }

    #[test]
    fn arity_exceeding_locals_rejected() {
        assert!(matches!(
            Method::new("f", 2, 1, vec![Instruction::Return]),
            Err(LoadError::ArityExceedsLocals {
                arity: 2,
                local_count: 1,
                ..
            })
        ));
    }

    #[test]
    fn branch_past_end_rejected() {
        let err = Method::new(
            "f",
            0,
            0,
            vec![
                Instruction::PushConst(0),
                Instruction::JumpIfFalse(3),
                Instruction::PushConst(1),
                Instruction::Return,
                Instruction::Jump(7),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::BranchOutOfRange {
                method: "f".to_string(),
                at: 4,
                target: 7,
                len: 5,
            }
        );
    }

    #[test]
    fn fall_through_rejected() {
        let err = Method::new("f", 0, 0, vec![Instruction::PushConst(1)]).unwrap_err();
        assert_eq!(
            err,
            LoadError::FallsOffEnd {
                method: "f".to_string(),
                last: "PUSH_CONST",
            }
        );
    }

    #[test]
    fn names_must_read_back_as_identifiers() {
        for name in ["square", "sumToN", "_tmp", "a.b", "x-1", "-x", ":"] {
            assert!(is_valid_name(name), "{name:?}");
        }
        for name in ["", "loop:", "a;b", ".x", "12", "-3", "two words", "tab\t"] {
            assert!(!is_valid_name(name), "{name:?}");
        }
    }

    #[test]
    fn invalid_method_name_rejected() {
        assert_eq!(
            Method::new("loop:", 0, 0, vec![Instruction::Return]),
            Err(LoadError::InvalidName {
                method: "loop:".to_string(),
                name: "loop:".to_string(),
            })
        );
        assert!(Method::new("", 0, 0, vec![Instruction::Return]).is_err());
    }

    #[test]
    fn invalid_callee_name_rejected() {
        let err = Method::new(
            "main",
            0,
            0,
            vec![Instruction::invoke("12", 0), Instruction::Return],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::InvalidName {
                method: "main".to_string(),
                name: "12".to_string(),
            }
        );
    }

    #[test]
    fn trailing_jump_is_a_terminator() {
        let m = Method::new(
            "spin",
            0,
            0,
            vec![Instruction::PushConst(1), Instruction::Pop, Instruction::Jump(0)],
        );
        assert!(m.is_ok());
    }
}
