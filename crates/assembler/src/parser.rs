//! Parser for TinyVM assembly tokens → directives and instructions.
//!
//! Works one line at a time. Branch labels are left unresolved here; the
//! method builder in `lib.rs` patches them once the method body is complete.

use crate::error::AsmError;
use crate::lexer::Token;
use tinyvm_common::{Instruction, Opcode};

/// A branch operand: absolute instruction index or method-local label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Index(u32),
    Label(String),
}

/// An instruction whose branch target may still be a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pending {
    Ready(Instruction),
    Branch { opcode: Opcode, target: Target },
}

/// What a line contributes besides an optional label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    /// `.method <name> <arity> <local_count>`
    Method {
        name: String,
        arity: u16,
        local_count: u16,
    },
    /// `.end`
    End,
    Instr(Pending),
}

/// One parsed line: `[label:] [item]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Line {
    pub label: Option<String>,
    pub item: Option<Item>,
}

/// Parse the tokens of a single line.
///
/// Blank lines parse to an empty [`Line`].
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Line, AsmError> {
    let (label, rest) = match tokens.split_first() {
        Some((Token::Label(name), rest)) => (Some(name.clone()), rest),
        _ => (None, tokens),
    };

    let item = match rest.split_first() {
        None => None,
        Some((Token::Directive(name), args)) => Some(parse_directive(name, args, line_num)?),
        Some((Token::Ident(mnemonic), args)) => {
            Some(Item::Instr(parse_instruction(mnemonic, args, line_num)?))
        }
        Some((token, _)) => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: token.text(),
            })
        }
    };

    Ok(Line { label, item })
}

fn parse_directive(name: &str, args: &[Token], line_num: usize) -> Result<Item, AsmError> {
    match name {
        "method" => {
            let name = expect_name(args, 0, line_num, ".method", 3)?;
            let arity = expect_u16(args, 1, line_num, ".method", 3)?;
            let local_count = expect_u16(args, 2, line_num, ".method", 3)?;
            expect_end(&args[3..], line_num)?;
            Ok(Item::Method {
                name,
                arity,
                local_count,
            })
        }
        "end" => {
            expect_end(args, line_num)?;
            Ok(Item::End)
        }
        _ => Err(AsmError::UnknownOpcode {
            line: line_num,
            token: format!(".{name}"),
        }),
    }
}

fn parse_instruction(mnemonic: &str, args: &[Token], line_num: usize) -> Result<Pending, AsmError> {
    let opcode = Opcode::from_mnemonic(&mnemonic.to_ascii_uppercase()).ok_or_else(|| {
        AsmError::UnknownOpcode {
            line: line_num,
            token: mnemonic.to_string(),
        }
    })?;
    let m = opcode.mnemonic();

    let (pending, used) = match opcode {
        Opcode::PushConst => (
            Pending::Ready(Instruction::PushConst(expect_i32(args, 0, line_num, m)?)),
            1,
        ),
        Opcode::LoadLocal => (
            Pending::Ready(Instruction::LoadLocal(expect_u16(args, 0, line_num, m, 1)?)),
            1,
        ),
        Opcode::StoreLocal => (
            Pending::Ready(Instruction::StoreLocal(expect_u16(args, 0, line_num, m, 1)?)),
            1,
        ),
        Opcode::Jump | Opcode::JumpIfFalse => (
            Pending::Branch {
                opcode,
                target: expect_target(args, 0, line_num, m)?,
            },
            1,
        ),
        Opcode::InvokeStatic => {
            let method = expect_name(args, 0, line_num, m, 2)?;
            let argc = expect_u16(args, 1, line_num, m, 2)?;
            (Pending::Ready(Instruction::invoke(method, argc)), 2)
        }
        Opcode::Dup => (Pending::Ready(Instruction::Dup), 0),
        Opcode::Pop => (Pending::Ready(Instruction::Pop), 0),
        Opcode::Add => (Pending::Ready(Instruction::Add), 0),
        Opcode::Sub => (Pending::Ready(Instruction::Sub), 0),
        Opcode::Mul => (Pending::Ready(Instruction::Mul), 0),
        Opcode::Div => (Pending::Ready(Instruction::Div), 0),
        Opcode::Rem => (Pending::Ready(Instruction::Rem), 0),
        Opcode::Neg => (Pending::Ready(Instruction::Neg), 0),
        Opcode::CmpEq => (Pending::Ready(Instruction::CmpEq), 0),
        Opcode::CmpNe => (Pending::Ready(Instruction::CmpNe), 0),
        Opcode::CmpLt => (Pending::Ready(Instruction::CmpLt), 0),
        Opcode::CmpLe => (Pending::Ready(Instruction::CmpLe), 0),
        Opcode::CmpGt => (Pending::Ready(Instruction::CmpGt), 0),
        Opcode::CmpGe => (Pending::Ready(Instruction::CmpGe), 0),
        Opcode::NewArray => (Pending::Ready(Instruction::NewArray), 0),
        Opcode::ArrayLoad => (Pending::Ready(Instruction::ArrayLoad), 0),
        Opcode::ArrayStore => (Pending::Ready(Instruction::ArrayStore), 0),
        Opcode::ArrayLength => (Pending::Ready(Instruction::ArrayLength), 0),
        Opcode::Return => (Pending::Ready(Instruction::Return), 0),
    };

    expect_end(&args[used..], line_num)?;
    Ok(pending)
}

fn arg<'t>(
    args: &'t [Token],
    index: usize,
    line_num: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<&'t Token, AsmError> {
    args.get(index).ok_or(AsmError::MissingArgument {
        line: line_num,
        opcode,
        expected,
    })
}

fn expect_number(
    args: &[Token],
    index: usize,
    line_num: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<i64, AsmError> {
    match arg(args, index, line_num, opcode, expected)? {
        Token::Number(n) => Ok(*n),
        other => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: other.text(),
        }),
    }
}

fn expect_u16(
    args: &[Token],
    index: usize,
    line_num: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u16, AsmError> {
    let n = expect_number(args, index, line_num, opcode, expected)?;
    u16::try_from(n).map_err(|_| AsmError::InvalidNumber {
        line: line_num,
        token: n.to_string(),
    })
}

fn expect_i32(
    args: &[Token],
    index: usize,
    line_num: usize,
    opcode: &'static str,
) -> Result<i32, AsmError> {
    let n = expect_number(args, index, line_num, opcode, 1)?;
    i32::try_from(n).map_err(|_| AsmError::InvalidNumber {
        line: line_num,
        token: n.to_string(),
    })
}

fn expect_name(
    args: &[Token],
    index: usize,
    line_num: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<String, AsmError> {
    match arg(args, index, line_num, opcode, expected)? {
        Token::Ident(name) => Ok(name.clone()),
        other => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: other.text(),
        }),
    }
}

fn expect_target(
    args: &[Token],
    index: usize,
    line_num: usize,
    opcode: &'static str,
) -> Result<Target, AsmError> {
    match arg(args, index, line_num, opcode, 1)? {
        Token::Ident(label) => Ok(Target::Label(label.clone())),
        Token::Number(n) => u32::try_from(*n)
            .map(Target::Index)
            .map_err(|_| AsmError::InvalidNumber {
                line: line_num,
                token: n.to_string(),
            }),
        other => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: other.text(),
        }),
    }
}

fn expect_end(rest: &[Token], line_num: usize) -> Result<(), AsmError> {
    match rest.first() {
        None => Ok(()),
        Some(token) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: token.text(),
        }),
    }
}
