//! Program representation: a flat table of static methods.
//!
//! A program is immutable once loaded. Method names are resolved once, at
//! load time, into a name → index map.
//!
//! Binary modules (.tvmb) use this layout, all integers little-endian:
//! ```text
//! "TVMB" | version u8
//! name count u32, then per name: byte length u32, UTF-8 bytes
//! method count u32, then per method:
//!     name index u32 | arity u16 | local_count u16 | code length u32 | code
//! ```
//! where `code` is `code length` 8-byte instructions.

use std::collections::HashMap;

use crate::error::{DecodeError, LoadError};
use crate::instruction::{Instruction, NameTable, INSTRUCTION_SIZE};
use crate::method::Method;

/// Leading bytes of every binary module.
pub const MAGIC: &[u8; 4] = b"TVMB";

/// Current binary module format version.
pub const FORMAT_VERSION: u8 = 1;

/// A loaded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    methods: Vec<Method>,
    index: HashMap<String, usize>,
}

impl Program {
    /// Load a program from its methods. Method names must be unique.
    pub fn new(methods: Vec<Method>) -> Result<Self, LoadError> {
        let mut index = HashMap::with_capacity(methods.len());
        for (i, method) in methods.iter().enumerate() {
            if index.insert(method.name().to_string(), i).is_some() {
                return Err(LoadError::DuplicateMethod {
                    method: method.name().to_string(),
                });
            }
        }
        Ok(Self { methods, index })
    }

    /// All methods, in load order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Method at a resolved index.
    pub fn method(&self, index: usize) -> Option<&Method> {
        self.methods.get(index)
    }

    /// Resolve a method name to its index.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.resolve(name).map(|i| &self.methods[i])
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if the program has no methods.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Encode the program as a binary module.
    pub fn encode(&self) -> Vec<u8> {
        let mut names = NameTable::new();
        let mut bodies = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            let name_index = names.intern(method.name());
            let mut code = Vec::with_capacity(method.len() * INSTRUCTION_SIZE);
            for instr in method.code() {
                code.extend_from_slice(&instr.encode(&mut names));
            }
            bodies.push((name_index, code));
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.push(FORMAT_VERSION);

        bytes.extend_from_slice(&(names.len() as u32).to_le_bytes());
        for name in names.names() {
            bytes.extend_from_slice(&(name.len() as u32).to_le_bytes());
            bytes.extend_from_slice(name.as_bytes());
        }

        bytes.extend_from_slice(&(self.methods.len() as u32).to_le_bytes());
        for (method, (name_index, code)) in self.methods.iter().zip(bodies) {
            bytes.extend_from_slice(&name_index.to_le_bytes());
            bytes.extend_from_slice(&method.arity().to_le_bytes());
            bytes.extend_from_slice(&method.local_count().to_le_bytes());
            bytes.extend_from_slice(&(method.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&code);
        }

        bytes
    }

    /// Decode a binary module and run the load checks on it.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes);

        if r.take(MAGIC.len())? != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let version = r.u8()?;
        if version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let name_count = r.u32()? as usize;
        let mut names = Vec::new();
        for index in 0..name_count {
            let len = r.u32()? as usize;
            let raw = r.take(len)?;
            let name = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { index })?;
            names.push(name.to_string());
        }

        let method_count = r.u32()? as usize;
        let mut methods = Vec::new();
        for _ in 0..method_count {
            let name_index = r.u32()? as usize;
            let name = names
                .get(name_index)
                .ok_or(DecodeError::NameIndexOutOfRange {
                    index: name_index,
                    count: names.len(),
                })?
                .clone();
            let arity = r.u16()?;
            let local_count = r.u16()?;
            let code_len = r.u32()? as usize;

            let mut code = Vec::new();
            for _ in 0..code_len {
                let chunk: [u8; INSTRUCTION_SIZE] = r.array()?;
                code.push(Instruction::decode(chunk, &names)?);
            }
            methods.push(Method::new(name, arity, local_count, code)?);
        }

        if r.remaining() > 0 {
            return Err(DecodeError::TrailingBytes(r.remaining()));
        }

        Ok(Self::new(methods)?)
    }
}

/// Bounds-checked little-endian cursor over a byte slice.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }
}
