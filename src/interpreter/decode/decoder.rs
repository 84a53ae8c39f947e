//! Platter decoder.
//!
//! Turns a fetched 32-bit word into an [`Instruction`]. Unknown operator
//! numbers are reported as [`Fault::UnknownOpcode`].

use std::fmt;

use super::{extract_immediate, extract_opcode, extract_reg, fields, Opcode};
use crate::interpreter::traits::Fault;

/// A decoded UM-32 instruction.
///
/// For standard operators `a`, `b` and `c` are the three register fields and
/// `immediate` is zero. For orthography, `a` comes from bits 27-25,
/// `immediate` holds the 25-bit value, and `b`/`c` are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The raw platter.
    pub word: u32,
    /// Decoded operator.
    pub opcode: Opcode,
    /// Register A.
    pub a: u8,
    /// Register B.
    pub b: u8,
    /// Register C.
    pub c: u8,
    /// Orthography value.
    pub immediate: u32,
}

/// Decode a single platter.
pub fn decode(word: u32) -> Result<Instruction, Fault> {
    let bits = extract_opcode(word);
    let opcode = Opcode::from_bits(bits).ok_or(Fault::UnknownOpcode { opcode: bits })?;

    let instr = match opcode {
        Opcode::Orthography => Instruction {
            word,
            opcode,
            a: extract_reg(word, fields::ORTHO_REG_SHIFT),
            b: 0,
            c: 0,
            immediate: extract_immediate(word),
        },
        _ => Instruction {
            word,
            opcode,
            a: extract_reg(word, fields::REG_A_SHIFT),
            b: extract_reg(word, fields::REG_B_SHIFT),
            c: extract_reg(word, fields::REG_C_SHIFT),
            immediate: 0,
        },
    };

    Ok(instr)
}

/// Human-readable form of any word, including ones that do not decode.
pub fn describe(word: u32) -> String {
    match decode(word) {
        Ok(instr) => instr.to_string(),
        Err(_) => format!(
            "UNKNOWNOP({})\tA:{}\tB:{}\tC:{}",
            extract_opcode(word),
            extract_reg(word, fields::REG_A_SHIFT),
            extract_reg(word, fields::REG_B_SHIFT),
            extract_reg(word, fields::REG_C_SHIFT),
        ),
    }
}

impl Instruction {
    /// Operator mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Orthography => {
                write!(f, "{}\tA:{}\tvalue:{}", self.mnemonic(), self.a, self.immediate)
            }
            _ => write!(
                f,
                "{}\tA:{}\tB:{}\tC:{}",
                self.mnemonic(),
                self.a,
                self.b,
                self.c
            ),
        }
    }
}
