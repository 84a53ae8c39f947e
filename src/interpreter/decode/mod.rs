//! Instruction decoder for the UM-32.
//!
//! Every instruction is one 32-bit platter. The operator number sits in the
//! top four bits; the remaining fields depend on the operator.
//!
//! # Standard Operators (0-12)
//!
//! ```text
//!  31  28 27                      9 8   6 5   3 2   0
//! +------+-------------------------+-----+-----+-----+
//! |  op  |         (unused)        |  A  |  B  |  C  |
//! +------+-------------------------+-----+-----+-----+
//! ```
//!
//! # Orthography (13)
//!
//! ```text
//!  31  28 27 25 24                                  0
//! +------+-----+-------------------------------------+
//! |  op  |  A  |               value                 |
//! +------+-----+-------------------------------------+
//! ```
//!
//! Decoding is pure bit extraction. The same functions back both the
//! dispatch loop and the trace output.

mod decoder;

pub use decoder::{decode, describe, Instruction};

/// Bit positions of the instruction fields.
pub mod fields {
    /// Operator number: bits 31-28.
    pub const OPCODE_SHIFT: u8 = 28;
    /// Register A: bits 8-6.
    pub const REG_A_SHIFT: u8 = 6;
    /// Register B: bits 5-3.
    pub const REG_B_SHIFT: u8 = 3;
    /// Register C: bits 2-0.
    pub const REG_C_SHIFT: u8 = 0;
    /// Orthography register A: bits 27-25.
    pub const ORTHO_REG_SHIFT: u8 = 25;

    /// Mask for a 4-bit operator number.
    pub const OPCODE_MASK: u32 = 0xF;
    /// Mask for a 3-bit register field.
    pub const REG_MASK: u32 = 0x7;
    /// Mask for the 25-bit orthography value.
    pub const IMMEDIATE_MASK: u32 = 0x01FF_FFFF;
}

/// UM-32 operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// `R[A] := R[B]` unless `R[C] == 0`.
    ConditionalMove = 0,
    /// `R[A] := array[R[B]][R[C]]`.
    ArrayIndex = 1,
    /// `array[R[A]][R[B]] := R[C]`.
    ArrayAmend = 2,
    /// `R[A] := R[B] + R[C]`.
    Add = 3,
    /// `R[A] := R[B] * R[C]`.
    Multiply = 4,
    /// `R[A] := R[B] / R[C]` (unsigned).
    Divide = 5,
    /// `R[A] := !(R[B] & R[C])`.
    Nand = 6,
    /// Stop the machine.
    Halt = 7,
    /// New zeroed array of `R[C]` words; id into `R[B]`.
    Allocate = 8,
    /// Abandon array `R[C]`.
    Abandon = 9,
    /// Write `R[C]` to the console.
    Output = 10,
    /// Read a console byte into `R[C]`.
    Input = 11,
    /// Replace the program array with a copy of array `R[B]`; PC := `R[C]`.
    LoadProgram = 12,
    /// `R[A] := value`.
    Orthography = 13,
}

impl Opcode {
    /// Map a 4-bit operator number to an opcode.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => Opcode::ConditionalMove,
            1 => Opcode::ArrayIndex,
            2 => Opcode::ArrayAmend,
            3 => Opcode::Add,
            4 => Opcode::Multiply,
            5 => Opcode::Divide,
            6 => Opcode::Nand,
            7 => Opcode::Halt,
            8 => Opcode::Allocate,
            9 => Opcode::Abandon,
            10 => Opcode::Output,
            11 => Opcode::Input,
            12 => Opcode::LoadProgram,
            13 => Opcode::Orthography,
            _ => return None,
        })
    }

    /// Short name used in traces and fault reports.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::ConditionalMove => "cmov",
            Opcode::ArrayIndex => "arrind",
            Opcode::ArrayAmend => "arramend",
            Opcode::Add => "add",
            Opcode::Multiply => "mul",
            Opcode::Divide => "div",
            Opcode::Nand => "nand",
            Opcode::Halt => "halt",
            Opcode::Allocate => "alloc",
            Opcode::Abandon => "abandon",
            Opcode::Output => "output",
            Opcode::Input => "input",
            Opcode::LoadProgram => "loadprog",
            Opcode::Orthography => "orthog",
        }
    }
}

/// Extract the 4-bit operator number.
#[inline]
pub fn extract_opcode(word: u32) -> u8 {
    ((word >> fields::OPCODE_SHIFT) & fields::OPCODE_MASK) as u8
}

/// Extract a 3-bit register field.
#[inline]
pub fn extract_reg(word: u32, shift: u8) -> u8 {
    ((word >> shift) & fields::REG_MASK) as u8
}

/// Extract the 25-bit orthography value (zero-extended).
#[inline]
pub fn extract_immediate(word: u32) -> u32 {
    word & fields::IMMEDIATE_MASK
}
