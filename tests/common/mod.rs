//! Program-building helpers shared by the integration tests.

#![allow(dead_code)]

use um32_emu::device::BufferConsole;
use um32_emu::interpreter::Machine;
use um32_emu::parser::Program;

pub const CMOV: u32 = 0;
pub const ARRIND: u32 = 1;
pub const ARRAMEND: u32 = 2;
pub const ADD: u32 = 3;
pub const MUL: u32 = 4;
pub const DIV: u32 = 5;
pub const NAND: u32 = 6;
pub const HALT: u32 = 7;
pub const ALLOC: u32 = 8;
pub const ABANDON: u32 = 9;
pub const OUTPUT: u32 = 10;
pub const INPUT: u32 = 11;
pub const LOADPROG: u32 = 12;
pub const ORTHOG: u32 = 13;

/// Encode a three-register instruction.
pub fn op(opcode: u32, a: u32, b: u32, c: u32) -> u32 {
    (opcode << 28) | (a << 6) | (b << 3) | c
}

/// Encode `R[a] := value` for a 25-bit value.
pub fn ortho(a: u32, value: u32) -> u32 {
    (ORTHOG << 28) | (a << 25) | (value & 0x01FF_FFFF)
}

/// `halt`.
pub fn halt() -> u32 {
    op(HALT, 0, 0, 0)
}

/// Instructions that put an arbitrary 32-bit `value` into `R[reg]`,
/// clobbering `R[scratch]`.
pub fn load_const(reg: u32, scratch: u32, value: u32) -> Vec<u32> {
    vec![
        ortho(reg, value >> 16),
        ortho(scratch, 1 << 16),
        op(MUL, reg, reg, scratch),
        ortho(scratch, value & 0xFFFF),
        op(ADD, reg, reg, scratch),
    ]
}

/// Serialize platters to the big-endian program file format.
pub fn image(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Boot a machine over `words` with `input` queued on the console.
pub fn machine(words: &[u32], input: &[u8]) -> Machine<BufferConsole> {
    let program = Program::from_words(words.to_vec()).expect("non-empty program");
    Machine::new(program, BufferConsole::new(input))
}
