//! Arithmetic execution unit.
//!
//! Handles the register-only operators on 32-bit platters.
//!
//! # Operations
//!
//! - **Arithmetic**: add, mul (modulo 2^32), div (unsigned)
//! - **Logic**: nand
//! - **Move**: cmov, orthography

use crate::interpreter::decode::{Instruction, Opcode};
use crate::interpreter::state::ExecutionContext;
use crate::interpreter::traits::Fault;

/// Arithmetic execution unit.
pub struct ArithmeticUnit;

impl ArithmeticUnit {
    /// Execute a register operation.
    ///
    /// Returns `Ok(true)` if the operation was handled, `Ok(false)` if it
    /// belongs to another unit.
    pub fn execute(instr: &Instruction, ctx: &mut ExecutionContext) -> Result<bool, Fault> {
        match instr.opcode {
            Opcode::ConditionalMove => {
                if ctx.registers.read(instr.c) != 0 {
                    let value = ctx.registers.read(instr.b);
                    ctx.registers.write(instr.a, value);
                }
                Ok(true)
            }

            Opcode::Add => {
                let (b, c) = Self::get_two_sources(instr, ctx);
                ctx.registers.write(instr.a, b.wrapping_add(c));
                Ok(true)
            }

            Opcode::Multiply => {
                let (b, c) = Self::get_two_sources(instr, ctx);
                ctx.registers.write(instr.a, b.wrapping_mul(c));
                Ok(true)
            }

            Opcode::Divide => {
                let (b, c) = Self::get_two_sources(instr, ctx);
                let result = b.checked_div(c).ok_or(Fault::DivisionByZero)?;
                ctx.registers.write(instr.a, result);
                Ok(true)
            }

            Opcode::Nand => {
                let (b, c) = Self::get_two_sources(instr, ctx);
                ctx.registers.write(instr.a, !(b & c));
                Ok(true)
            }

            Opcode::Orthography => {
                ctx.registers.write(instr.a, instr.immediate);
                Ok(true)
            }

            _ => Ok(false),
        }
    }

    #[inline]
    fn get_two_sources(instr: &Instruction, ctx: &ExecutionContext) -> (u32, u32) {
        (ctx.registers.read(instr.b), ctx.registers.read(instr.c))
    }
}
