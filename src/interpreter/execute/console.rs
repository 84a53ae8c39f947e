//! Console unit execution.
//!
//! Moves single bytes between registers and the console channel. Output
//! values must fit in a byte; input end-of-stream loads all ones.

use crate::interpreter::decode::{Instruction, Opcode};
use crate::interpreter::state::ExecutionContext;
use crate::interpreter::traits::{Console, Fault};

/// Register value loaded by input once the stream has ended.
pub const END_OF_INPUT: u32 = 0xFFFF_FFFF;

/// Console unit for output and input.
pub struct ConsoleUnit;

impl ConsoleUnit {
    /// Execute a console operation.
    ///
    /// Returns `Ok(true)` if the operation was handled.
    pub fn execute<C: Console + ?Sized>(
        instr: &Instruction,
        ctx: &mut ExecutionContext,
        console: &mut C,
    ) -> Result<bool, Fault> {
        match instr.opcode {
            Opcode::Output => {
                let value = ctx.registers.read(instr.c);
                let byte = u8::try_from(value).map_err(|_| Fault::IoContractViolation { value })?;
                console.write_byte(byte)?;
                Ok(true)
            }

            Opcode::Input => {
                let value = match console.read_byte()? {
                    Some(byte) => byte as u32,
                    None => END_OF_INPUT,
                };
                ctx.registers.write(instr.c, value);
                Ok(true)
            }

            _ => Ok(false),
        }
    }
}
