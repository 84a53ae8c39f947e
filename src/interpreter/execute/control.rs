//! Control unit execution.
//!
//! Handles the operators that change where or whether execution continues:
//!
//! - **Halt**: stop the machine
//! - **Load program**: replace the program array with a copy of another
//!   array and move the program counter

use crate::device::ArrayTable;
use crate::interpreter::decode::{Instruction, Opcode};
use crate::interpreter::state::ExecutionContext;
use crate::interpreter::traits::{ExecuteResult, Fault};

/// Control unit for halt and load-program.
pub struct ControlUnit;

impl ControlUnit {
    /// Execute a control operation.
    ///
    /// Returns `Ok(Some(result))` if handled, `Ok(None)` if not a control op.
    pub fn execute(
        instr: &Instruction,
        ctx: &mut ExecutionContext,
        memory: &mut ArrayTable,
    ) -> Result<Option<ExecuteResult>, Fault> {
        match instr.opcode {
            Opcode::Halt => Ok(Some(ExecuteResult::Halt)),

            Opcode::LoadProgram => {
                let source = ctx.registers.read(instr.b);
                let target = ctx.registers.read(instr.c);
                memory.load_program(source)?;
                log::debug!("Load program from array {}, PC := {}", source, target);
                Ok(Some(ExecuteResult::Jump { target }))
            }

            _ => Ok(None),
        }
    }
}
