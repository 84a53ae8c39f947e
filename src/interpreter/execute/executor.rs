//! Instruction dispatcher.
//!
//! The `Executor` hands each decoded instruction to the unit that owns its
//! operator and reports how control should proceed.
//!
//! # Execution Model
//!
//! 1. Each unit checks every fault precondition before touching state
//! 2. A faulting instruction leaves registers, arrays, and PC unchanged
//! 3. Control flow changes are returned to the caller, never applied here

use crate::device::ArrayTable;
use crate::interpreter::decode::Instruction;
use crate::interpreter::state::ExecutionContext;
use crate::interpreter::traits::{Console, ExecuteResult, Fault};

use super::arithmetic::ArithmeticUnit;
use super::console::ConsoleUnit;
use super::control::ControlUnit;
use super::memory::MemoryUnit;

/// Number of defined operators.
pub const NUM_OPCODES: usize = 14;

/// Dispatches instructions to execution units and counts the mix.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    /// Completed instructions per operator number.
    counts: [u64; NUM_OPCODES],
}

impl Executor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute one instruction.
    pub fn execute<C: Console + ?Sized>(
        &mut self,
        instr: &Instruction,
        ctx: &mut ExecutionContext,
        memory: &mut ArrayTable,
        console: &mut C,
    ) -> Result<ExecuteResult, Fault> {
        let result = self.dispatch(instr, ctx, memory, console)?;
        self.counts[instr.opcode as usize] += 1;
        Ok(result)
    }

    fn dispatch<C: Console + ?Sized>(
        &mut self,
        instr: &Instruction,
        ctx: &mut ExecutionContext,
        memory: &mut ArrayTable,
        console: &mut C,
    ) -> Result<ExecuteResult, Fault> {
        // Try each execution unit in order
        if ArithmeticUnit::execute(instr, ctx)? {
            return Ok(ExecuteResult::Continue);
        }

        if MemoryUnit::execute(instr, ctx, memory)? {
            return Ok(ExecuteResult::Continue);
        }

        if ConsoleUnit::execute(instr, ctx, console)? {
            return Ok(ExecuteResult::Continue);
        }

        if let Some(result) = ControlUnit::execute(instr, ctx, memory)? {
            return Ok(result);
        }

        // Every operator belongs to a unit; reaching here means the tables disagree
        Err(Fault::UnknownOpcode {
            opcode: instr.opcode as u8,
        })
    }

    /// Completed instructions per operator number.
    pub fn opcode_counts(&self) -> &[u64; NUM_OPCODES] {
        &self.counts
    }

    /// Forget the instruction mix.
    pub fn reset(&mut self) {
        self.counts = [0; NUM_OPCODES];
    }
}
