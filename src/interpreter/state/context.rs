//! Execution context for a UM-32 machine.
//!
//! The `ExecutionContext` holds the processor state an instruction can see:
//! the register file, the program counter (the "execution finger"), the
//! halted flag, and an executed-instruction counter.

use super::registers::RegisterFile;

/// Register file, program counter, and run status.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// General purpose registers.
    pub registers: RegisterFile,

    /// Program counter, in words, into the program array.
    pc: u32,

    /// Set once by the halt instruction; never cleared during a run.
    halted: bool,

    /// Number of instructions that completed.
    pub instructions: u64,
}

impl ExecutionContext {
    /// Create a context with zeroed registers and PC = 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the program counter.
    #[inline]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Set the program counter.
    #[inline]
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// Advance the program counter by one word.
    #[inline]
    pub fn advance_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    /// Mark the machine halted.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Check if the machine has halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Return to the bootstrap state.
    pub fn reset(&mut self) {
        self.registers.clear();
        self.pc = 0;
        self.halted = false;
        self.instructions = 0;
    }

    /// Trace line: `PC=<pc> R[0]=<v> ... R[7]=<v>`.
    pub fn state_line(&self) -> String {
        format!("PC={} {}", self.pc, self.registers)
    }
}
