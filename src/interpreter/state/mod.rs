//! Processor state for the UM-32.
//!
//! | State | Width | Purpose |
//! |-------|-------|---------|
//! | R[0]-R[7] | 32-bit | General purpose registers |
//! | PC | 32-bit | Word offset into the program array |
//! | halted | flag | Set by the halt instruction |
//!
//! # Example
//!
//! ```
//! use um32_emu::interpreter::state::ExecutionContext;
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.registers.write(0, 42);  // R[0] = 42
//! ctx.set_pc(0x10);            // PC = 16
//! ```

mod context;
mod registers;

pub use context::ExecutionContext;
pub use registers::{RegisterFile, NUM_REGS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_context_basic() {
        let mut ctx = ExecutionContext::new();

        ctx.set_pc(0x10);
        assert_eq!(ctx.pc(), 0x10);

        ctx.registers.write(5, 42);
        assert_eq!(ctx.registers.read(5), 42);

        assert_eq!(ctx.instructions, 0);
        ctx.instructions += 1;
        assert_eq!(ctx.instructions, 1);
    }
}
