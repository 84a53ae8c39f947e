//! Memory unit execution.
//!
//! Handles the operators that touch the array table:
//!
//! | Operator | Effect |
//! |----------|--------|
//! | arrind | `R[A] := array[R[B]][R[C]]` |
//! | arramend | `array[R[A]][R[B]] := R[C]` |
//! | alloc | new zeroed array of `R[C]` words, id into `R[B]` |
//! | abandon | release array `R[C]` |
//!
//! Every access is checked against the array's liveness and length before
//! any register or array is changed.

use crate::device::ArrayTable;
use crate::interpreter::decode::{Instruction, Opcode};
use crate::interpreter::state::ExecutionContext;
use crate::interpreter::traits::Fault;

/// Memory unit for array access and lifetime operations.
pub struct MemoryUnit;

impl MemoryUnit {
    /// Execute a memory operation.
    ///
    /// Returns `Ok(true)` if the operation was handled, `Ok(false)` if not a
    /// memory op.
    pub fn execute(
        instr: &Instruction,
        ctx: &mut ExecutionContext,
        memory: &mut ArrayTable,
    ) -> Result<bool, Fault> {
        let regs = &mut ctx.registers;
        match instr.opcode {
            Opcode::ArrayIndex => {
                let value = memory.read(regs.read(instr.b), regs.read(instr.c))?;
                regs.write(instr.a, value);
                Ok(true)
            }

            Opcode::ArrayAmend => {
                memory.write(regs.read(instr.a), regs.read(instr.b), regs.read(instr.c))?;
                Ok(true)
            }

            Opcode::Allocate => {
                let id = memory.allocate(regs.read(instr.c))?;
                regs.write(instr.b, id);
                Ok(true)
            }

            Opcode::Abandon => {
                memory.abandon(regs.read(instr.c))?;
                Ok(true)
            }

            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::decode::decode;

    fn op(opcode: u32, a: u32, b: u32, c: u32) -> Instruction {
        decode((opcode << 28) | (a << 6) | (b << 3) | c).unwrap()
    }

    #[test]
    fn test_alloc_writes_id_to_b() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![0]);
        ctx.registers.write(2, 10);

        // alloc B=1 C=2
        MemoryUnit::execute(&op(8, 0, 1, 2), &mut ctx, &mut memory).unwrap();

        let id = ctx.registers.read(1);
        assert_ne!(id, 0);
        assert_eq!(memory.array(id).unwrap().len(), 10);
    }

    #[test]
    fn test_amend_then_index() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![0]);
        let id = memory.allocate(4).unwrap();

        ctx.registers.write(0, id);
        ctx.registers.write(1, 3);
        ctx.registers.write(2, 0xABCD);
        // arramend A=0 B=1 C=2
        MemoryUnit::execute(&op(2, 0, 1, 2), &mut ctx, &mut memory).unwrap();

        // arrind A=5 B=0 C=1
        MemoryUnit::execute(&op(1, 5, 0, 1), &mut ctx, &mut memory).unwrap();
        assert_eq!(ctx.registers.read(5), 0xABCD);
    }

    #[test]
    fn test_index_program_array() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![11, 22, 33]);
        ctx.registers.write(2, 2);

        MemoryUnit::execute(&op(1, 0, 1, 2), &mut ctx, &mut memory).unwrap();
        assert_eq!(ctx.registers.read(0), 33);
    }

    #[test]
    fn test_index_out_of_bounds_leaves_register() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![0]);
        ctx.registers.write(0, 99);
        ctx.registers.write(2, 1);

        let result = MemoryUnit::execute(&op(1, 0, 1, 2), &mut ctx, &mut memory);
        assert_eq!(result, Err(Fault::OutOfBounds { array: 0, offset: 1, len: 1 }));
        assert_eq!(ctx.registers.read(0), 99);
    }

    #[test]
    fn test_index_dead_array() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![0]);
        ctx.registers.write(1, 3);

        let result = MemoryUnit::execute(&op(1, 0, 1, 2), &mut ctx, &mut memory);
        assert_eq!(result, Err(Fault::InvalidArrayReference { id: 3 }));
    }

    #[test]
    fn test_abandon_zero() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![0]);

        let result = MemoryUnit::execute(&op(9, 0, 0, 3), &mut ctx, &mut memory);
        assert_eq!(result, Err(Fault::InvalidAbandon { id: 0 }));
    }

    #[test]
    fn test_not_memory_op() {
        let mut ctx = ExecutionContext::new();
        let mut memory = ArrayTable::new(vec![0]);
        assert_eq!(
            MemoryUnit::execute(&op(3, 0, 1, 2), &mut ctx, &mut memory),
            Ok(false)
        );
    }
}
