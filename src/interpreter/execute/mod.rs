//! Execution units for UM-32 operators.
//!
//! Each unit handles one category of operators:
//!
//! | Unit | Operators |
//! |------|-----------|
//! | Arithmetic | cmov, add, mul, div, nand, orthography |
//! | Memory | arrind, arramend, alloc, abandon |
//! | Console | output, input |
//! | Control | halt, loadprog |
//!
//! # Example
//!
//! ```
//! use um32_emu::device::{ArrayTable, BufferConsole};
//! use um32_emu::interpreter::decode::decode;
//! use um32_emu::interpreter::execute::Executor;
//! use um32_emu::interpreter::state::ExecutionContext;
//!
//! let mut executor = Executor::new();
//! let mut ctx = ExecutionContext::new();
//! let mut memory = ArrayTable::new(vec![0x7000_0000]);
//! let mut console = BufferConsole::default();
//!
//! let instr = decode(0xD000_0048).unwrap(); // R[0] := 72
//! executor.execute(&instr, &mut ctx, &mut memory, &mut console).unwrap();
//! assert_eq!(ctx.registers.read(0), 72);
//! ```

mod arithmetic;
mod console;
mod control;
mod executor;
mod memory;

pub use arithmetic::ArithmeticUnit;
pub use console::{ConsoleUnit, END_OF_INPUT};
pub use control::ControlUnit;
pub use executor::{Executor, NUM_OPCODES};
pub use memory::MemoryUnit;
