//! UM-32 interpreter.
//!
//! # Architecture
//!
//! The interpreter is organized into several submodules:
//!
//! - [`traits`]: console seam, execution results, faults and snapshots
//! - [`decode`]: instruction word decoding
//! - [`state`]: register file and execution context
//! - [`execute`]: execution units and the dispatcher
//! - [`core`]: the machine and its fetch-decode-dispatch loop
//! - [`runner`]: run options, budgets, and statistics for front ends
//!
//! # Example
//!
//! ```
//! use um32_emu::device::BufferConsole;
//! use um32_emu::interpreter::{Fault, Machine};
//!
//! // Abandon R[0], which names the program array
//! let image = [0x90, 0x00, 0x00, 0x00];
//! let mut machine = Machine::boot(&image, BufferConsole::default())?;
//!
//! let err = machine.run_to_halt().unwrap_err();
//! assert_eq!(err.fault, Fault::InvalidAbandon { id: 0 });
//! assert_eq!(err.snapshot.pc, 0);
//! # Ok::<(), Fault>(())
//! ```

pub mod traits;
pub mod decode;
pub mod state;
pub mod execute;
pub mod core;
pub mod runner;

// Re-export key types for convenience
pub use traits::{Console, ExecuteResult, Fault, MachineFault, Snapshot};

// Decoder types
pub use decode::{decode, describe, Instruction, Opcode};

// State types
pub use state::{ExecutionContext, RegisterFile};

// Execute types
pub use execute::Executor;

// Core types
pub use self::core::{Machine, MachineStatus, RunOutcome, StepResult};

// Runner types
pub use runner::{RunOptions, RunStats, Runner};
