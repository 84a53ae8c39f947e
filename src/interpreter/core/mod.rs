//! Machine driver.
//!
//! The `Machine` ties together the array table, decoder, and executor to run
//! one UM-32 program. It owns the execution loop and tracks machine status.
//!
//! # Execution Model
//!
//! Each step:
//!
//! 1. Fetch the platter at PC from array 0
//! 2. Decode it
//! 3. Dispatch to the owning execution unit
//! 4. Handle the result (advance PC, jump, or halt)
//!
//! A fault at any stage stops the machine with the pre-instruction state
//! preserved in a snapshot.
//!
//! # Example
//!
//! ```
//! use um32_emu::device::BufferConsole;
//! use um32_emu::interpreter::core::{Machine, MachineStatus};
//!
//! // R[0] := 'H'; output R[0]; halt
//! let image = [0xD0, 0x00, 0x00, 0x48, 0xA0, 0x00, 0x00, 0x00, 0x70, 0x00, 0x00, 0x00];
//! let mut machine = Machine::boot(&image, BufferConsole::default())?;
//!
//! machine.run_to_halt()?;
//! assert_eq!(machine.status(), MachineStatus::Halted);
//! assert_eq!(machine.console().output(), b"H");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod machine;

pub use machine::{Machine, MachineStatus, RunOutcome, StepResult};
