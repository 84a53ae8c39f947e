//! Core traits and result types for the interpreter.
//!
//! These define the boundaries between the dispatch loop and the outside
//! world:
//!
//! - `Console`: the machine's byte-oriented I/O channel. The standard-stream
//!   console and the in-memory console in [`crate::device::console`] both
//!   implement it, so a machine can run against a terminal or a test buffer.
//! - `ExecuteResult`: how control proceeds after one instruction.
//! - `Fault` / `MachineFault`: every way a run can stop abnormally, with the
//!   machine state captured at the stopping point.

use std::fmt;
use std::io;

use thiserror::Error;

use super::decode::describe;
use super::state::RegisterFile;

/// Byte-oriented console channel.
///
/// Output never waits on the machine; input is the only place a running
/// machine may block.
pub trait Console {
    /// Write a single byte to the output channel.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Block until one byte is available.
    ///
    /// Returns `Ok(None)` once the input stream has ended.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Push any pending output through to the host.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Continue with the next word of the program array.
    Continue,

    /// Resume fetching at `target` (load-program).
    Jump {
        /// New program counter.
        target: u32,
    },

    /// The machine has halted (normal termination).
    Halt,
}

/// Fatal violations of the instruction-set contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Program image is empty or not made of whole 32-bit words.
    #[error("invalid program size: {len} bytes is not a positive multiple of 4")]
    InvalidProgramSize {
        /// Length of the rejected buffer in bytes.
        len: usize,
    },

    /// Fetch past the end of the program array, or an index/amend offset
    /// past the end of its array.
    #[error("offset {offset} out of bounds for array {array} of {len} words")]
    OutOfBounds {
        /// Array being accessed.
        array: u32,
        /// Offending offset.
        offset: u32,
        /// Length of the array in words.
        len: usize,
    },

    /// An id that does not name an active array.
    #[error("array {id} is not an active array")]
    InvalidArrayReference {
        /// The id that was referenced.
        id: u32,
    },

    /// Abandoning the program array or an array that is already abandoned.
    #[error("cannot abandon array {id}")]
    InvalidAbandon {
        /// The id that was abandoned.
        id: u32,
    },

    /// Divide with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// Operator number 14 or 15.
    #[error("unknown opcode {opcode}")]
    UnknownOpcode {
        /// The 4-bit operator number.
        opcode: u8,
    },

    /// Output of a value that does not fit in one byte.
    #[error("output value {value} is outside 0..=255")]
    IoContractViolation {
        /// The register value that was output.
        value: u32,
    },

    /// The host could not provide storage (or an id) for a new array.
    #[error("cannot allocate an array of {words} words")]
    AllocationFailed {
        /// Requested capacity in words.
        words: u32,
    },

    /// The host console stream failed.
    #[error("console error: {message}")]
    Console {
        /// Description of the underlying I/O error.
        message: String,
    },
}

impl Fault {
    /// Short name of the fault kind, as shown in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::InvalidProgramSize { .. } => "InvalidProgramSize",
            Fault::OutOfBounds { .. } => "OutOfBounds",
            Fault::InvalidArrayReference { .. } => "InvalidArrayReference",
            Fault::InvalidAbandon { .. } => "InvalidAbandon",
            Fault::DivisionByZero => "DivisionByZero",
            Fault::UnknownOpcode { .. } => "UnknownOpcode",
            Fault::IoContractViolation { .. } => "IOContractViolation",
            Fault::AllocationFailed { .. } => "AllocationFailed",
            Fault::Console { .. } => "Console",
        }
    }
}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Self {
        Fault::Console {
            message: e.to_string(),
        }
    }
}

/// Machine state captured when a fault stops a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Program counter of the faulting instruction.
    pub pc: u32,
    /// The instruction word, if the fault happened after fetch.
    pub word: Option<u32>,
    /// Register file at the stopping point (no partial effects applied).
    pub registers: RegisterFile,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.word {
            Some(word) => writeln!(f, "instruction 0x{:08X}: {}", word, describe(word))?,
            None => writeln!(f, "instruction: <not fetched>")?,
        }
        write!(f, "PC={} {}", self.pc, self.registers)
    }
}

/// A fault together with the state of the machine that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{fault}")]
pub struct MachineFault {
    /// What went wrong.
    pub fault: Fault,
    /// Where it went wrong.
    pub snapshot: Snapshot,
}

impl MachineFault {
    /// Multi-line diagnostic for the error stream.
    pub fn report(&self) -> String {
        format!("fault {}: {}\n{}", self.fault.kind(), self.fault, self.snapshot)
    }
}
