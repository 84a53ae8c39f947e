//! Run harness for UM-32 programs.
//!
//! Wraps a [`Machine`] with the options a front end cares about (tracing,
//! instruction budget, allocation policy) and collects run statistics.
//!
//! # Example
//!
//! ```
//! use um32_emu::device::BufferConsole;
//! use um32_emu::interpreter::core::RunOutcome;
//! use um32_emu::interpreter::runner::{RunOptions, Runner};
//! use um32_emu::parser::Program;
//!
//! // R[0] := 'H'; output R[0]; halt
//! let program = Program::from_words(vec![0xD000_0048, 0xA000_0000, 0x7000_0000])?;
//! let mut runner = Runner::new(program, BufferConsole::default(), RunOptions::default());
//!
//! assert_eq!(runner.run()?, RunOutcome::Halted);
//! assert_eq!(runner.machine().console().output(), b"H");
//! assert_eq!(runner.stats().instructions, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::device::{AllocationPolicy, ArrayStats, StdConsole};
use crate::interpreter::core::{Machine, RunOutcome};
use crate::interpreter::decode::Opcode;
use crate::interpreter::execute::NUM_OPCODES;
use crate::interpreter::traits::{Console, MachineFault};
use crate::parser::Program;

/// Options for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Write an instruction trace to stderr.
    pub trace: bool,
    /// Stop after this many instructions.
    pub max_instructions: Option<u64>,
    /// Array id reuse policy.
    pub allocation: AllocationPolicy,
}

impl RunOptions {
    /// Options from the layered configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            trace: config.trace(),
            max_instructions: config.max_instructions(),
            allocation: config.allocation(),
        }
    }
}

/// Counters gathered over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Instructions completed.
    pub instructions: u64,
    /// Allocation counters.
    pub arrays: ArrayStats,
    /// Arrays live at the end of the run.
    pub live_arrays: usize,
    /// Completed instructions per operator number.
    pub opcode_counts: [u64; NUM_OPCODES],
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "instructions:     {}", self.instructions)?;
        writeln!(
            f,
            "arrays allocated: {} ({} reused)",
            self.arrays.allocated, self.arrays.reused
        )?;
        writeln!(f, "arrays abandoned: {}", self.arrays.abandoned)?;
        writeln!(f, "peak live arrays: {}", self.arrays.peak_live)?;
        writeln!(f, "live arrays:      {}", self.live_arrays)?;
        writeln!(f, "program loads:    {}", self.arrays.program_loads)?;
        write!(f, "instruction mix:")?;
        for (bits, &count) in self.opcode_counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            if let Some(opcode) = Opcode::from_bits(bits as u8) {
                write!(f, "\n  {:<9}{}", opcode.mnemonic(), count)?;
            }
        }
        Ok(())
    }
}

/// Runs one program to completion under a set of options.
pub struct Runner<C: Console> {
    machine: Machine<C>,
    options: RunOptions,
}

impl Runner<StdConsole> {
    /// Load a program file and attach it to the process console.
    pub fn from_file<P: AsRef<Path>>(path: P, options: RunOptions) -> Result<Self> {
        let program = Program::from_file(path)?;
        Ok(Self::new(program, StdConsole::new(), options))
    }
}

impl<C: Console> Runner<C> {
    /// Build a machine for `program` configured by `options`.
    pub fn new(program: Program, console: C, options: RunOptions) -> Self {
        let mut machine = Machine::new(program, console).with_policy(options.allocation);
        if options.trace {
            machine = machine.with_trace(std::io::stderr());
        }
        Self { machine, options }
    }

    /// Options this runner was built with.
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Get a reference to the underlying machine.
    pub fn machine(&self) -> &Machine<C> {
        &self.machine
    }

    /// Get a mutable reference to the underlying machine.
    pub fn machine_mut(&mut self) -> &mut Machine<C> {
        &mut self.machine
    }

    /// Run until halt, fault, or the instruction budget runs out.
    ///
    /// The budget counts from the start of this call, so a run that ended in
    /// `BudgetExhausted` can be continued by calling `run` again.
    pub fn run(&mut self) -> Result<RunOutcome, MachineFault> {
        self.machine.run(self.options.max_instructions)
    }

    /// Counters for the run so far.
    pub fn stats(&self) -> RunStats {
        RunStats {
            instructions: self.machine.instructions(),
            arrays: self.machine.memory().stats(),
            live_arrays: self.machine.memory().live_count(),
            opcode_counts: *self.machine.executor().opcode_counts(),
        }
    }

    /// Consume the runner, returning its machine.
    pub fn into_machine(self) -> Machine<C> {
        self.machine
    }
}
