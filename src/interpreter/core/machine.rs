//! The UM-32 machine.
//!
//! `Machine` owns all state of one running program and drives the
//! fetch-decode-dispatch loop.

use std::io::Write;

use crate::device::{AllocationPolicy, ArrayTable};
use crate::interpreter::decode::{decode, describe, Instruction};
use crate::interpreter::execute::Executor;
use crate::interpreter::state::ExecutionContext;
use crate::interpreter::traits::{Console, ExecuteResult, Fault, MachineFault, Snapshot};
use crate::parser::Program;

/// Machine execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    /// Ready to execute the instruction at PC.
    Ready,
    /// Stopped by the halt instruction.
    Halted,
    /// Stopped by a fault.
    Faulted,
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Continue with the next instruction.
    Continue,
    /// The machine has halted.
    Halt,
}

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program executed a halt instruction.
    Halted,
    /// The instruction budget ran out; the machine can be resumed.
    BudgetExhausted,
}

/// A UM-32 machine instance.
///
/// Machines share no state with each other, so any number can run in the
/// same process.
pub struct Machine<C: Console> {
    /// Registers, PC, halted flag.
    ctx: ExecutionContext,
    /// Memory arrays, array 0 being the program.
    memory: ArrayTable,
    /// Console channel.
    console: C,
    /// Dispatcher.
    executor: Executor,
    /// Set once a fault stops the machine.
    fault: Option<MachineFault>,
    /// Trace sink, if tracing is enabled.
    tracer: Option<Box<dyn Write>>,
    /// Last instruction that completed (for debugging).
    last_instruction: Option<Instruction>,
}

impl<C: Console> Machine<C> {
    /// Bootstrap a machine from a raw program image.
    pub fn boot(image: &[u8], console: C) -> Result<Self, Fault> {
        Ok(Self::new(Program::parse(image)?, console))
    }

    /// Bootstrap a machine from a parsed program.
    pub fn new(program: Program, console: C) -> Self {
        log::info!("UM-32 initialized, program {} bytes", program.byte_len());
        Self {
            ctx: ExecutionContext::new(),
            memory: ArrayTable::new(program.into_words()),
            console,
            executor: Executor::new(),
            fault: None,
            tracer: None,
            last_instruction: None,
        }
    }

    /// Select how abandoned array ids are reused.
    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.memory.set_policy(policy);
        self
    }

    /// Write an instruction trace to `sink`.
    ///
    /// Before each instruction executes, two lines are written: the decoded
    /// instruction, then the program counter and register file.
    pub fn with_trace(mut self, sink: impl Write + 'static) -> Self {
        self.tracer = Some(Box::new(sink));
        self
    }

    /// Return to the bootstrap state with a new program.
    ///
    /// The console, allocation policy, and trace sink are kept.
    pub fn reset(&mut self, program: Program) {
        let policy = self.memory.policy();
        self.ctx.reset();
        self.memory = ArrayTable::with_policy(program.into_words(), policy);
        self.executor.reset();
        self.fault = None;
        self.last_instruction = None;
    }

    /// Current status.
    pub fn status(&self) -> MachineStatus {
        if self.fault.is_some() {
            MachineStatus::Faulted
        } else if self.ctx.is_halted() {
            MachineStatus::Halted
        } else {
            MachineStatus::Ready
        }
    }

    /// Check if the machine has halted normally.
    pub fn is_halted(&self) -> bool {
        self.ctx.is_halted()
    }

    /// The fault that stopped the machine, if any.
    pub fn fault(&self) -> Option<&MachineFault> {
        self.fault.as_ref()
    }

    /// Registers, PC, and counters.
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Memory array table.
    pub fn memory(&self) -> &ArrayTable {
        &self.memory
    }

    /// Dispatcher (for the instruction mix).
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Console channel.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Mutable console channel.
    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Consume the machine, returning its console.
    pub fn into_console(self) -> C {
        self.console
    }

    /// Number of instructions completed.
    pub fn instructions(&self) -> u64 {
        self.ctx.instructions
    }

    /// Last instruction that completed.
    pub fn last_instruction(&self) -> Option<&Instruction> {
        self.last_instruction.as_ref()
    }

    /// Execute a single instruction.
    ///
    /// A faulting instruction leaves registers, arrays, and PC as they were
    /// before it was fetched. Once halted or faulted, the machine stays that
    /// way.
    pub fn step(&mut self) -> Result<StepResult, MachineFault> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.ctx.is_halted() {
            return Ok(StepResult::Halt);
        }

        // Fetch
        let pc = self.ctx.pc();
        let word = match self.memory.fetch(pc) {
            Ok(word) => word,
            Err(fault) => return Err(self.fail(fault, pc, None)),
        };
        self.trace(word);

        // Decode
        let instr = match decode(word) {
            Ok(instr) => instr,
            Err(fault) => return Err(self.fail(fault, pc, Some(word))),
        };

        // Execute
        let result = self.executor.execute(
            &instr,
            &mut self.ctx,
            &mut self.memory,
            &mut self.console,
        );
        let result = match result {
            Ok(result) => result,
            Err(fault) => return Err(self.fail(fault, pc, Some(word))),
        };

        self.ctx.instructions += 1;
        self.last_instruction = Some(instr);

        match result {
            ExecuteResult::Continue => {
                self.ctx.advance_pc();
                Ok(StepResult::Continue)
            }

            ExecuteResult::Jump { target } => {
                self.ctx.set_pc(target);
                Ok(StepResult::Continue)
            }

            ExecuteResult::Halt => {
                self.ctx.advance_pc();
                self.ctx.halt();
                if let Err(e) = self.console.flush() {
                    return Err(self.fail(e.into(), pc, Some(word)));
                }
                log::info!("Program halted after {} instructions", self.ctx.instructions);
                Ok(StepResult::Halt)
            }
        }
    }

    /// Run until halt, fault, or `limit` instructions have completed.
    pub fn run(&mut self, limit: Option<u64>) -> Result<RunOutcome, MachineFault> {
        let start = self.ctx.instructions;
        loop {
            if let Some(max) = limit {
                if self.ctx.instructions - start >= max {
                    return Ok(RunOutcome::BudgetExhausted);
                }
            }
            if self.step()? == StepResult::Halt {
                return Ok(RunOutcome::Halted);
            }
        }
    }

    /// Run until halt or fault, returning the number of instructions executed.
    pub fn run_to_halt(&mut self) -> Result<u64, MachineFault> {
        let start = self.ctx.instructions;
        self.run(None)?;
        Ok(self.ctx.instructions - start)
    }

    fn trace(&mut self, word: u32) {
        if let Some(tracer) = self.tracer.as_mut() {
            // Tracing is observational; a broken sink must not stop the machine
            let _ = writeln!(tracer, "{}", describe(word));
            let _ = writeln!(tracer, "{}", self.ctx.state_line());
        }
    }

    fn fail(&mut self, fault: Fault, pc: u32, word: Option<u32>) -> MachineFault {
        // Output produced before the fault still belongs to the user
        let _ = self.console.flush();

        let err = MachineFault {
            fault,
            snapshot: Snapshot {
                pc,
                word,
                registers: self.ctx.registers.clone(),
            },
        };
        log::debug!("Machine fault at PC {}: {}", pc, err.fault);
        self.fault = Some(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::BufferConsole;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    const HALT: u32 = 0x7000_0000;

    fn ortho(a: u32, value: u32) -> u32 {
        (13 << 28) | (a << 25) | value
    }

    fn op(opcode: u32, a: u32, b: u32, c: u32) -> u32 {
        (opcode << 28) | (a << 6) | (b << 3) | c
    }

    fn machine(words: &[u32]) -> Machine<BufferConsole> {
        Machine::new(Program::from_words(words.to_vec()).unwrap(), BufferConsole::default())
    }

    /// Shared buffer so tests can read back what the tracer wrote.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_boot_state() {
        let m = machine(&[HALT]);
        assert_eq!(m.status(), MachineStatus::Ready);
        assert_eq!(m.context().pc(), 0);
        assert_eq!(m.memory().program(), &[HALT]);
        assert_eq!(m.instructions(), 0);
    }

    #[test]
    fn test_boot_rejects_bad_size() {
        let result = Machine::boot(&[0x70, 0x00, 0x00], BufferConsole::default());
        assert!(matches!(result, Err(Fault::InvalidProgramSize { len: 3 })));
    }

    #[test]
    fn test_step_advances_pc() {
        let mut m = machine(&[ortho(0, 1), ortho(1, 2), HALT]);

        assert_eq!(m.step(), Ok(StepResult::Continue));
        assert_eq!(m.context().pc(), 1);
        assert_eq!(m.step(), Ok(StepResult::Continue));
        assert_eq!(m.context().pc(), 2);
        assert_eq!(m.step(), Ok(StepResult::Halt));
        assert_eq!(m.instructions(), 3);
        assert_eq!(m.status(), MachineStatus::Halted);
    }

    #[test]
    fn test_halted_stays_halted() {
        let mut m = machine(&[HALT, ortho(0, 5)]);
        m.run_to_halt().unwrap();

        assert_eq!(m.step(), Ok(StepResult::Halt));
        assert_eq!(m.context().registers.read(0), 0);
        assert_eq!(m.instructions(), 1);
    }

    #[test]
    fn test_pc_past_end_faults() {
        let mut m = machine(&[ortho(0, 1)]);
        let err = m.run_to_halt().unwrap_err();

        assert_eq!(err.fault, Fault::OutOfBounds { array: 0, offset: 1, len: 1 });
        assert_eq!(err.snapshot.pc, 1);
        assert_eq!(err.snapshot.word, None);
        assert_eq!(err.snapshot.registers.read(0), 1);
        assert_eq!(m.status(), MachineStatus::Faulted);
    }

    #[test]
    fn test_fault_is_sticky() {
        let mut m = machine(&[0xE000_0000]);
        let first = m.step().unwrap_err();
        let second = m.step().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.fault, Fault::UnknownOpcode { opcode: 14 });
        assert_eq!(m.fault(), Some(&first));
    }

    #[test]
    fn test_fault_leaves_pc_at_instruction() {
        // R[0] := 1; R[0] := R[0] / R[1]
        let mut m = machine(&[ortho(0, 1), op(5, 0, 0, 1)]);
        let err = m.run_to_halt().unwrap_err();

        assert_eq!(err.fault, Fault::DivisionByZero);
        assert_eq!(err.snapshot.pc, 1);
        assert_eq!(err.snapshot.word, Some(op(5, 0, 0, 1)));
        assert_eq!(m.context().pc(), 1);
        assert_eq!(m.context().registers.read(0), 1);
    }

    #[test]
    fn test_run_with_budget() {
        // Load program 0 at offset 0: an endless loop
        let mut m = machine(&[op(12, 0, 0, 0)]);

        assert_eq!(m.run(Some(10)), Ok(RunOutcome::BudgetExhausted));
        assert_eq!(m.instructions(), 10);

        // Resumable
        assert_eq!(m.run(Some(5)), Ok(RunOutcome::BudgetExhausted));
        assert_eq!(m.instructions(), 15);
    }

    #[test]
    fn test_load_program_redirects_fetch() {
        // Build a new array [R[0] := 'A', output R[0], halt], then jump into it
        let mut words = vec![
            ortho(1, 3),    // R[1] := 3
            op(8, 0, 2, 1), // R[2] := alloc(3)
        ];
        let body = [ortho(0, 65), op(10, 0, 0, 0), HALT];
        for (i, &word) in body.iter().enumerate() {
            // R[4] := word, split to fit the 25-bit value: high then low
            words.push(ortho(4, word >> 16));
            words.push(ortho(5, 1 << 16));
            words.push(op(4, 4, 4, 5)); // R[4] := R[4] * 65536
            words.push(ortho(5, word & 0xFFFF));
            words.push(op(3, 4, 4, 5)); // R[4] := R[4] + R[5]
            words.push(ortho(6, i as u32));
            words.push(op(2, 2, 6, 4)); // array[R[2]][R[6]] := R[4]
        }
        words.push(ortho(7, 0));
        words.push(op(12, 0, 2, 7)); // load array R[2], PC := R[7]

        let mut m = machine(&words);
        m.run_to_halt().unwrap();

        assert_eq!(m.console().output(), b"A");
        assert_eq!(m.memory().program(), &body);
        assert_eq!(m.memory().stats().program_loads, 1);
    }

    #[test]
    fn test_trace_lines() {
        let buf = SharedBuf::default();
        let mut m = machine(&[ortho(0, 72), HALT]).with_trace(buf.clone());
        m.run_to_halt().unwrap();

        let trace = String::from_utf8(buf.0.borrow().clone()).unwrap();
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(
            lines,
            vec![
                "orthog\tA:0\tvalue:72",
                "PC=0 R[0]=0 R[1]=0 R[2]=0 R[3]=0 R[4]=0 R[5]=0 R[6]=0 R[7]=0",
                "halt\tA:0\tB:0\tC:0",
                "PC=1 R[0]=72 R[1]=0 R[2]=0 R[3]=0 R[4]=0 R[5]=0 R[6]=0 R[7]=0",
            ]
        );
    }

    #[test]
    fn test_reset() {
        let mut m = machine(&[0xF000_0000]);
        assert!(m.step().is_err());

        m.reset(Program::from_words(vec![HALT]).unwrap());
        assert_eq!(m.status(), MachineStatus::Ready);
        assert_eq!(m.run_to_halt(), Ok(1));
    }

    #[test]
    fn test_independent_machines() {
        let mut a = machine(&[ortho(0, 1), op(8, 0, 1, 0), HALT]);
        let mut b = machine(&[ortho(0, 1), op(8, 0, 1, 0), HALT]);
        a.run_to_halt().unwrap();
        b.run_to_halt().unwrap();

        assert_eq!(a.context().registers.read(1), 1);
        assert_eq!(b.context().registers.read(1), 1);
        assert_eq!(a.memory().live_count(), 2);
        assert_eq!(b.memory().live_count(), 2);
    }

    #[test]
    fn test_monotonic_policy() {
        // alloc, abandon, alloc: reuse gives the same id, monotonic a new one
        let words = [
            ortho(0, 1),
            op(8, 0, 1, 0), // R[1] := alloc(1)
            op(9, 0, 0, 1), // abandon R[1]
            op(8, 0, 2, 0), // R[2] := alloc(1)
            HALT,
        ];

        let mut reuse = machine(&words);
        reuse.run_to_halt().unwrap();
        assert_eq!(reuse.context().registers.read(2), 1);

        let mut mono = machine(&words).with_policy(AllocationPolicy::Monotonic);
        mono.run_to_halt().unwrap();
        assert_eq!(mono.context().registers.read(2), 2);
    }
}
