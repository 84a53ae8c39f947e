//! Console devices for the machine's I/O channel.
//!
//! - [`StdConsole`]: the process's standard input and output.
//! - [`BufferConsole`]: in-memory input and captured output, for embedding
//!   and tests.
//!
//! Output from the standard console is pushed to the host before every
//! blocking read, so a prompt is visible before the machine waits for an
//! answer.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, StdinLock, StdoutLock, Write};

use crate::interpreter::traits::Console;

/// Console backed by the process's stdin and stdout.
pub struct StdConsole {
    stdin: StdinLock<'static>,
    stdout: StdoutLock<'static>,
    /// Bytes written since the last flush.
    pending: bool,
}

impl StdConsole {
    /// Lock stdin and stdout for the lifetime of the console.
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
            stdout: io::stdout().lock(),
            pending: false,
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.stdout.write_all(&[byte])?;
        self.pending = true;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pending {
            self.flush()?;
        }
        log::trace!("Waiting for console input");

        let mut buf = [0u8; 1];
        loop {
            match self.stdin.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.pending = false;
        self.stdout.flush()
    }
}

/// Console with a fixed input buffer and captured output.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl BufferConsole {
    /// Create a console that will supply `input`, then end of stream.
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into().into(),
            output: Vec::new(),
        }
    }

    /// Bytes written so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume the console and return everything written.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Number of input bytes not yet read.
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for BufferConsole {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }
}
