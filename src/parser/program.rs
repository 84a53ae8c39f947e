//! Program image loading.
//!
//! # Format
//!
//! ```text
//! +----------+----------+----------+-----
//! | word 0   | word 1   | word 2   | ...
//! | (BE u32) | (BE u32) | (BE u32) |
//! +----------+----------+----------+-----
//! ```
//!
//! The file length must be a positive multiple of four bytes. Word `i` of
//! the file becomes platter `i` of the program array.
//!
//! # Example
//!
//! ```
//! use um32_emu::parser::Program;
//!
//! let program = Program::parse(&[0x70, 0x00, 0x00, 0x00])?;
//! assert_eq!(program.words(), &[0x7000_0000]);
//! # Ok::<(), um32_emu::interpreter::Fault>(())
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{BigEndian, ByteOrder};

use crate::interpreter::traits::Fault;

/// Size of one platter in bytes.
pub const WORD_SIZE: usize = 4;

/// A validated program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    words: Vec<u32>,
}

impl Program {
    /// Decode a byte buffer of big-endian platters.
    pub fn parse(data: &[u8]) -> Result<Self, Fault> {
        if data.is_empty() || data.len() % WORD_SIZE != 0 {
            return Err(Fault::InvalidProgramSize { len: data.len() });
        }

        let mut words = vec![0u32; data.len() / WORD_SIZE];
        BigEndian::read_u32_into(data, &mut words);
        Ok(Self { words })
    }

    /// Build a program from already-decoded platters.
    pub fn from_words(words: Vec<u32>) -> Result<Self, Fault> {
        if words.is_empty() {
            return Err(Fault::InvalidProgramSize { len: 0 });
        }
        Ok(Self { words })
    }

    /// Read and decode a program file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&data).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Encode back to the on-disk format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.byte_len()];
        BigEndian::write_u32_into(&self.words, &mut bytes);
        bytes
    }

    /// Program platters.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Consume the program, returning its platters.
    pub fn into_words(self) -> Vec<u32> {
        self.words
    }

    /// Number of platters.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a validated program.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Size of the image in bytes.
    pub fn byte_len(&self) -> usize {
        self.words.len() * WORD_SIZE
    }
}
