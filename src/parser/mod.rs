//! Program image parser.
//!
//! UM-32 programs ("scrolls") are flat files of big-endian 32-bit platters.
//! The parser validates the size and produces the words that become the
//! program array.
//!
//! - [`program`] - Program image loading and validation

pub mod program;

pub use program::{Program, WORD_SIZE};
