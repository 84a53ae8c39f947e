//! um32-emu library
//!
//! Emulation of the UM-32 universal machine: eight registers, a table of
//! dynamically allocated word arrays, a byte console, and fourteen operators.

pub mod config;
pub mod device;
pub mod interpreter;
pub mod parser;
