//! Device model for the UM-32.
//!
//! This module provides the machine's hardware outside the processor core:
//! - The memory array table, including the id allocator
//! - Console devices for the single-byte I/O channel
//!
//! # Memory Overview
//!
//! ```text
//!   id 0           id 1         id 2 (abandoned)   id 3
//! +-----------+  +--------+    +--------+          +----+
//! | program   |  | data   |    |  free  |          |    |
//! | (fetched) |  | words  |    |  list  |          |    |
//! +-----------+  +--------+    +--------+          +----+
//! ```
//!
//! # Example
//!
//! ```
//! use um32_emu::device::{ArrayTable, BufferConsole};
//!
//! let mut table = ArrayTable::new(vec![0x7000_0000]);
//! let id = table.allocate(16).unwrap();
//! assert!(table.is_live(id));
//!
//! let console = BufferConsole::new(b"input".to_vec());
//! assert_eq!(console.remaining_input(), 5);
//! ```

pub mod console;
pub mod memory;

pub use console::{BufferConsole, StdConsole};
pub use memory::{AllocationPolicy, ArrayStats, ArrayTable, MemoryArray, PROGRAM_ARRAY};
