//! Memory array table for the UM-32.
//!
//! The machine's memory is a collection of independently sized arrays of
//! platters, each named by a 32-bit id. Array 0 holds the running program.
//!
//! # Allocation
//!
//! ```text
//!            allocate(n)                      abandon(id)
//!   free list empty? ── yes ──> mint id = table length
//!          │ no
//!          └──> pop most recently abandoned id
//! ```
//!
//! Abandoned ids go onto a free list and are handed out again by later
//! allocations, so programs that allocate and abandon in a loop keep a
//! bounded table. The `Monotonic` policy disables reuse for comparison
//! against implementations that never recycle ids.
//!
//! # Usage
//!
//! ```
//! use um32_emu::device::ArrayTable;
//!
//! let mut table = ArrayTable::new(vec![0x7000_0000]);
//!
//! let id = table.allocate(4).unwrap();
//! table.write(id, 2, 0xCAFE).unwrap();
//! assert_eq!(table.read(id, 2).unwrap(), 0xCAFE);
//!
//! table.abandon(id).unwrap();
//! assert_eq!(table.allocate(8).unwrap(), id); // id reused
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::interpreter::traits::Fault;

/// Id of the program array.
pub const PROGRAM_ARRAY: u32 = 0;

/// How abandoned ids are handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// Reuse abandoned ids, most recently abandoned first.
    #[default]
    Reuse,
    /// Never reuse ids; the table only grows.
    Monotonic,
}

impl FromStr for AllocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reuse" => Ok(Self::Reuse),
            "monotonic" => Ok(Self::Monotonic),
            other => Err(format!("unknown allocation policy '{}'", other)),
        }
    }
}

/// One array of platters plus its liveness flag.
#[derive(Debug, Clone, Default)]
pub struct MemoryArray {
    words: Vec<u32>,
    live: bool,
}

impl MemoryArray {
    fn live(words: Vec<u32>) -> Self {
        Self { words, live: true }
    }

    /// Length in words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the array has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check if the array is allocated and not abandoned.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Contents of the array.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

/// Allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayStats {
    /// Successful allocations.
    pub allocated: u64,
    /// Allocations satisfied from the free list.
    pub reused: u64,
    /// Successful abandons.
    pub abandoned: u64,
    /// Highest number of simultaneously live arrays (program array included).
    pub peak_live: usize,
    /// Load-program operations, including loads of array 0 itself.
    pub program_loads: u64,
}

/// Id-indexed table of memory arrays.
#[derive(Debug, Clone)]
pub struct ArrayTable {
    /// Index = array id.
    arrays: Vec<MemoryArray>,
    /// Abandoned ids awaiting reuse.
    free: Vec<u32>,
    /// Number of live arrays.
    live: usize,
    policy: AllocationPolicy,
    stats: ArrayStats,
}

impl ArrayTable {
    /// Create a table whose program array holds `program`.
    pub fn new(program: Vec<u32>) -> Self {
        Self::with_policy(program, AllocationPolicy::default())
    }

    /// Create a table with an explicit allocation policy.
    pub fn with_policy(program: Vec<u32>, policy: AllocationPolicy) -> Self {
        Self {
            arrays: vec![MemoryArray::live(program)],
            free: Vec::new(),
            live: 1,
            policy,
            stats: ArrayStats {
                peak_live: 1,
                ..ArrayStats::default()
            },
        }
    }

    /// Allocation policy in effect.
    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Change the allocation policy.
    ///
    /// Switching to `Monotonic` drops any pending free ids.
    pub fn set_policy(&mut self, policy: AllocationPolicy) {
        if policy == AllocationPolicy::Monotonic {
            self.free.clear();
        }
        self.policy = policy;
    }

    /// Allocation counters.
    pub fn stats(&self) -> ArrayStats {
        self.stats
    }

    /// Number of live arrays, program array included.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of ids ever minted (the table's high-water mark).
    pub fn capacity(&self) -> usize {
        self.arrays.len()
    }

    /// Contents of the program array.
    pub fn program(&self) -> &[u32] {
        &self.arrays[PROGRAM_ARRAY as usize].words
    }

    /// Fetch the platter at `pc` from the program array.
    #[inline]
    pub fn fetch(&self, pc: u32) -> Result<u32, Fault> {
        let program = self.program();
        program.get(pc as usize).copied().ok_or(Fault::OutOfBounds {
            array: PROGRAM_ARRAY,
            offset: pc,
            len: program.len(),
        })
    }

    /// Check if `id` names a live array.
    pub fn is_live(&self, id: u32) -> bool {
        self.arrays
            .get(id as usize)
            .is_some_and(|array| array.live)
    }

    /// Look up a live array.
    pub fn array(&self, id: u32) -> Result<&MemoryArray, Fault> {
        match self.arrays.get(id as usize) {
            Some(array) if array.live => Ok(array),
            _ => Err(Fault::InvalidArrayReference { id }),
        }
    }

    /// Read `array[id][offset]`.
    pub fn read(&self, id: u32, offset: u32) -> Result<u32, Fault> {
        let array = self.array(id)?;
        array.words.get(offset as usize).copied().ok_or(Fault::OutOfBounds {
            array: id,
            offset,
            len: array.len(),
        })
    }

    /// Write `array[id][offset] := value`.
    pub fn write(&mut self, id: u32, offset: u32, value: u32) -> Result<(), Fault> {
        let array = match self.arrays.get_mut(id as usize) {
            Some(array) if array.live => array,
            _ => return Err(Fault::InvalidArrayReference { id }),
        };
        let len = array.words.len();
        let slot = array
            .words
            .get_mut(offset as usize)
            .ok_or(Fault::OutOfBounds { array: id, offset, len })?;
        *slot = value;
        Ok(())
    }

    /// Create a zeroed array of `words` platters and return its id.
    ///
    /// The id is never 0 and never names another live array.
    pub fn allocate(&mut self, words: u32) -> Result<u32, Fault> {
        let storage = Self::zeroed(words)?;

        let (id, reused) = match self.free.pop() {
            Some(id) => {
                self.arrays[id as usize] = MemoryArray::live(storage);
                (id, true)
            }
            None => {
                let id = u32::try_from(self.arrays.len())
                    .map_err(|_| Fault::AllocationFailed { words })?;
                self.arrays.push(MemoryArray::live(storage));
                (id, false)
            }
        };

        self.live += 1;
        self.stats.allocated += 1;
        if reused {
            self.stats.reused += 1;
        }
        self.stats.peak_live = self.stats.peak_live.max(self.live);

        log::debug!(
            "Allocated array {} ({} words, {})",
            id,
            words,
            if reused { "reused id" } else { "new id" }
        );
        Ok(id)
    }

    /// Abandon array `id`, releasing its storage.
    ///
    /// The program array can never be abandoned; neither can an array that
    /// is already abandoned.
    pub fn abandon(&mut self, id: u32) -> Result<(), Fault> {
        if id == PROGRAM_ARRAY {
            return Err(Fault::InvalidAbandon { id });
        }
        let array = self
            .arrays
            .get_mut(id as usize)
            .ok_or(Fault::InvalidArrayReference { id })?;
        if !array.live {
            return Err(Fault::InvalidAbandon { id });
        }

        *array = MemoryArray::default();
        self.live -= 1;
        self.stats.abandoned += 1;
        if self.policy == AllocationPolicy::Reuse {
            self.free.push(id);
        }

        log::debug!("Abandoned array {}", id);
        Ok(())
    }

    /// Replace the program array with a copy of array `id`.
    ///
    /// The source keeps its own storage; later changes to it do not reach
    /// the program array. Loading array 0 leaves it untouched.
    /// Returns the new program length in words.
    pub fn load_program(&mut self, id: u32) -> Result<usize, Fault> {
        if id == PROGRAM_ARRAY {
            self.stats.program_loads += 1;
            return Ok(self.program().len());
        }

        let source = self.array(id)?;
        let len = source.len();
        let mut copy = Vec::new();
        copy.try_reserve_exact(len)
            .map_err(|_| Fault::AllocationFailed { words: len as u32 })?;
        copy.extend_from_slice(&source.words);

        self.arrays[PROGRAM_ARRAY as usize].words = copy;
        self.stats.program_loads += 1;
        log::debug!("Loaded array {} as program ({} words)", id, len);
        Ok(len)
    }

    fn zeroed(words: u32) -> Result<Vec<u32>, Fault> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(words as usize)
            .map_err(|_| Fault::AllocationFailed { words })?;
        storage.resize(words as usize, 0);
        Ok(storage)
    }
}
