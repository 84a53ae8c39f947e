//! Register file for the UM-32.
//!
//! Eight 32-bit general purpose registers (R[0]-R[7]), addressed by the
//! 3-bit operand fields of an instruction word. All registers start at zero.

use std::fmt;

/// Number of general purpose registers.
pub const NUM_REGS: usize = 8;

/// Mask for 3-bit register operands.
const REG_MASK: u8 = 0x07;

/// General purpose register file.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; NUM_REGS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Create a new zeroed register file.
    pub const fn new() -> Self {
        Self {
            regs: [0; NUM_REGS],
        }
    }

    /// Create a register file with the given contents.
    pub const fn from_values(regs: [u32; NUM_REGS]) -> Self {
        Self { regs }
    }

    /// Read a register (0-7).
    #[inline]
    pub fn read(&self, reg: u8) -> u32 {
        self.regs[(reg & REG_MASK) as usize]
    }

    /// Write a register (0-7).
    #[inline]
    pub fn write(&mut self, reg: u8, value: u32) {
        self.regs[(reg & REG_MASK) as usize] = value;
    }

    /// Get all registers (for debugging/display).
    pub fn as_slice(&self) -> &[u32; NUM_REGS] {
        &self.regs
    }

    /// Zero every register.
    pub fn clear(&mut self) {
        self.regs = [0; NUM_REGS];
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only show non-zero registers
        let non_zero: Vec<_> = self
            .regs
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .collect();

        if non_zero.is_empty() {
            write!(f, "RegisterFile {{ all zero }}")
        } else {
            write!(f, "RegisterFile {{ ")?;
            for (i, (reg, val)) in non_zero.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "r{}: 0x{:08X}", reg, val)?;
            }
            write!(f, " }}")
        }
    }
}

/// Trace form: `R[0]=<v> R[1]=<v> ... R[7]=<v>`.
impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, val) in self.regs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "R[{}]={}", i, val)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_start_zeroed() {
        let regs = RegisterFile::new();
        assert_eq!(regs.as_slice(), &[0; NUM_REGS]);
    }

    #[test]
    fn test_read_write() {
        let mut regs = RegisterFile::new();
        regs.write(7, 0xDEAD_BEEF);
        assert_eq!(regs.read(7), 0xDEAD_BEEF);
        assert_eq!(regs.read(6), 0);
    }

    #[test]
    fn test_registers_do_not_alias() {
        let mut regs = RegisterFile::new();
        for r in 0..NUM_REGS as u8 {
            regs.write(r, r as u32 * 10);
        }
        for r in 0..NUM_REGS as u8 {
            assert_eq!(regs.read(r), r as u32 * 10);
        }
    }

    #[test]
    fn test_debug_shows_non_zero_only() {
        let mut regs = RegisterFile::new();
        assert_eq!(format!("{:?}", regs), "RegisterFile { all zero }");

        regs.write(2, 0x10);
        assert_eq!(format!("{:?}", regs), "RegisterFile { r2: 0x00000010 }");
    }

    #[test]
    fn test_display_lists_every_register() {
        let mut regs = RegisterFile::new();
        regs.write(1, 72);
        assert_eq!(
            regs.to_string(),
            "R[0]=0 R[1]=72 R[2]=0 R[3]=0 R[4]=0 R[5]=0 R[6]=0 R[7]=0"
        );
    }
}
