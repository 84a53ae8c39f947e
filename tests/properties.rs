//! UM-32 property tests
//!
//! Machine invariants under property testing:
//! 1. Arithmetic wraps modulo 2^32; nand is bitwise not-and
//! 2. Division by a nonzero divisor is unsigned; by zero it faults with no effect
//! 3. Conditional move is a no-op when the condition register is zero
//! 4. Amend then index at the same offset returns the stored value
//! 5. Abandoned ids are reused by later allocations
//! 6. Orthography loads any 25-bit value

mod common;

use common::*;
use proptest::prelude::*;
use um32_emu::device::{AllocationPolicy, ArrayTable};
use um32_emu::interpreter::Fault;

/// R[1] := x; R[2] := y; R[0] := R[1] <op> R[2]; halt
fn binary_program(opcode: u32, x: u32, y: u32) -> Vec<u32> {
    let mut words = load_const(1, 7, x);
    words.extend(load_const(2, 7, y));
    words.push(op(opcode, 0, 1, 2));
    words.push(halt());
    words
}

fn run_binary(opcode: u32, x: u32, y: u32) -> Result<u32, Fault> {
    let mut m = machine(&binary_program(opcode, x, y), b"");
    m.run_to_halt().map_err(|e| e.fault)?;
    Ok(m.context().registers.read(0))
}

proptest! {
    #[test]
    fn load_const_is_exact(value in any::<u32>()) {
        let mut words = load_const(3, 4, value);
        words.push(halt());
        let mut m = machine(&words, b"");
        m.run_to_halt().unwrap();
        prop_assert_eq!(m.context().registers.read(3), value);
    }

    #[test]
    fn add_wraps(x in any::<u32>(), y in any::<u32>()) {
        prop_assert_eq!(run_binary(ADD, x, y), Ok(x.wrapping_add(y)));
    }

    #[test]
    fn mul_wraps(x in any::<u32>(), y in any::<u32>()) {
        prop_assert_eq!(run_binary(MUL, x, y), Ok(x.wrapping_mul(y)));
    }

    #[test]
    fn nand_truth_table(x in any::<u32>(), y in any::<u32>()) {
        prop_assert_eq!(run_binary(NAND, x, y), Ok(!(x & y)));
    }

    #[test]
    fn div_unsigned(x in any::<u32>(), y in 1u32..) {
        prop_assert_eq!(run_binary(DIV, x, y), Ok(x / y));
    }

    #[test]
    fn div_by_zero_has_no_effect(x in any::<u32>()) {
        let mut words = load_const(1, 7, x);
        words.push(ortho(0, 12345));
        words.push(op(DIV, 0, 1, 2));
        words.push(halt());

        let mut m = machine(&words, b"");
        let err = m.run_to_halt().unwrap_err();
        prop_assert_eq!(err.fault, Fault::DivisionByZero);
        prop_assert_eq!(m.context().registers.read(0), 12345);
        prop_assert_eq!(m.context().registers.read(1), x);
        prop_assert_eq!(err.snapshot.pc as usize, words.len() - 2);
    }

    #[test]
    fn cmov_respects_condition(dst in any::<u32>(), src in any::<u32>(), cond in any::<u32>()) {
        let mut words = load_const(1, 7, dst);
        words.extend(load_const(2, 7, src));
        words.extend(load_const(3, 7, cond));
        words.push(op(CMOV, 1, 2, 3));
        words.push(halt());

        let mut m = machine(&words, b"");
        m.run_to_halt().unwrap();
        let expected = if cond == 0 { dst } else { src };
        prop_assert_eq!(m.context().registers.read(1), expected);
        prop_assert_eq!(m.context().registers.read(2), src);
    }

    #[test]
    fn orthography_loads_immediate(reg in 0u32..8, value in 0u32..(1 << 25)) {
        let mut m = machine(&[ortho(reg, value), halt()], b"");
        m.run_to_halt().unwrap();
        prop_assert_eq!(m.context().registers.read(reg as u8), value);
    }

    #[test]
    fn amend_then_index(len in 1u32..64, offset_seed in any::<u32>(), value in any::<u32>()) {
        let offset = offset_seed % len;
        let mut table = ArrayTable::new(vec![halt()]);
        let id = table.allocate(len).unwrap();

        table.write(id, offset, value).unwrap();
        prop_assert_eq!(table.read(id, offset), Ok(value));
        prop_assert_eq!(
            table.read(id, len),
            Err(Fault::OutOfBounds { array: id, offset: len, len: len as usize })
        );
    }

    #[test]
    fn abandoned_ids_are_reused(sizes in prop::collection::vec(0u32..16, 1..32)) {
        let mut table = ArrayTable::new(vec![halt()]);
        let ids: Vec<u32> = sizes.iter().map(|&n| table.allocate(n).unwrap()).collect();
        let high_water = table.capacity();

        for &id in &ids {
            table.abandon(id).unwrap();
        }
        prop_assert_eq!(table.live_count(), 1);

        for &n in &sizes {
            let id = table.allocate(n).unwrap();
            prop_assert!(ids.contains(&id));
            prop_assert_ne!(id, 0);
        }
        prop_assert_eq!(table.capacity(), high_water);
    }

    #[test]
    fn monotonic_never_reuses(count in 1usize..16) {
        let mut table = ArrayTable::with_policy(vec![halt()], AllocationPolicy::Monotonic);
        let mut seen = Vec::new();
        for _ in 0..count {
            let id = table.allocate(1).unwrap();
            prop_assert!(!seen.contains(&id));
            seen.push(id);
            table.abandon(id).unwrap();
        }
    }
}
