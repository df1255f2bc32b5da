//! Property-based tests for the lowering table.
//!
//! Every entry is run on the reference primitive bank with random register
//! contents, in both vector lengths.

use hvx_shuffle::core::{ElemWidth, TargetConfig, Vector, VectorLength};
use hvx_shuffle::hvx::typed::{Byte, Half, Hvx128Pair, Hvx64Pair, Word};
use hvx_shuffle::table::{EntryKey, LoweringTable, Operation};
use proptest::prelude::*;

/// Granules for the largest register pair; shorter modes take a prefix.
const MAX_PAIR_GRANULES: usize = 64;

fn granules() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), MAX_PAIR_GRANULES)
}

fn vector_length() -> impl Strategy<Value = VectorLength> {
    prop_oneof![Just(VectorLength::B64), Just(VectorLength::B128)]
}

fn width() -> impl Strategy<Value = ElemWidth> {
    prop_oneof![Just(ElemWidth::Word), Just(ElemWidth::Half), Just(ElemWidth::Byte)]
}

fn narrow_width() -> impl Strategy<Value = ElemWidth> {
    prop_oneof![Just(ElemWidth::Half), Just(ElemWidth::Byte)]
}

fn pair_input(table: &LoweringTable, elem: ElemWidth, granules: &[u32]) -> Vector {
    let n = table.config().pair().granules();
    Vector::from_granules(elem, granules[..n].to_vec())
}

fn run(table: &LoweringTable, op: Operation, width: ElemWidth, input: &Vector) -> Vector {
    table
        .evaluate(EntryKey::new(op, width), input)
        .unwrap_or_else(|e| panic!("{op}.{width}: {e}"))
}

// =============================================================================
// Inverse Properties
// =============================================================================

proptest! {
    /// deinterleave(interleave(v)) = v
    #[test]
    fn prop_interleave_then_deinterleave(len in vector_length(), w in width(), g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(len)).unwrap();
        let v = pair_input(&table, w, &g);
        let mixed = run(&table, Operation::Interleave, w, &v);
        prop_assert_eq!(run(&table, Operation::Deinterleave, w, &mixed), v);
    }

    /// interleave(deinterleave(v)) = v
    #[test]
    fn prop_deinterleave_then_interleave(len in vector_length(), w in width(), g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(len)).unwrap();
        let v = pair_input(&table, w, &g);
        let split = run(&table, Operation::Deinterleave, w, &v);
        prop_assert_eq!(run(&table, Operation::Interleave, w, &split), v);
    }
}

// =============================================================================
// Lane Placement Properties
// =============================================================================

proptest! {
    /// Lane 2k comes from the low register, lane 2k+1 from the high one.
    #[test]
    fn prop_interleave_lane_placement(len in vector_length(), w in width(), g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(len)).unwrap();
        let v = pair_input(&table, w, &g);
        let out = run(&table, Operation::Interleave, w, &v);
        let half = v.lane_count() / 2;
        for k in 0..half {
            prop_assert_eq!(out.lane(2 * k), v.lane(k));
            prop_assert_eq!(out.lane(2 * k + 1), v.lane(half + k));
        }
    }

    /// Even lanes land in the low register, odd lanes in the high one.
    #[test]
    fn prop_deinterleave_lane_placement(len in vector_length(), w in width(), g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(len)).unwrap();
        let v = pair_input(&table, w, &g);
        let out = run(&table, Operation::Deinterleave, w, &v);
        let half = v.lane_count() / 2;
        for k in 0..half {
            prop_assert_eq!(out.lane(k), v.lane(2 * k));
            prop_assert_eq!(out.lane(half + k), v.lane(2 * k + 1));
        }
    }

    /// trunchi keeps the upper half of every wider element, trunclo the lower.
    #[test]
    fn prop_truncation_halves(len in vector_length(), w in narrow_width(), g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(len)).unwrap();
        let wide = w.wider().unwrap();
        let x = pair_input(&table, wide, &g);

        let hi = run(&table, Operation::TruncHi, w, &x);
        let lo = run(&table, Operation::TruncLo, w, &x);
        prop_assert_eq!(hi.lane_count(), x.lane_count());
        for i in 0..x.lane_count() {
            prop_assert_eq!(hi.lane(i), x.lane(i) >> w.bits());
            prop_assert_eq!(lo.lane(i), x.lane(i) & w.mask());
        }
    }

    /// The same input always produces the same output.
    #[test]
    fn prop_entries_are_pure(len in vector_length(), g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(len)).unwrap();
        for lowering in table.iter() {
            let input = pair_input(&table, lowering.param_type().elem, &g);
            let first = run(&table, lowering.key().op, lowering.key().width, &input);
            let second = run(&table, lowering.key().op, lowering.key().width, &input);
            prop_assert_eq!(first, second);
        }
    }
}

// =============================================================================
// Typed Registers Agree With The Table
// =============================================================================

proptest! {
    #[test]
    fn prop_typed_interleave_half_64(g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(VectorLength::B64)).unwrap();
        let v = pair_input(&table, ElemWidth::Half, &g);
        let typed = Hvx64Pair::<Half>::try_from_vector(&v).unwrap();
        prop_assert_eq!(
            typed.interleave().to_vector(),
            run(&table, Operation::Interleave, ElemWidth::Half, &v)
        );
    }

    #[test]
    fn prop_typed_deinterleave_byte_128(g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(VectorLength::B128)).unwrap();
        let v = pair_input(&table, ElemWidth::Byte, &g);
        let typed = Hvx128Pair::<Byte>::try_from_vector(&v).unwrap();
        prop_assert_eq!(
            typed.deinterleave().to_vector(),
            run(&table, Operation::Deinterleave, ElemWidth::Byte, &v)
        );
    }

    #[test]
    fn prop_typed_truncate_word_64(g in granules()) {
        let table = LoweringTable::build(&TargetConfig::new(VectorLength::B64)).unwrap();
        let v = pair_input(&table, ElemWidth::Word, &g);
        let typed = Hvx64Pair::<Word>::try_from_vector(&v).unwrap();
        prop_assert_eq!(
            typed.trunchi().to_vector(),
            run(&table, Operation::TruncHi, ElemWidth::Half, &v)
        );
        prop_assert_eq!(
            typed.trunclo().to_vector(),
            run(&table, Operation::TruncLo, ElemWidth::Half, &v)
        );
    }
}
