//! Composition rules for every table entry.
//!
//! Byte and half-word entries bitcast onto the word-granule pair first, so
//! all of them share one split; they differ only in the shuffle control
//! constant or in which width-specific pack they call.

use crate::core::{ElemWidth, LoweringError, LoweringResult, TargetConfig};
use crate::hvx::primitives::{Parity, Primitive};

use super::lowering::{Lowering, LoweringBuilder, ValueId};
use super::{EntryKey, Operation};

type Composer = fn(&mut LoweringBuilder<'_>, ElemWidth) -> LoweringResult<ValueId>;

macro_rules! lowering_table {
    ($($op:ident => $compose:path, [$($width:ident),+ $(,)?];)+) => {
        /// Every entry the table declares, in emission order.
        pub const ENTRIES: &[EntryKey] = &[
            $($(EntryKey::new(Operation::$op, ElemWidth::$width),)+)+
        ];

        /// Expand one entry under `config`.
        ///
        /// Undeclared entries are refused; nothing is approximated.
        pub fn compose(config: &TargetConfig, key: EntryKey) -> LoweringResult<Lowering> {
            match (key.op, key.width) {
                $($((Operation::$op, ElemWidth::$width) => instantiate(config, key, $compose),)+)+
                _ => Err(LoweringError::UnsupportedEntry {
                    op: key.op.name(),
                    width: key.width.suffix(),
                }),
            }
        }
    };
}

lowering_table! {
    Interleave => interleave, [Word, Half, Byte];
    Deinterleave => deinterleave, [Word, Half, Byte];
    TruncHi => trunchi, [Half, Byte];
    TruncLo => trunclo, [Half, Byte];
}

fn instantiate(
    config: &TargetConfig,
    key: EntryKey,
    composer: Composer,
) -> LoweringResult<Lowering> {
    let (param, result) = key.signature(config)?;
    let mut builder = LoweringBuilder::new(config, key, param);
    let ret = composer(&mut builder, key.width)?;
    let lowering = builder.finish(ret, result)?;
    log::debug!(
        "{}: {} -> {} via {:?}",
        lowering.symbol(),
        lowering.param_type(),
        lowering.result_type(),
        lowering.primitives()
    );
    Ok(lowering)
}

/// Name for a word-typed intermediate that is bitcast back to `width` afterwards.
fn word_name(width: ElemWidth, name: &'static str, word: &'static str) -> &'static str {
    if width == ElemWidth::Word {
        name
    } else {
        word
    }
}

/// `vshuffvdd(hi, lo, -bytes)`: lane `2k` from the low register, `2k+1` from the high.
fn interleave(b: &mut LoweringBuilder<'_>, width: ElemWidth) -> LoweringResult<ValueId> {
    let arg = b.arg();
    let words = b.view_as(arg, ElemWidth::Word, "arg_32");
    let (e, o) = b.split(words, "e", "o")?;
    let r = b.call(
        Primitive::ShuffleVdd,
        &[o, e],
        Some(width.shuffle_control()),
        word_name(width, "r", "r_32"),
    )?;
    Ok(b.view_as(r, width, "r"))
}

/// Even lanes into the low register, odd lanes into the high one.
///
/// `vcombine` places its second operand low, hence `vcombine(odd, even)`.
/// Words have no native pack and use `vdealvdd` instead.
fn deinterleave(b: &mut LoweringBuilder<'_>, width: ElemWidth) -> LoweringResult<ValueId> {
    let arg = b.arg();
    let words = b.view_as(arg, ElemWidth::Word, "arg_32");
    let (lo, hi) = b.split(words, "lo", "hi")?;

    let r = if width == ElemWidth::Word {
        b.call(Primitive::DealVdd, &[hi, lo], Some(width.shuffle_control()), "r")?
    } else {
        let even = b.call(Primitive::pack(Parity::Even, width)?, &[hi, lo], None, "e")?;
        let odd = b.call(Primitive::pack(Parity::Odd, width)?, &[hi, lo], None, "o")?;
        b.call(Primitive::Combine, &[odd, even], None, "r_32")?
    };
    Ok(b.view_as(r, width, "r"))
}

/// Narrow `width.wider()` elements to `width`, keeping the `parity` sub-lane.
fn truncate(
    b: &mut LoweringBuilder<'_>,
    width: ElemWidth,
    parity: Parity,
) -> LoweringResult<ValueId> {
    let arg = b.arg();
    let words = b.view_as(arg, ElemWidth::Word, "arg_32");
    let (lo, hi) = b.split(words, "lo", "hi")?;
    let r = b.call(Primitive::pack(parity, width)?, &[hi, lo], None, "r_32")?;
    Ok(b.view_as(r, width, "r"))
}

/// The upper sub-lane of a little-endian element is the odd one.
fn trunchi(b: &mut LoweringBuilder<'_>, width: ElemWidth) -> LoweringResult<ValueId> {
    truncate(b, width, Parity::Odd)
}

fn trunclo(b: &mut LoweringBuilder<'_>, width: ElemWidth) -> LoweringResult<ValueId> {
    truncate(b, width, Parity::Even)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hvx::primitives::PackLane;

    #[test]
    fn test_declared_entries() {
        let names: Vec<String> = ENTRIES.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "interleave.w",
                "interleave.h",
                "interleave.b",
                "deinterleave.w",
                "deinterleave.h",
                "deinterleave.b",
                "trunchi.h",
                "trunchi.b",
                "trunclo.h",
                "trunclo.b",
            ]
        );
    }

    #[test]
    fn test_word_truncation_is_refused() {
        let config = TargetConfig::default();
        for op in [Operation::TruncHi, Operation::TruncLo] {
            let err = compose(&config, EntryKey::new(op, ElemWidth::Word)).unwrap_err();
            assert!(matches!(err, LoweringError::UnsupportedEntry { width: "w", .. }));
        }
    }

    #[test]
    fn test_interleave_shapes() {
        let config = TargetConfig::default();
        let word = compose(&config, EntryKey::new(Operation::Interleave, ElemWidth::Word)).unwrap();
        assert_eq!(
            word.primitives(),
            vec![Primitive::Lo, Primitive::Hi, Primitive::ShuffleVdd]
        );
        // No bitcasts for words.
        assert_eq!(word.insts().len(), 3);

        let byte = compose(&config, EntryKey::new(Operation::Interleave, ElemWidth::Byte)).unwrap();
        assert_eq!(byte.insts().len(), 5);
        assert_eq!(byte.value(byte.ret()).name, "r");
    }

    #[test]
    fn test_deinterleave_uses_width_packs() {
        let config = TargetConfig::default();
        let half = compose(&config, EntryKey::new(Operation::Deinterleave, ElemWidth::Half)).unwrap();
        assert_eq!(
            half.primitives(),
            vec![
                Primitive::Lo,
                Primitive::Hi,
                Primitive::Pack { parity: Parity::Even, lane: PackLane::Half },
                Primitive::Pack { parity: Parity::Odd, lane: PackLane::Half },
                Primitive::Combine,
            ]
        );

        let word = compose(&config, EntryKey::new(Operation::Deinterleave, ElemWidth::Word)).unwrap();
        assert_eq!(
            word.primitives(),
            vec![Primitive::Lo, Primitive::Hi, Primitive::DealVdd]
        );
    }

    #[test]
    fn test_truncation_picks_sub_lane() {
        let config = TargetConfig::default();
        let hi = compose(&config, EntryKey::new(Operation::TruncHi, ElemWidth::Byte)).unwrap();
        assert_eq!(
            hi.primitives()[2],
            Primitive::Pack { parity: Parity::Odd, lane: PackLane::Byte }
        );
        let lo = compose(&config, EntryKey::new(Operation::TruncLo, ElemWidth::Half)).unwrap();
        assert_eq!(
            lo.primitives()[2],
            Primitive::Pack { parity: Parity::Even, lane: PackLane::Half }
        );
        assert_eq!(lo.result_type().llvm(), "<32 x i16>");
    }
}
