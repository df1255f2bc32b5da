// This module is the composite operation table. An entry is keyed by an operation
// (interleave, deinterleave, trunchi, trunclo) and an element width class, and expands to
// a Lowering: a short straight-line sequence of register-pair reads, native permutation
// primitives and bitcasts with a fixed parameter type and result type. The set of
// declared entries is generated by a single macro in compose.rs; anything outside it is an
// UnsupportedEntry error rather than a fallback. LoweringTable instantiates every declared
// entry once for a TargetConfig, indexes them with hashbrown, and can run an entry through
// a PrimitiveBank for checking the wiring against the reference model.

//! The composite operation table.

pub mod compose;
pub mod eval;
pub mod lowering;

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;

use crate::core::{ElemWidth, LoweringError, LoweringResult, TargetConfig, Vector, VectorType};
use crate::hvx::primitives::{PrimitiveBank, ReferenceBank};

pub use compose::{compose, ENTRIES};
pub use lowering::{Inst, InstKind, Lowering, LoweringBuilder, ValueDef, ValueId};

/// Abstract vector operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Interleave,
    Deinterleave,
    /// Keep the upper half of every element.
    TruncHi,
    /// Keep the lower half of every element.
    TruncLo,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Interleave,
        Operation::Deinterleave,
        Operation::TruncHi,
        Operation::TruncLo,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Interleave => "interleave",
            Operation::Deinterleave => "deinterleave",
            Operation::TruncHi => "trunchi",
            Operation::TruncLo => "trunclo",
        }
    }

    /// Whether the result has half-width elements.
    pub const fn is_narrowing(self) -> bool {
        matches!(self, Operation::TruncHi | Operation::TruncLo)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = LoweringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| LoweringError::UnknownOperation { name: s.to_string() })
    }
}

/// An (operation, width) pair.
///
/// Truncating entries are keyed by their result width: `trunchi.h` narrows
/// words to half-words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub op: Operation,
    pub width: ElemWidth,
}

impl EntryKey {
    pub const fn new(op: Operation, width: ElemWidth) -> Self {
        Self { op, width }
    }

    pub fn symbol(&self, prefix: &str) -> String {
        format!("{prefix}.{self}")
    }

    /// Whether the table declares this entry.
    pub fn is_declared(&self) -> bool {
        ENTRIES.contains(self)
    }

    fn unsupported(&self) -> LoweringError {
        LoweringError::UnsupportedEntry {
            op: self.op.name(),
            width: self.width.suffix(),
        }
    }

    /// Parameter and result types under `config`.
    pub fn signature(&self, config: &TargetConfig) -> LoweringResult<(VectorType, VectorType)> {
        if self.op.is_narrowing() {
            let input = self.width.wider().ok_or_else(|| self.unsupported())?;
            Ok((
                config.pair().bitcast_to(input),
                config.single().bitcast_to(self.width),
            ))
        } else {
            let ty = config.pair().bitcast_to(self.width);
            Ok((ty, ty))
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.op, self.width)
    }
}

impl FromStr for EntryKey {
    type Err = LoweringError;

    /// Parse `op.w`, `op.h` or `op.b`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, width) = s
            .rsplit_once('.')
            .ok_or_else(|| LoweringError::UnknownOperation { name: s.to_string() })?;
        Ok(EntryKey::new(op.parse()?, width.parse()?))
    }
}

/// Every declared entry instantiated for one target configuration.
#[derive(Debug, Clone)]
pub struct LoweringTable {
    config: TargetConfig,
    entries: HashMap<EntryKey, Lowering>,
    order: Vec<EntryKey>,
}

impl LoweringTable {
    pub fn build(config: &TargetConfig) -> LoweringResult<Self> {
        let mut entries = HashMap::with_capacity(ENTRIES.len());
        for &key in ENTRIES {
            entries.insert(key, compose(config, key)?);
        }
        log::debug!(
            "built {} lowerings for {}-byte vectors",
            entries.len(),
            config.vector_length.bytes()
        );

        Ok(Self {
            config: config.clone(),
            entries,
            order: ENTRIES.to_vec(),
        })
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: EntryKey) -> LoweringResult<&Lowering> {
        self.entries.get(&key).ok_or_else(|| {
            log::warn!("no lowering for {key}");
            key.unsupported()
        })
    }

    pub fn lookup(&self, op: Operation, width: ElemWidth) -> LoweringResult<&Lowering> {
        self.get(EntryKey::new(op, width))
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Lowering> + '_ {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    /// Run `key` on `input` with the reference model.
    pub fn evaluate(&self, key: EntryKey, input: &Vector) -> LoweringResult<Vector> {
        self.evaluate_with(&ReferenceBank::new(), key, input)
    }

    pub fn evaluate_with<B: PrimitiveBank>(
        &self,
        bank: &B,
        key: EntryKey,
        input: &Vector,
    ) -> LoweringResult<Vector> {
        self.get(key)?.evaluate(bank, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VectorLength;

    #[test]
    fn test_entry_key_parse_and_print() {
        let key: EntryKey = "trunchi.b".parse().unwrap();
        assert_eq!(key, EntryKey::new(Operation::TruncHi, ElemWidth::Byte));
        assert_eq!(key.to_string(), "trunchi.b");
        assert_eq!(key.symbol("hvx"), "hvx.trunchi.b");

        assert!("shuffle.w".parse::<EntryKey>().is_err());
        assert!("interleave".parse::<EntryKey>().is_err());
        assert!("interleave.d".parse::<EntryKey>().is_err());
    }

    #[test]
    fn test_signatures() {
        let config = TargetConfig::default();
        let (p, r) = EntryKey::new(Operation::Interleave, ElemWidth::Byte)
            .signature(&config)
            .unwrap();
        assert_eq!((p.llvm(), r.llvm()), ("<128 x i8>".into(), "<128 x i8>".into()));

        let (p, r) = EntryKey::new(Operation::TruncLo, ElemWidth::Half)
            .signature(&config)
            .unwrap();
        assert_eq!((p.llvm(), r.llvm()), ("<32 x i32>".into(), "<32 x i16>".into()));

        let wide = TargetConfig::new(VectorLength::B128);
        let (p, r) = EntryKey::new(Operation::TruncHi, ElemWidth::Byte)
            .signature(&wide)
            .unwrap();
        assert_eq!((p.llvm(), r.llvm()), ("<128 x i16>".into(), "<128 x i8>".into()));

        assert!(EntryKey::new(Operation::TruncHi, ElemWidth::Word)
            .signature(&config)
            .is_err());
    }

    #[test]
    fn test_table_lookup() {
        let table = LoweringTable::build(&TargetConfig::default()).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(
            table.lookup(Operation::Deinterleave, ElemWidth::Half).unwrap().symbol(),
            "hvx.deinterleave.h"
        );

        let err = table.lookup(Operation::TruncLo, ElemWidth::Word).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No lowering for trunclo.w: entry is not part of the table"
        );
    }

    #[test]
    fn test_iter_follows_declaration_order() {
        let table = LoweringTable::build(&TargetConfig::default()).unwrap();
        let keys: Vec<String> = table.iter().map(|l| l.key().to_string()).collect();
        assert_eq!(keys.first().map(String::as_str), Some("interleave.w"));
        assert_eq!(keys.last().map(String::as_str), Some("trunclo.b"));
    }
}
