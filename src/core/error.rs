// This module defines error types for the lowering table using the thiserror crate.
// LoweringError covers every way a request can be refused before an instruction sequence
// is produced: asking for an (operation, width) pair the table does not declare, asking
// the primitive bank for a pack that has no native encoding, operands whose vector type
// does not match a primitive's signature, a composed sequence whose result width differs
// from its declared type, bad shuffle control constants, wrong lane counts when building
// vectors, and configuration problems. Nothing here is recoverable at emission time: the
// caller either gets the full sequence or an error naming the offending combination.

//! Error types for table construction and evaluation.

use thiserror::Error;

use super::vector::{ElemWidth, VectorType};

/// Main error type for the lowering table.
#[derive(Error, Debug)]
pub enum LoweringError {
    #[error("No lowering for {op}.{width}: entry is not part of the table")]
    UnsupportedEntry {
        op: &'static str,
        width: &'static str,
    },

    #[error("No native {kind} primitive at {width}-bit lanes")]
    MissingPrimitive {
        kind: &'static str,
        width: u32,
    },

    #[error("Expected a {expected} vector, found {found}")]
    WidthMismatch {
        expected: VectorType,
        found: VectorType,
    },

    #[error("Operand {index} of {primitive}: expected {expected}, found {found}")]
    OperandMismatch {
        primitive: &'static str,
        index: usize,
        expected: VectorType,
        found: VectorType,
    },

    #[error("{primitive} takes {expected} operands, {found} given")]
    OperandCount {
        primitive: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{symbol} returns {found} but is declared to return {declared}")]
    WidthClosure {
        symbol: String,
        declared: VectorType,
        found: VectorType,
    },

    #[error("Invalid shuffle control {control} for {primitive}")]
    InvalidControl {
        primitive: &'static str,
        control: i32,
    },

    #[error("{width:?} vector needs {expected} lanes, got {found}")]
    LaneCount {
        width: ElemWidth,
        expected: usize,
        found: usize,
    },

    #[error("Lane {index} value {value} does not fit in a {width:?} lane")]
    LaneValue {
        width: ElemWidth,
        index: usize,
        value: u32,
    },

    #[error("Unknown operation: {name}")]
    UnknownOperation {
        name: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Value %{name} used before definition")]
    UndefinedValue {
        name: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for lowering operations.
pub type LoweringResult<T> = Result<T, LoweringError>;
