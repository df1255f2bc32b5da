//! HVX shuffle lowering table.
//!
//! Expands the abstract vector operations a code generator needs on Hexagon
//! HVX (interleave, deinterleave, truncate-high, truncate-low) into fixed
//! sequences of native register-pair permutation primitives. Every entry has
//! a closed signature and is pure, so the host compiler is free to inline,
//! reorder or deduplicate calls.
//!
//! # Primary Usage
//!
//! ```
//! use hvx_shuffle::core::{ElemWidth, TargetConfig, Vector};
//! use hvx_shuffle::table::{LoweringTable, Operation};
//!
//! let table = LoweringTable::build(&TargetConfig::default()).unwrap();
//! let interleave = table.lookup(Operation::Interleave, ElemWidth::Half).unwrap();
//! let deinterleave = table.lookup(Operation::Deinterleave, ElemWidth::Half).unwrap();
//!
//! let input = Vector::iota(interleave.param_type());
//! let bank = hvx_shuffle::hvx::ReferenceBank::new();
//! let mixed = interleave.evaluate(&bank, &input).unwrap();
//! assert_eq!(deinterleave.evaluate(&bank, &mixed).unwrap(), input);
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Element widths, vector values, configuration and errors
//! - [`hvx`] - Register pairs, native primitives and typed registers
//! - [`table`] - The operation table, its lowerings and their evaluation
//! - [`emit`] - Textual LLVM assembly for the table
//! - [`cli`] - The `hvx-table` command line
//! - [`filecheck`] - FileCheck-style checks over emitted assembly

pub mod cli;
pub mod core;
pub mod emit;
pub mod filecheck;
pub mod hvx;
pub mod table;

pub use self::core::{
    ElemWidth, LoweringError, LoweringResult, TargetConfig, Vector, VectorLength, VectorType,
};
pub use self::table::{EntryKey, Lowering, LoweringTable, Operation};
