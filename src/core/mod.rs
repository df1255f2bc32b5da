// This module gathers the target-independent infrastructure shared by the splitter,
// the primitive bank and the composite table: the error type every fallible step returns,
// the target configuration (register size, symbol prefix) that fixes all lane counts,
// and the vector value model. Vectors are stored as 32-bit granules with a nominal
// element width layered on top, which is what lets the byte and half-word entries reuse
// the word-granule split without moving data.

//! Core infrastructure.
//!
//! # Key Components
//!
//! ## Vector Values (`vector`)
//! - Element width classes (word, half-word, byte)
//! - Granule-backed immutable vectors and their static types
//! - Bitcast adapter: reinterpretation without data movement
//!
//! ## Configuration (`config`)
//! - 64-byte and 128-byte HVX register sizes
//! - Environment overrides
//!
//! ## Errors (`error`)
//! - One `thiserror` enum for every refusal path

pub mod config;
pub mod error;
pub mod vector;

pub use config::{TargetConfig, VectorLength};
pub use error::{LoweringError, LoweringResult};
pub use vector::{ElemWidth, Vector, VectorType, GRANULE_BITS};
