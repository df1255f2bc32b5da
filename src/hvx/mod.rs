//! HVX-specific components.
//!
//! This module contains everything tied to the Hexagon vector unit:
//! - Register-pair splitting (`split`)
//! - The native permutation primitives and banks executing them (`primitives`)
//! - Compile-time checked register and pair types (`typed`)

pub mod primitives;
pub mod split;
pub mod typed;

pub use primitives::{
    PackLane, PairMut, PairRef, Parity, Primitive, PrimitiveBank, RecordingBank, ReferenceBank,
};
pub use split::{split, RegisterPair};
