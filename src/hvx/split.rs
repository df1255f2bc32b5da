//! Register-pair splitting.
//!
//! A double-width vector lives in a register pair. Splitting reads the two
//! registers independently (`lo`, `hi`) rather than shuffling, so the halves
//! are always whole granule runs whatever element type is layered on top.

use crate::core::{LoweringError, LoweringResult, TargetConfig, Vector, VectorType};

use super::primitives::{PairRef, PrimitiveBank};

/// The two registers of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPair {
    pub lo: Vector,
    pub hi: Vector,
}

impl RegisterPair {
    /// Concatenate `lo` then `hi` back into one vector.
    pub fn join(&self) -> Vector {
        let mut granules = Vec::with_capacity(self.lo.granules().len() * 2);
        granules.extend_from_slice(self.lo.granules());
        granules.extend_from_slice(self.hi.granules());
        Vector::from_granules(self.lo.elem(), granules)
    }
}

/// Split `vector` into its low and high registers.
///
/// The vector must be exactly one register pair wide for `config`; its element
/// view is kept on both halves.
pub fn split<B: PrimitiveBank>(
    bank: &B,
    config: &TargetConfig,
    vector: &Vector,
) -> LoweringResult<RegisterPair> {
    let expected = config.pair().bitcast_to(vector.elem());
    if vector.ty() != expected {
        return Err(LoweringError::WidthMismatch {
            expected,
            found: vector.ty(),
        });
    }

    let pair = PairRef::from_granules(vector.granules());
    let mut lo = vec![0u32; config.register_granules()];
    let mut hi = vec![0u32; config.register_granules()];
    bank.lo(pair, &mut lo);
    bank.hi(pair, &mut hi);

    Ok(RegisterPair {
        lo: Vector::from_granules(vector.elem(), lo),
        hi: Vector::from_granules(vector.elem(), hi),
    })
}

/// Type of one half of a pair-wide vector of `ty`.
pub fn half_type(ty: VectorType) -> VectorType {
    VectorType::new(ty.elem, ty.lanes / 2)
}
