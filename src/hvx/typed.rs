//! Compile-time checked vectors.
//!
//! [`HvxVector`] is one register and [`HvxPair`] a register pair, both
//! parameterized by element type and register size in granules. Only the
//! operations the table declares exist as methods: narrowing is available
//! through [`Narrow`], which is implemented for words and half-words only.
//!
//! ```
//! use hvx_shuffle::hvx::typed::{Half, Hvx64Pair};
//!
//! let lanes: Vec<u32> = (0..64).collect();
//! let v = Hvx64Pair::<Half>::from_lanes(&lanes).unwrap();
//! assert_eq!(v.deinterleave().interleave(), v);
//! ```
//!
//! Bytes have nothing narrower, so truncating them does not compile:
//!
//! ```compile_fail
//! use hvx_shuffle::hvx::typed::{Byte, Hvx64Pair};
//!
//! let v = Hvx64Pair::<Byte>::zeroed();
//! let _ = v.trunchi();
//! ```

// The methods below run the same primitive sequences as the table entries, directly on
// ReferenceBank over fixed-size arrays, so no Lowering is built per call. The property
// tests check both paths against each other for every width and both register sizes.

use std::fmt;
use std::marker::PhantomData;

use crate::core::vector::{read_lane, write_lane};
use crate::core::{ElemWidth, LoweringError, LoweringResult, Vector, VectorType};

use super::primitives::{PackLane, PairMut, PairRef, Parity, PrimitiveBank, ReferenceBank};

mod sealed {
    pub trait Sealed {}
}

/// Element type marker.
pub trait Element: sealed::Sealed + Copy + Default + Eq + fmt::Debug + 'static {
    const WIDTH: ElemWidth;
}

/// Element types with a native truncating pack to a half-width element.
pub trait Narrow: Element {
    type Narrow: Element;
    const PACK: PackLane;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Word;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Half;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Byte;

impl sealed::Sealed for Word {}
impl sealed::Sealed for Half {}
impl sealed::Sealed for Byte {}

impl Element for Word {
    const WIDTH: ElemWidth = ElemWidth::Word;
}

impl Element for Half {
    const WIDTH: ElemWidth = ElemWidth::Half;
}

impl Element for Byte {
    const WIDTH: ElemWidth = ElemWidth::Byte;
}

impl Narrow for Word {
    type Narrow = Half;
    const PACK: PackLane = PackLane::Half;
}

impl Narrow for Half {
    type Narrow = Byte;
    const PACK: PackLane = PackLane::Byte;
}

/// One HVX register of `G` granules viewed as `E` lanes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HvxVector<E, const G: usize> {
    granules: [u32; G],
    _elem: PhantomData<E>,
}

/// An HVX register pair: `lo` then `hi`, each `G` granules.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HvxPair<E, const G: usize> {
    lo: [u32; G],
    hi: [u32; G],
    _elem: PhantomData<E>,
}

pub type Hvx64<E> = HvxVector<E, 16>;
pub type Hvx64Pair<E> = HvxPair<E, 16>;
pub type Hvx128<E> = HvxVector<E, 32>;
pub type Hvx128Pair<E> = HvxPair<E, 32>;

fn check_lanes(width: ElemWidth, expected: usize, found: usize) -> LoweringResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(LoweringError::LaneCount {
            width,
            expected,
            found,
        })
    }
}

impl<E: Element, const G: usize> HvxVector<E, G> {
    pub const LANES: usize = G * E::WIDTH.lanes_per_granule();

    pub const fn from_granules(granules: [u32; G]) -> Self {
        Self {
            granules,
            _elem: PhantomData,
        }
    }

    pub const fn zeroed() -> Self {
        Self::from_granules([0; G])
    }

    pub fn from_lanes(lanes: &[u32]) -> LoweringResult<Self> {
        check_lanes(E::WIDTH, Self::LANES, lanes.len())?;
        let mut granules = [0u32; G];
        for (index, &value) in lanes.iter().enumerate() {
            write_lane(&mut granules, E::WIDTH, index, value);
        }
        Ok(Self::from_granules(granules))
    }

    pub fn granules(&self) -> &[u32; G] {
        &self.granules
    }

    pub fn lane(&self, index: usize) -> u32 {
        read_lane(&self.granules, E::WIDTH, index)
    }

    pub fn lanes(&self) -> Vec<u32> {
        (0..Self::LANES).map(|i| self.lane(i)).collect()
    }

    pub fn bitcast<F: Element>(self) -> HvxVector<F, G> {
        HvxVector::from_granules(self.granules)
    }

    pub fn to_vector(&self) -> Vector {
        Vector::from_granules(E::WIDTH, self.granules.to_vec())
    }
}

impl<E: Element, const G: usize> fmt::Debug for HvxVector<E, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", VectorType::from_granules(E::WIDTH, G), self.lanes())
    }
}

impl<E: Element, const G: usize> HvxPair<E, G> {
    pub const LANES: usize = 2 * G * E::WIDTH.lanes_per_granule();

    pub fn from_halves(lo: HvxVector<E, G>, hi: HvxVector<E, G>) -> Self {
        Self {
            lo: lo.granules,
            hi: hi.granules,
            _elem: PhantomData,
        }
    }

    pub fn zeroed() -> Self {
        Self::from_halves(HvxVector::zeroed(), HvxVector::zeroed())
    }

    pub fn from_lanes(lanes: &[u32]) -> LoweringResult<Self> {
        check_lanes(E::WIDTH, Self::LANES, lanes.len())?;
        let (lo, hi) = lanes.split_at(Self::LANES / 2);
        Ok(Self::from_halves(
            HvxVector::from_lanes(lo)?,
            HvxVector::from_lanes(hi)?,
        ))
    }

    /// Convert a dynamically typed vector of the same shape.
    pub fn try_from_vector(vector: &Vector) -> LoweringResult<Self> {
        let expected = VectorType::from_granules(E::WIDTH, 2 * G);
        if vector.ty() != expected {
            return Err(LoweringError::WidthMismatch {
                expected,
                found: vector.ty(),
            });
        }
        let mut pair = Self::zeroed();
        let (lo, hi) = vector.granules().split_at(G);
        pair.lo.copy_from_slice(lo);
        pair.hi.copy_from_slice(hi);
        Ok(pair)
    }

    fn as_pair(&self) -> PairRef<'_> {
        PairRef {
            lo: &self.lo,
            hi: &self.hi,
        }
    }

    fn as_pair_mut(&mut self) -> PairMut<'_> {
        PairMut {
            lo: &mut self.lo,
            hi: &mut self.hi,
        }
    }

    /// Low and high registers, read independently.
    pub fn split(&self) -> (HvxVector<E, G>, HvxVector<E, G>) {
        let bank = ReferenceBank::new();
        let mut lo = [0u32; G];
        let mut hi = [0u32; G];
        bank.lo(self.as_pair(), &mut lo);
        bank.hi(self.as_pair(), &mut hi);
        (HvxVector::from_granules(lo), HvxVector::from_granules(hi))
    }

    pub fn lane(&self, index: usize) -> u32 {
        let half = Self::LANES / 2;
        if index < half {
            read_lane(&self.lo, E::WIDTH, index)
        } else {
            read_lane(&self.hi, E::WIDTH, index - half)
        }
    }

    pub fn lanes(&self) -> Vec<u32> {
        (0..Self::LANES).map(|i| self.lane(i)).collect()
    }

    pub fn bitcast<F: Element>(self) -> HvxPair<F, G> {
        HvxPair {
            lo: self.lo,
            hi: self.hi,
            _elem: PhantomData,
        }
    }

    pub fn to_vector(&self) -> Vector {
        let mut granules = Vec::with_capacity(2 * G);
        granules.extend_from_slice(&self.lo);
        granules.extend_from_slice(&self.hi);
        Vector::from_granules(E::WIDTH, granules)
    }

    /// Alternate lanes of the low and high registers: `lo[0], hi[0], lo[1], ...`.
    pub fn interleave(&self) -> Self {
        let (e, o) = self.split();
        let mut out = Self::zeroed();
        ReferenceBank::new().shuffle_lanes(E::WIDTH, &o.granules, &e.granules, out.as_pair_mut());
        out
    }

    /// Even lanes into the low register, odd lanes into the high one.
    pub fn deinterleave(&self) -> Self {
        let bank = ReferenceBank::new();
        let (lo, hi) = self.split();
        let mut out = Self::zeroed();
        match PackLane::try_from(E::WIDTH) {
            Ok(lane) => {
                let mut even = [0u32; G];
                let mut odd = [0u32; G];
                bank.pack(Parity::Even, lane, &hi.granules, &lo.granules, &mut even);
                bank.pack(Parity::Odd, lane, &hi.granules, &lo.granules, &mut odd);
                bank.combine(&odd, &even, out.as_pair_mut());
            }
            Err(_) => bank.deal_lanes(E::WIDTH, &hi.granules, &lo.granules, out.as_pair_mut()),
        }
        out
    }
}

impl<E: Narrow, const G: usize> HvxPair<E, G> {
    fn truncate(&self, parity: Parity) -> HvxVector<E::Narrow, G> {
        let (lo, hi) = self.split();
        let mut out = [0u32; G];
        ReferenceBank::new().pack(parity, E::PACK, &hi.granules, &lo.granules, &mut out);
        HvxVector::from_granules(out)
    }

    /// Upper half of every element.
    pub fn trunchi(&self) -> HvxVector<E::Narrow, G> {
        self.truncate(Parity::Odd)
    }

    /// Lower half of every element.
    pub fn trunclo(&self) -> HvxVector<E::Narrow, G> {
        self.truncate(Parity::Even)
    }
}

impl<E: Element, const G: usize> fmt::Debug for HvxPair<E, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", VectorType::from_granules(E::WIDTH, 2 * G), self.lanes())
    }
}
