//! Vector values and element widths.
//!
//! A vector is stored as a sequence of 32-bit granules, the native unit the
//! target splits register pairs on. The nominal element width is only a view
//! over those granules: lane `i` of a `b`-bit vector lives in granule
//! `i / (32 / b)` at bit offset `(i % (32 / b)) * b`. Reinterpreting a vector
//! at another width (see [`Vector::bitcast`]) never moves data.

use std::fmt;
use std::str::FromStr;

use super::error::{LoweringError, LoweringResult};

/// Bits per granule.
pub const GRANULE_BITS: u32 = 32;

/// Element width class of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElemWidth {
    /// 32-bit lanes.
    Word,
    /// 16-bit lanes.
    Half,
    /// 8-bit lanes.
    Byte,
}

impl ElemWidth {
    pub const ALL: [ElemWidth; 3] = [ElemWidth::Word, ElemWidth::Half, ElemWidth::Byte];

    pub const fn bits(self) -> u32 {
        match self {
            ElemWidth::Word => 32,
            ElemWidth::Half => 16,
            ElemWidth::Byte => 8,
        }
    }

    pub const fn bytes(self) -> u32 {
        self.bits() / 8
    }

    /// Suffix used in entry names (`interleave.w`).
    pub const fn suffix(self) -> &'static str {
        match self {
            ElemWidth::Word => "w",
            ElemWidth::Half => "h",
            ElemWidth::Byte => "b",
        }
    }

    pub const fn llvm_type(self) -> &'static str {
        match self {
            ElemWidth::Word => "i32",
            ElemWidth::Half => "i16",
            ElemWidth::Byte => "i8",
        }
    }

    pub const fn lanes_per_granule(self) -> usize {
        (GRANULE_BITS / self.bits()) as usize
    }

    pub const fn mask(self) -> u32 {
        match self {
            ElemWidth::Word => u32::MAX,
            ElemWidth::Half => 0xffff,
            ElemWidth::Byte => 0xff,
        }
    }

    /// The width with twice as many bits, if it is a granule-sized width or smaller.
    pub const fn wider(self) -> Option<ElemWidth> {
        match self {
            ElemWidth::Word => None,
            ElemWidth::Half => Some(ElemWidth::Word),
            ElemWidth::Byte => Some(ElemWidth::Half),
        }
    }

    pub const fn narrower(self) -> Option<ElemWidth> {
        match self {
            ElemWidth::Word => Some(ElemWidth::Half),
            ElemWidth::Half => Some(ElemWidth::Byte),
            ElemWidth::Byte => None,
        }
    }

    /// Control constant selecting interleave granularity in `vshuffvdd`/`vdealvdd`.
    pub const fn shuffle_control(self) -> i32 {
        -(self.bytes() as i32)
    }

    pub fn from_suffix(suffix: &str) -> Option<ElemWidth> {
        match suffix {
            "w" => Some(ElemWidth::Word),
            "h" => Some(ElemWidth::Half),
            "b" => Some(ElemWidth::Byte),
            _ => None,
        }
    }
}

impl fmt::Display for ElemWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for ElemWidth {
    type Err = LoweringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElemWidth::from_suffix(s).ok_or_else(|| LoweringError::UnknownOperation {
            name: s.to_string(),
        })
    }
}

/// Read lane `index` of a `width` view over `granules`.
pub fn read_lane(granules: &[u32], width: ElemWidth, index: usize) -> u32 {
    let per = width.lanes_per_granule();
    let shift = (index % per) as u32 * width.bits();
    (granules[index / per] >> shift) & width.mask()
}

/// Write lane `index` of a `width` view over `granules`. Extra high bits are dropped.
pub fn write_lane(granules: &mut [u32], width: ElemWidth, index: usize, value: u32) {
    let per = width.lanes_per_granule();
    let shift = (index % per) as u32 * width.bits();
    let mask = width.mask() << shift;
    let slot = &mut granules[index / per];
    *slot = (*slot & !mask) | ((value & width.mask()) << shift);
}

/// Static type of a vector: element width and lane count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorType {
    pub elem: ElemWidth,
    pub lanes: usize,
}

impl VectorType {
    pub const fn new(elem: ElemWidth, lanes: usize) -> Self {
        Self { elem, lanes }
    }

    /// Vector type made of `granules` 32-bit granules viewed at `elem`.
    pub const fn from_granules(elem: ElemWidth, granules: usize) -> Self {
        Self {
            elem,
            lanes: granules * elem.lanes_per_granule(),
        }
    }

    pub const fn total_bits(&self) -> usize {
        self.lanes * self.elem.bits() as usize
    }

    pub const fn granules(&self) -> usize {
        self.total_bits() / GRANULE_BITS as usize
    }

    /// Same bits, different element view.
    pub const fn bitcast_to(&self, elem: ElemWidth) -> Self {
        Self::from_granules(elem, self.granules())
    }

    /// LLVM spelling, e.g. `<32 x i32>`.
    pub fn llvm(&self) -> String {
        format!("<{} x {}>", self.lanes, self.elem.llvm_type())
    }
}

impl fmt::Display for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} x {}>", self.lanes, self.elem.llvm_type())
    }
}

/// An immutable vector value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vector {
    ty: VectorType,
    granules: Vec<u32>,
}

impl Vector {
    /// Build a vector from lane values. Each value is truncated to the lane width.
    ///
    /// Returns [`LoweringError::LaneCount`] if `lanes` does not fill a whole number of
    /// granules.
    pub fn from_lanes(elem: ElemWidth, lanes: &[u32]) -> LoweringResult<Self> {
        let per = elem.lanes_per_granule();
        if lanes.is_empty() || lanes.len() % per != 0 {
            return Err(LoweringError::LaneCount {
                width: elem,
                expected: lanes.len().div_ceil(per).max(1) * per,
                found: lanes.len(),
            });
        }

        let mut granules = vec![0u32; lanes.len() / per];
        for (index, &value) in lanes.iter().enumerate() {
            write_lane(&mut granules, elem, index, value);
        }

        Ok(Self {
            ty: VectorType::new(elem, lanes.len()),
            granules,
        })
    }

    /// Like [`Vector::from_lanes`], but values that do not fit the lane width are
    /// refused with [`LoweringError::LaneValue`] instead of truncated.
    pub fn try_from_lanes(elem: ElemWidth, lanes: &[u32]) -> LoweringResult<Self> {
        let overflow = lanes.iter().enumerate().find(|&(_, &v)| v > elem.mask());
        if let Some((index, &value)) = overflow {
            return Err(LoweringError::LaneValue {
                width: elem,
                index,
                value,
            });
        }
        Self::from_lanes(elem, lanes)
    }

    pub fn from_granules(elem: ElemWidth, granules: Vec<u32>) -> Self {
        Self {
            ty: VectorType::from_granules(elem, granules.len()),
            granules,
        }
    }

    /// Vector of type `ty` whose lane `i` holds `i` (wrapped to the lane width).
    pub fn iota(ty: VectorType) -> Self {
        let mut granules = vec![0u32; ty.granules()];
        for index in 0..ty.lanes {
            write_lane(&mut granules, ty.elem, index, index as u32);
        }
        Self { ty, granules }
    }

    pub fn ty(&self) -> VectorType {
        self.ty
    }

    pub fn elem(&self) -> ElemWidth {
        self.ty.elem
    }

    pub fn lane_count(&self) -> usize {
        self.ty.lanes
    }

    pub fn total_bits(&self) -> usize {
        self.ty.total_bits()
    }

    pub fn granules(&self) -> &[u32] {
        &self.granules
    }

    pub fn lane(&self, index: usize) -> u32 {
        read_lane(&self.granules, self.ty.elem, index)
    }

    pub fn lanes(&self) -> Vec<u32> {
        (0..self.ty.lanes).map(|i| self.lane(i)).collect()
    }

    /// Reinterpret the granules at another element width.
    pub fn bitcast(&self, elem: ElemWidth) -> Vector {
        Self::from_granules(elem, self.granules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_layout_is_little_endian_in_granule() {
        let v = Vector::from_lanes(ElemWidth::Byte, &[0x11, 0x22, 0x33, 0x44]).unwrap();
        assert_eq!(v.granules(), &[0x4433_2211]);

        let h = v.bitcast(ElemWidth::Half);
        assert_eq!(h.lanes(), vec![0x2211, 0x4433]);
        assert_eq!(h.total_bits(), v.total_bits());
    }

    #[test]
    fn test_from_lanes_rejects_partial_granule() {
        let err = Vector::from_lanes(ElemWidth::Half, &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            LoweringError::LaneCount { expected: 4, found: 3, .. }
        ));
    }

    #[test]
    fn test_from_lanes_truncates_values() {
        let v = Vector::from_lanes(ElemWidth::Byte, &[0x1ff, 0, 0, 0]).unwrap();
        assert_eq!(v.lane(0), 0xff);
    }

    #[test]
    fn test_try_from_lanes_refuses_wide_values() {
        let err = Vector::try_from_lanes(ElemWidth::Byte, &[1, 2, 300, 4]).unwrap_err();
        assert!(matches!(
            err,
            LoweringError::LaneValue { index: 2, value: 300, .. }
        ));

        let v = Vector::try_from_lanes(ElemWidth::Half, &[0xffff, 7]).unwrap();
        assert_eq!(v.lanes(), vec![0xffff, 7]);
    }

    #[test]
    fn test_vector_type_spelling() {
        let ty = VectorType::from_granules(ElemWidth::Half, 32);
        assert_eq!(ty.lanes, 64);
        assert_eq!(ty.llvm(), "<64 x i16>");
        assert_eq!(ty.bitcast_to(ElemWidth::Byte).to_string(), "<128 x i8>");
    }

    #[test]
    fn test_widths() {
        assert_eq!(ElemWidth::Word.shuffle_control(), -4);
        assert_eq!(ElemWidth::Half.shuffle_control(), -2);
        assert_eq!(ElemWidth::Byte.shuffle_control(), -1);
        assert_eq!(ElemWidth::Byte.wider(), Some(ElemWidth::Half));
        assert_eq!(ElemWidth::Word.narrower(), Some(ElemWidth::Half));
        assert_eq!("h".parse::<ElemWidth>().unwrap(), ElemWidth::Half);
        assert!("q".parse::<ElemWidth>().is_err());
    }
}
