// This module is the permutation primitive bank: it names and types the native HVX
// operations the composite table is built from, and defines the PrimitiveBank trait that
// a target (or a software model) implements to execute them. Primitive carries the
// intrinsic name, operand types and result type for each operation so the table builder
// can type-check compositions and the emitter can print declarations. The bank only
// exposes what the table needs: register-pair reads (lo/hi), vcombine, the vshuffvdd and
// vdealvdd interleave networks, and the even/odd lane packs at half-word and byte width.
// There is no native word-width pack; asking for one fails instead of being synthesized.
// ReferenceBank implements exact lane semantics over 32-bit granules and RecordingBank
// wraps any bank to capture the sequence of primitives actually executed.

//! Native permutation primitives and the banks that execute them.

use std::cell::RefCell;
use std::fmt;

use crate::core::vector::{read_lane, write_lane};
use crate::core::{ElemWidth, LoweringError, LoweringResult, TargetConfig, VectorLength, VectorType};

/// Which lanes of a concatenation a pack keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    const fn offset(self) -> usize {
        match self {
            Parity::Even => 0,
            Parity::Odd => 1,
        }
    }
}

/// Lane widths with a native pack instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackLane {
    Half,
    Byte,
}

impl PackLane {
    pub const fn width(self) -> ElemWidth {
        match self {
            PackLane::Half => ElemWidth::Half,
            PackLane::Byte => ElemWidth::Byte,
        }
    }
}

impl TryFrom<ElemWidth> for PackLane {
    type Error = LoweringError;

    fn try_from(width: ElemWidth) -> Result<Self, Self::Error> {
        match width {
            ElemWidth::Half => Ok(PackLane::Half),
            ElemWidth::Byte => Ok(PackLane::Byte),
            ElemWidth::Word => Err(LoweringError::MissingPrimitive {
                kind: "pack",
                width: width.bits(),
            }),
        }
    }
}

/// A native HVX operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Low register of a pair.
    Lo,
    /// High register of a pair.
    Hi,
    /// `vcombine(u, v)`: pair with `v` as the low register.
    Combine,
    /// `vshuffvdd(u, v, ctrl)`: interleave `v` and `u` at `|ctrl|`-byte lanes.
    ShuffleVdd,
    /// `vdealvdd(u, v, ctrl)`: inverse of [`Primitive::ShuffleVdd`].
    DealVdd,
    /// `vpacke*`/`vpacko*`: every other lane of the concatenation `v ++ u`.
    Pack { parity: Parity, lane: PackLane },
}

impl Primitive {
    /// The pack keeping `parity` lanes of `width`, if the target has one.
    pub fn pack(parity: Parity, width: ElemWidth) -> LoweringResult<Primitive> {
        let lane = PackLane::try_from(width)?;
        Ok(Primitive::Pack { parity, lane })
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Primitive::Lo => "lo",
            Primitive::Hi => "hi",
            Primitive::Combine => "vcombine",
            Primitive::ShuffleVdd => "vshuffvdd",
            Primitive::DealVdd => "vdealvdd",
            Primitive::Pack { parity: Parity::Even, lane: PackLane::Half } => "vpackeh",
            Primitive::Pack { parity: Parity::Even, lane: PackLane::Byte } => "vpackeb",
            Primitive::Pack { parity: Parity::Odd, lane: PackLane::Half } => "vpackoh",
            Primitive::Pack { parity: Parity::Odd, lane: PackLane::Byte } => "vpackob",
        }
    }

    /// Full intrinsic name, e.g. `llvm.hexagon.V6.vshuffvdd.128B`.
    pub fn intrinsic(&self, length: VectorLength) -> String {
        format!("llvm.hexagon.V6.{}{}", self.mnemonic(), length.intrinsic_suffix())
    }

    /// Whether the intrinsic takes a trailing `i32` control operand.
    pub const fn takes_control(&self) -> bool {
        matches!(self, Primitive::ShuffleVdd | Primitive::DealVdd)
    }

    /// Vector operand types, in call order.
    pub fn operand_types(&self, config: &TargetConfig) -> Vec<VectorType> {
        match self {
            Primitive::Lo | Primitive::Hi => vec![config.pair()],
            _ => vec![config.single(), config.single()],
        }
    }

    pub fn result_type(&self, config: &TargetConfig) -> VectorType {
        match self {
            Primitive::Lo | Primitive::Hi | Primitive::Pack { .. } => config.single(),
            Primitive::Combine | Primitive::ShuffleVdd | Primitive::DealVdd => config.pair(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Borrowed register pair.
#[derive(Debug, Clone, Copy)]
pub struct PairRef<'a> {
    pub lo: &'a [u32],
    pub hi: &'a [u32],
}

impl<'a> PairRef<'a> {
    /// View a contiguous pair of granules.
    pub fn from_granules(granules: &'a [u32]) -> Self {
        let (lo, hi) = granules.split_at(granules.len() / 2);
        Self { lo, hi }
    }
}

/// Mutably borrowed register pair.
#[derive(Debug)]
pub struct PairMut<'a> {
    pub lo: &'a mut [u32],
    pub hi: &'a mut [u32],
}

impl<'a> PairMut<'a> {
    pub fn from_granules(granules: &'a mut [u32]) -> Self {
        let half = granules.len() / 2;
        let (lo, hi) = granules.split_at_mut(half);
        Self { lo, hi }
    }
}

/// Executes native primitives.
///
/// All slices are measured in 32-bit granules. Single registers have the
/// same length everywhere in one call; pairs are two such registers.
pub trait PrimitiveBank {
    fn lo(&self, pair: PairRef<'_>, out: &mut [u32]);

    fn hi(&self, pair: PairRef<'_>, out: &mut [u32]);

    fn combine(&self, u: &[u32], v: &[u32], out: PairMut<'_>);

    fn shuffle_vdd(&self, u: &[u32], v: &[u32], control: i32, out: PairMut<'_>)
        -> LoweringResult<()>;

    fn deal_vdd(&self, u: &[u32], v: &[u32], control: i32, out: PairMut<'_>)
        -> LoweringResult<()>;

    fn pack(&self, parity: Parity, lane: PackLane, u: &[u32], v: &[u32], out: &mut [u32]);
}

/// Software model of the HVX permutation primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBank;

impl ReferenceBank {
    pub const fn new() -> Self {
        Self
    }

    /// `vshuffvdd` at a known lane width.
    pub fn shuffle_lanes(&self, width: ElemWidth, u: &[u32], v: &[u32], mut out: PairMut<'_>) {
        let n = v.len() * width.lanes_per_granule();
        for k in 0..n {
            write_pair_lane(&mut out, width, 2 * k, read_lane(v, width, k));
            write_pair_lane(&mut out, width, 2 * k + 1, read_lane(u, width, k));
        }
    }

    /// `vdealvdd` at a known lane width.
    pub fn deal_lanes(&self, width: ElemWidth, u: &[u32], v: &[u32], out: PairMut<'_>) {
        let n = v.len() * width.lanes_per_granule();
        for k in 0..n {
            write_lane(out.lo, width, k, concat_lane(u, v, width, 2 * k));
            write_lane(out.hi, width, k, concat_lane(u, v, width, 2 * k + 1));
        }
    }
}

pub(crate) fn control_width(primitive: Primitive, control: i32) -> LoweringResult<ElemWidth> {
    match control {
        -4 => Ok(ElemWidth::Word),
        -2 => Ok(ElemWidth::Half),
        -1 => Ok(ElemWidth::Byte),
        _ => Err(LoweringError::InvalidControl {
            primitive: primitive.mnemonic(),
            control,
        }),
    }
}

/// Lane `index` of the concatenation `v ++ u`.
fn concat_lane(u: &[u32], v: &[u32], width: ElemWidth, index: usize) -> u32 {
    let n = v.len() * width.lanes_per_granule();
    if index < n {
        read_lane(v, width, index)
    } else {
        read_lane(u, width, index - n)
    }
}

fn write_pair_lane(out: &mut PairMut<'_>, width: ElemWidth, index: usize, value: u32) {
    let n = out.lo.len() * width.lanes_per_granule();
    if index < n {
        write_lane(out.lo, width, index, value);
    } else {
        write_lane(out.hi, width, index - n, value);
    }
}

impl PrimitiveBank for ReferenceBank {
    fn lo(&self, pair: PairRef<'_>, out: &mut [u32]) {
        out.copy_from_slice(pair.lo);
    }

    fn hi(&self, pair: PairRef<'_>, out: &mut [u32]) {
        out.copy_from_slice(pair.hi);
    }

    fn combine(&self, u: &[u32], v: &[u32], out: PairMut<'_>) {
        out.lo.copy_from_slice(v);
        out.hi.copy_from_slice(u);
    }

    fn shuffle_vdd(
        &self,
        u: &[u32],
        v: &[u32],
        control: i32,
        out: PairMut<'_>,
    ) -> LoweringResult<()> {
        let width = control_width(Primitive::ShuffleVdd, control)?;
        self.shuffle_lanes(width, u, v, out);
        Ok(())
    }

    fn deal_vdd(
        &self,
        u: &[u32],
        v: &[u32],
        control: i32,
        out: PairMut<'_>,
    ) -> LoweringResult<()> {
        let width = control_width(Primitive::DealVdd, control)?;
        self.deal_lanes(width, u, v, out);
        Ok(())
    }

    fn pack(&self, parity: Parity, lane: PackLane, u: &[u32], v: &[u32], out: &mut [u32]) {
        let width = lane.width();
        let n = out.len() * width.lanes_per_granule();
        for k in 0..n {
            write_lane(out, width, k, concat_lane(u, v, width, 2 * k + parity.offset()));
        }
    }
}

/// Bank wrapper recording every primitive executed, in order.
#[derive(Debug, Default)]
pub struct RecordingBank<B> {
    inner: B,
    calls: RefCell<Vec<Primitive>>,
}

impl<B: PrimitiveBank> RecordingBank<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Primitives executed so far.
    pub fn calls(&self) -> Vec<Primitive> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, primitive: Primitive) {
        log::trace!("bank: {}", primitive);
        self.calls.borrow_mut().push(primitive);
    }
}

impl<B: PrimitiveBank> PrimitiveBank for RecordingBank<B> {
    fn lo(&self, pair: PairRef<'_>, out: &mut [u32]) {
        self.record(Primitive::Lo);
        self.inner.lo(pair, out);
    }

    fn hi(&self, pair: PairRef<'_>, out: &mut [u32]) {
        self.record(Primitive::Hi);
        self.inner.hi(pair, out);
    }

    fn combine(&self, u: &[u32], v: &[u32], out: PairMut<'_>) {
        self.record(Primitive::Combine);
        self.inner.combine(u, v, out);
    }

    fn shuffle_vdd(
        &self,
        u: &[u32],
        v: &[u32],
        control: i32,
        out: PairMut<'_>,
    ) -> LoweringResult<()> {
        self.record(Primitive::ShuffleVdd);
        self.inner.shuffle_vdd(u, v, control, out)
    }

    fn deal_vdd(
        &self,
        u: &[u32],
        v: &[u32],
        control: i32,
        out: PairMut<'_>,
    ) -> LoweringResult<()> {
        self.record(Primitive::DealVdd);
        self.inner.deal_vdd(u, v, control, out)
    }

    fn pack(&self, parity: Parity, lane: PackLane, u: &[u32], v: &[u32], out: &mut [u32]) {
        self.record(Primitive::Pack { parity, lane });
        self.inner.pack(parity, lane, u, v, out);
    }
}
