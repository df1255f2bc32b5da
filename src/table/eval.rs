//! Running a lowering against a primitive bank.
//!
//! This is how the table's wiring (split order, operand order, control
//! constants, bitcasts) is checked without hardware: every instruction is
//! executed in order on concrete granules.

use crate::core::{LoweringError, LoweringResult, Vector};
use crate::hvx::primitives::{PairMut, PairRef, Primitive, PrimitiveBank};

use super::lowering::{InstKind, Lowering, ValueId};

impl Lowering {
    /// Execute this lowering on `input`.
    ///
    /// The input must have exactly the declared parameter type.
    pub fn evaluate<B: PrimitiveBank>(&self, bank: &B, input: &Vector) -> LoweringResult<Vector> {
        if input.ty() != self.param_type() {
            return Err(LoweringError::WidthMismatch {
                expected: self.param_type(),
                found: input.ty(),
            });
        }

        let mut env: Vec<Option<Vector>> = vec![None; self.values().len()];
        env[ValueId::ARG.index()] = Some(input.clone());

        for inst in self.insts() {
            let def = self.value(inst.result);
            let value = match &inst.kind {
                InstKind::Bitcast { src } => self.fetch(&env, *src)?.bitcast(def.ty.elem),
                InstKind::Call {
                    primitive,
                    args,
                    control,
                } => {
                    let args = args
                        .iter()
                        .map(|&id| self.fetch(&env, id).map(Vector::granules))
                        .collect::<LoweringResult<Vec<&[u32]>>>()?;
                    let mut out = vec![0u32; def.ty.granules()];
                    execute(bank, *primitive, &args, control.unwrap_or_default(), &mut out)?;
                    Vector::from_granules(def.ty.elem, out)
                }
            };
            log::trace!("{}: %{} = {:?}", self.symbol(), def.name, value.granules());
            env[inst.result.index()] = Some(value);
        }

        self.fetch(&env, self.ret()).cloned()
    }

    fn fetch<'e>(&self, env: &'e [Option<Vector>], id: ValueId) -> LoweringResult<&'e Vector> {
        env[id.index()]
            .as_ref()
            .ok_or_else(|| LoweringError::UndefinedValue {
                name: self.value(id).name.clone(),
            })
    }
}

fn execute<B: PrimitiveBank>(
    bank: &B,
    primitive: Primitive,
    args: &[&[u32]],
    control: i32,
    out: &mut [u32],
) -> LoweringResult<()> {
    match primitive {
        Primitive::Lo => bank.lo(PairRef::from_granules(args[0]), out),
        Primitive::Hi => bank.hi(PairRef::from_granules(args[0]), out),
        Primitive::Combine => bank.combine(args[0], args[1], PairMut::from_granules(out)),
        Primitive::ShuffleVdd => {
            bank.shuffle_vdd(args[0], args[1], control, PairMut::from_granules(out))?
        }
        Primitive::DealVdd => bank.deal_vdd(args[0], args[1], control, PairMut::from_granules(out))?,
        Primitive::Pack { parity, lane } => bank.pack(parity, lane, args[0], args[1], out),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ElemWidth, TargetConfig, VectorType};
    use crate::hvx::primitives::{RecordingBank, ReferenceBank};
    use crate::table::{EntryKey, LoweringTable, Operation};

    #[test]
    fn test_interleave_word_restores_order() {
        let config = TargetConfig::default();
        let table = LoweringTable::build(&config).unwrap();

        // Evens in the low register, odds in the high one.
        let lanes: Vec<u32> = (0..16).map(|i| 2 * i).chain((0..16).map(|i| 2 * i + 1)).collect();
        let input = Vector::from_lanes(ElemWidth::Word, &lanes).unwrap();

        let key = EntryKey::new(Operation::Interleave, ElemWidth::Word);
        let out = table.evaluate(key, &input).unwrap();
        assert_eq!(out.lanes(), (0..32).collect::<Vec<u32>>());
    }

    #[test]
    fn test_evaluation_follows_lowering() {
        let config = TargetConfig::default();
        let table = LoweringTable::build(&config).unwrap();
        let bank = RecordingBank::new(ReferenceBank::new());

        for lowering in table.iter() {
            bank.clear();
            let input = Vector::iota(lowering.param_type());
            let out = lowering.evaluate(&bank, &input).unwrap();
            assert_eq!(out.ty(), lowering.result_type());
            assert_eq!(bank.calls(), lowering.primitives(), "{}", lowering.symbol());
        }
    }

    #[test]
    fn test_rejects_wrong_input_type() {
        let table = LoweringTable::build(&TargetConfig::default()).unwrap();
        let key = EntryKey::new(Operation::Interleave, ElemWidth::Half);
        let input = Vector::iota(VectorType::new(ElemWidth::Word, 32));
        let err = table.evaluate(key, &input).unwrap_err();
        assert!(matches!(err, LoweringError::WidthMismatch { .. }));
    }
}
