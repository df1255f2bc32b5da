//! Straight-line lowerings and their builder.
//!
//! A [`Lowering`] is one table entry expanded to native primitives: a single
//! parameter, a list of SSA instructions (bitcasts and primitive calls) and a
//! returned value. The builder type checks every call against the
//! primitive's signature so a composed entry can never mix register widths.

use hashbrown::HashSet;

use crate::core::{ElemWidth, LoweringError, LoweringResult, TargetConfig, VectorLength, VectorType};
use crate::hvx::primitives::{control_width, Primitive};

use super::EntryKey;

/// Index of a value inside one lowering. Value 0 is the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(usize);

impl ValueId {
    pub const ARG: ValueId = ValueId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A named, typed SSA value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDef {
    pub name: String,
    pub ty: VectorType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstKind {
    /// Reinterpret `src` at the result's element width.
    Bitcast { src: ValueId },
    /// Call a native primitive.
    Call {
        primitive: Primitive,
        args: Vec<ValueId>,
        control: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inst {
    pub result: ValueId,
    pub kind: InstKind,
}

/// One table entry expanded to native primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lowering {
    key: EntryKey,
    symbol: String,
    vector_length: VectorLength,
    values: Vec<ValueDef>,
    insts: Vec<Inst>,
    ret: ValueId,
}

impl Lowering {
    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// Emitted function name, e.g. `hvx.interleave.w`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn vector_length(&self) -> VectorLength {
        self.vector_length
    }

    pub fn param_type(&self) -> VectorType {
        self.values[ValueId::ARG.0].ty
    }

    pub fn result_type(&self) -> VectorType {
        self.values[self.ret.0].ty
    }

    pub fn value(&self, id: ValueId) -> &ValueDef {
        &self.values[id.0]
    }

    pub fn values(&self) -> &[ValueDef] {
        &self.values
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn ret(&self) -> ValueId {
        self.ret
    }

    /// Primitives called, in order.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.insts
            .iter()
            .filter_map(|inst| match &inst.kind {
                InstKind::Call { primitive, .. } => Some(*primitive),
                InstKind::Bitcast { .. } => None,
            })
            .collect()
    }
}

/// Builds one [`Lowering`].
pub struct LoweringBuilder<'a> {
    config: &'a TargetConfig,
    key: EntryKey,
    symbol: String,
    values: Vec<ValueDef>,
    names: HashSet<String>,
    insts: Vec<Inst>,
}

impl<'a> LoweringBuilder<'a> {
    pub fn new(config: &'a TargetConfig, key: EntryKey, param: VectorType) -> Self {
        let mut builder = Self {
            config,
            key,
            symbol: key.symbol(&config.symbol_prefix),
            values: Vec::new(),
            names: HashSet::new(),
            insts: Vec::new(),
        };
        builder.define("arg", param);
        builder
    }

    pub fn config(&self) -> &TargetConfig {
        self.config
    }

    pub fn arg(&self) -> ValueId {
        ValueId::ARG
    }

    pub fn ty(&self, id: ValueId) -> VectorType {
        self.values[id.0].ty
    }

    fn define(&mut self, name: &str, ty: VectorType) -> ValueId {
        let mut unique = name.to_string();
        let mut n = 1;
        while self.names.contains(&unique) {
            unique = format!("{name}.{n}");
            n += 1;
        }
        self.names.insert(unique.clone());
        self.values.push(ValueDef { name: unique, ty });
        ValueId(self.values.len() - 1)
    }

    /// Bitcast `src` to `elem`.
    pub fn bitcast(&mut self, src: ValueId, elem: ElemWidth, name: &str) -> ValueId {
        let ty = self.ty(src).bitcast_to(elem);
        let result = self.define(name, ty);
        self.insts.push(Inst {
            result,
            kind: InstKind::Bitcast { src },
        });
        result
    }

    /// `src` viewed at `elem`, bitcasting only if the view differs.
    pub fn view_as(&mut self, src: ValueId, elem: ElemWidth, name: &str) -> ValueId {
        if self.ty(src).elem == elem {
            src
        } else {
            self.bitcast(src, elem, name)
        }
    }

    /// Call `primitive` on `args`.
    pub fn call(
        &mut self,
        primitive: Primitive,
        args: &[ValueId],
        control: Option<i32>,
        name: &str,
    ) -> LoweringResult<ValueId> {
        let expected = primitive.operand_types(self.config);
        if args.len() != expected.len() {
            return Err(LoweringError::OperandCount {
                primitive: primitive.mnemonic(),
                expected: expected.len(),
                found: args.len(),
            });
        }
        for (index, (&arg, &want)) in args.iter().zip(&expected).enumerate() {
            let found = self.ty(arg);
            if found != want {
                return Err(LoweringError::OperandMismatch {
                    primitive: primitive.mnemonic(),
                    index,
                    expected: want,
                    found,
                });
            }
        }

        match (primitive.takes_control(), control) {
            (true, Some(c)) => {
                control_width(primitive, c)?;
            }
            (false, None) => {}
            (_, c) => {
                return Err(LoweringError::InvalidControl {
                    primitive: primitive.mnemonic(),
                    control: c.unwrap_or_default(),
                })
            }
        }

        let result = self.define(name, primitive.result_type(self.config));
        self.insts.push(Inst {
            result,
            kind: InstKind::Call {
                primitive,
                args: args.to_vec(),
                control,
            },
        });
        Ok(result)
    }

    /// Read both registers of a pair-wide word vector.
    pub fn split(
        &mut self,
        src: ValueId,
        lo_name: &str,
        hi_name: &str,
    ) -> LoweringResult<(ValueId, ValueId)> {
        let lo = self.call(Primitive::Lo, &[src], None, lo_name)?;
        let hi = self.call(Primitive::Hi, &[src], None, hi_name)?;
        Ok((lo, hi))
    }

    /// Finish with `ret`, which must have the `declared` type.
    pub fn finish(self, ret: ValueId, declared: VectorType) -> LoweringResult<Lowering> {
        let found = self.ty(ret);
        if found != declared {
            return Err(LoweringError::WidthClosure {
                symbol: self.symbol,
                declared,
                found,
            });
        }

        Ok(Lowering {
            key: self.key,
            symbol: self.symbol,
            vector_length: self.config.vector_length,
            values: self.values,
            insts: self.insts,
            ret,
        })
    }
}
