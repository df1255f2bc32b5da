// This module prints the lowering table as textual LLVM assembly, the form the table is
// linked into generated code as. Each entry becomes one weak_odr function marked
// nounwind, readnone and alwaysinline so the host compiler treats a call as the expanded
// primitive sequence: it may inline, reorder, duplicate or CSE calls freely. A module is a
// header, one declaration per distinct llvm.hexagon.V6 intrinsic in first-use order, and
// every entry in table order. Bitcode and native objects are not produced here.

//! LLVM assembly emission.

use std::fs;
use std::path::Path;

use hashbrown::HashSet;

use crate::core::LoweringResult;
use crate::table::{EntryKey, InstKind, Lowering, LoweringTable, ValueId};

/// Attributes on every emitted entry.
pub const ENTRY_ATTRIBUTES: &str = "nounwind uwtable readnone alwaysinline";

/// `declare` line for each intrinsic `lowering` calls, in call order.
fn declarations(lowering: &Lowering) -> Vec<(String, String)> {
    let length = lowering.vector_length();
    lowering
        .insts()
        .iter()
        .filter_map(|inst| match &inst.kind {
            InstKind::Call {
                primitive, args, ..
            } => {
                let name = primitive.intrinsic(length);
                let mut params: Vec<String> = args
                    .iter()
                    .map(|&arg| lowering.value(arg).ty.llvm())
                    .collect();
                if primitive.takes_control() {
                    params.push("i32".to_string());
                }
                let decl = format!(
                    "declare {} @{}({}) nounwind readnone",
                    lowering.value(inst.result).ty.llvm(),
                    name,
                    params.join(", ")
                );
                Some((name, decl))
            }
            InstKind::Bitcast { .. } => None,
        })
        .collect()
}

/// Print one entry as an LLVM function definition.
pub fn emit_lowering(lowering: &Lowering) -> String {
    let length = lowering.vector_length();
    let mut out = String::new();
    let arg = lowering.value(ValueId::ARG);

    out.push_str(&format!(
        "define weak_odr {} @{}({} %{}) {} {{\n",
        lowering.result_type().llvm(),
        lowering.symbol(),
        arg.ty.llvm(),
        arg.name,
        ENTRY_ATTRIBUTES
    ));

    for inst in lowering.insts() {
        let result = lowering.value(inst.result);
        match &inst.kind {
            InstKind::Bitcast { src } => {
                let src = lowering.value(*src);
                out.push_str(&format!(
                    "  %{} = bitcast {} %{} to {}\n",
                    result.name,
                    src.ty.llvm(),
                    src.name,
                    result.ty.llvm()
                ));
            }
            InstKind::Call {
                primitive,
                args,
                control,
            } => {
                let mut operands: Vec<String> = args
                    .iter()
                    .map(|&id| {
                        let value = lowering.value(id);
                        format!("{} %{}", value.ty.llvm(), value.name)
                    })
                    .collect();
                if let Some(control) = control {
                    operands.push(format!("i32 {control}"));
                }
                out.push_str(&format!(
                    "  %{} = call {} @{}({})\n",
                    result.name,
                    result.ty.llvm(),
                    primitive.intrinsic(length),
                    operands.join(", ")
                ));
            }
        }
    }

    let ret = lowering.value(lowering.ret());
    out.push_str(&format!("  ret {} %{}\n", ret.ty.llvm(), ret.name));
    out.push_str("}\n");
    out
}

/// Print a module holding `lowerings`, with the intrinsic declarations they need.
pub fn emit_lowerings<'a, I>(header: &str, lowerings: I) -> String
where
    I: IntoIterator<Item = &'a Lowering>,
{
    let lowerings: Vec<&Lowering> = lowerings.into_iter().collect();
    let mut out = String::new();
    out.push_str("; ModuleID = 'hvx_shuffle'\n");
    out.push_str(&format!("; {header}\n\n"));

    let mut seen = HashSet::new();
    for lowering in &lowerings {
        for (name, decl) in declarations(lowering) {
            if seen.insert(name) {
                out.push_str(&decl);
                out.push('\n');
            }
        }
    }

    for lowering in &lowerings {
        out.push('\n');
        out.push_str(&emit_lowering(lowering));
    }
    out
}

/// Print the whole table.
pub fn emit_module(table: &LoweringTable) -> String {
    let header = format!(
        "hvx shuffle lowering table, {}-byte vectors",
        table.config().vector_length.bytes()
    );
    emit_lowerings(&header, table.iter())
}

/// One line per entry: symbol, signature and the primitives it calls.
pub fn emit_listing(table: &LoweringTable) -> String {
    let mut out = String::new();
    for lowering in table.iter() {
        let primitives: Vec<&str> = lowering.primitives().iter().map(|p| p.mnemonic()).collect();
        out.push_str(&format!(
            "{}: {} -> {} [{}]\n",
            lowering.symbol(),
            lowering.param_type(),
            lowering.result_type(),
            primitives.join(", ")
        ));
    }
    out
}

/// Print `entries` as a module, or the whole table when `entries` is empty.
pub fn emit_entries(table: &LoweringTable, entries: &[EntryKey]) -> LoweringResult<String> {
    if entries.is_empty() {
        return Ok(emit_module(table));
    }
    let lowerings = entries
        .iter()
        .map(|&key| table.get(key))
        .collect::<LoweringResult<Vec<_>>>()?;
    let header = entries
        .iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(emit_lowerings(&header, lowerings))
}

/// Write [`emit_entries`] output to `path`.
pub fn write_module(
    table: &LoweringTable,
    entries: &[EntryKey],
    path: &Path,
) -> LoweringResult<()> {
    let text = emit_entries(table, entries)?;
    fs::write(path, text)?;
    let count = if entries.is_empty() { table.len() } else { entries.len() };
    log::info!("wrote {} lowerings to {}", count, path.display());
    Ok(())
}
