//! The `hvx-table` command line.
//!
//! Argument parsing and command execution live here so the binary and the
//! FileCheck runner behave identically for the same argv.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::{LoweringResult, TargetConfig, Vector, VectorLength};
use crate::emit::{emit_entries, emit_listing, write_module};
use crate::table::{EntryKey, LoweringTable};

#[derive(Parser, Debug)]
#[command(name = "hvx-table", about = "HVX shuffle lowering table")]
pub struct Args {
    /// Vector register size in bytes (64 or 128).
    #[arg(long, global = true)]
    pub vector_bytes: Option<usize>,

    /// Symbol prefix of the emitted entries.
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every entry with its signature and primitive sequence.
    List,
    /// Print entries as LLVM assembly (the whole table without ENTRY).
    Emit {
        /// Entries such as `interleave.h`.
        entries: Vec<EntryKey>,
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run one entry on the reference model and print the result lanes.
    Eval {
        entry: EntryKey,
        /// Input lanes; defaults to 0, 1, 2, ...
        #[arg(long, value_delimiter = ',')]
        lanes: Option<Vec<u32>>,
    },
}

/// Environment configuration with the command-line overrides applied.
pub fn config(args: &Args) -> LoweringResult<TargetConfig> {
    let mut config = TargetConfig::from_env()?;
    if let Some(bytes) = args.vector_bytes {
        config.vector_length = VectorLength::from_bytes(bytes)?;
    }
    if let Some(prefix) = &args.prefix {
        config = config.with_symbol_prefix(prefix.as_str())?;
    }
    Ok(config)
}

/// Execute `args` and return what goes to stdout.
pub fn run(args: &Args) -> LoweringResult<String> {
    let table = LoweringTable::build(&config(args)?)?;

    match &args.command {
        Command::List => Ok(emit_listing(&table)),
        Command::Emit {
            entries,
            output: Some(path),
        } => {
            write_module(&table, entries, path)?;
            Ok(String::new())
        }
        Command::Emit {
            entries,
            output: None,
        } => emit_entries(&table, entries),
        Command::Eval { entry, lanes } => {
            let lowering = table.get(*entry)?;
            let input = match lanes {
                Some(lanes) => Vector::try_from_lanes(lowering.param_type().elem, lanes)?,
                None => Vector::iota(lowering.param_type()),
            };
            let out = table.evaluate(*entry, &input)?;
            let lanes: Vec<String> = out.lanes().iter().map(u32::to_string).collect();
            Ok(format!(
                "{}: {}\n{}\n",
                lowering.symbol(),
                lowering.result_type(),
                lanes.join(" ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoweringError;

    fn run_argv(argv: &[&str]) -> LoweringResult<String> {
        let args = Args::try_parse_from(std::iter::once("hvx-table").chain(argv.iter().copied()))
            .unwrap();
        run(&args)
    }

    #[test]
    fn test_list_has_every_entry() {
        let out = run_argv(&["--vector-bytes", "64", "--prefix", "hvx", "list"]).unwrap();
        assert_eq!(out.lines().count(), 10);
        assert!(out.starts_with("hvx.interleave.w: <32 x i32> -> <32 x i32> [lo, hi, vshuffvdd]\n"));
    }

    #[test]
    fn test_eval_output_format() {
        let out = run_argv(&["--vector-bytes", "64", "--prefix", "hvx", "eval", "interleave.w"])
            .unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("hvx.interleave.w: <32 x i32>"));
        let lanes: Vec<u32> = lines
            .next()
            .unwrap()
            .split(' ')
            .map(|l| l.parse().unwrap())
            .collect();
        let expected: Vec<u32> = (0..16).flat_map(|k| [k, k + 16]).collect();
        assert_eq!(lanes, expected);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_eval_with_lanes() {
        let lanes: Vec<String> = (0..128).map(|i| (i % 200).to_string()).collect();
        let arg = lanes.join(",");
        let out = run_argv(&["--vector-bytes", "64", "eval", "deinterleave.b", "--lanes", &arg])
            .unwrap();
        let last = out.lines().nth(1).unwrap();
        assert!(last.starts_with("0 2 4 6"));
    }

    #[test]
    fn test_eval_rejects_lane_overflow() {
        let lanes = vec!["300"; 128].join(",");
        let err = run_argv(&["--vector-bytes", "64", "eval", "interleave.b", "--lanes", &lanes])
            .unwrap_err();
        assert!(matches!(
            err,
            LoweringError::LaneValue { index: 0, value: 300, .. }
        ));
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from(["hvx-table", "emit", "--vector-bytes", "128", "trunchi.b"])
            .unwrap();
        assert_eq!(config(&args).unwrap().vector_length, VectorLength::B128);
        let out = run(&args).unwrap();
        assert!(out.contains("vpackob.128B"));
    }

    #[test]
    fn test_emit_to_file() {
        let path = std::env::temp_dir().join(format!("hvx-table-{}.ll", std::process::id()));
        let path_arg = path.to_string_lossy().into_owned();
        let out = run_argv(&[
            "--vector-bytes",
            "64",
            "--prefix",
            "hvx",
            "emit",
            "-o",
            &path_arg,
            "interleave.h",
        ])
        .unwrap();
        assert!(out.is_empty());

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(text.matches("define weak_odr").count(), 1);
        assert!(text.contains("@hvx.interleave.h("));
    }
}
