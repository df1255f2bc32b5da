//! `hvx-table` - inspect and emit the HVX shuffle lowering table.
//!
//! **Usage:**
//! ```text
//! hvx-table [--vector-bytes 64|128] [--prefix P] list
//! hvx-table [--vector-bytes 64|128] [--prefix P] emit [ENTRY...] [-o PATH]
//! hvx-table [--vector-bytes 64|128] [--prefix P] eval ENTRY [--lanes N,N,...]
//! ```
//!
//! Defaults come from `HVX_VECTOR_BYTES` and `HVX_SYMBOL_PREFIX`; flags win.
//! Set `RUST_LOG` for diagnostics.

use clap::Parser;
use hvx_shuffle::cli::{self, Args};

fn main() {
    env_logger::init();

    match cli::run(&Args::parse()) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
