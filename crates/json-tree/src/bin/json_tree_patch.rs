//! `json-tree-patch`: apply an encoded patch to a JSON document.
//!
//! Usage:
//!   json-tree-patch <patch.json> [strict|lenient|clobber]
//!
//! The document is read from stdin and the result written to stdout.

use std::io::{self, Read, Write};
use std::process;

use json_tree::json_cli::{apply_patch_document, init_tracing, parse_mode, read_file, CliError};

fn run(args: &[String]) -> Result<String, CliError> {
    let (patch_file, mode) = match args {
        [patch_file] => (patch_file, None),
        [patch_file, mode] => (patch_file, Some(mode.as_str())),
        _ => {
            return Err(CliError::Usage(
                "json-tree-patch <patch.json> [strict|lenient|clobber]".into(),
            ))
        }
    };
    let mode = parse_mode(mode)?;
    let patch = read_file(patch_file)?;
    let mut doc = String::new();
    io::stdin().read_to_string(&mut doc)?;
    apply_patch_document(doc.trim(), &patch, mode)
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(result) => {
            let mut out = io::stdout().lock();
            if let Err(e) = writeln!(out, "{result}") {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
