//! `json-tree-diff`: print the patch that turns one JSON document into
//! another.
//!
//! Usage:
//!   json-tree-diff <source.json> <target.json>
//!
//! The patch is written to stdout in the JSON patch encoding accepted by
//! `json-tree-patch`.

use std::io::{self, Write};
use std::process;

use json_tree::json_cli::{diff_documents, init_tracing, read_file, CliError};

fn run(args: &[String]) -> Result<String, CliError> {
    let [source, target] = args else {
        return Err(CliError::Usage("json-tree-diff <source.json> <target.json>".into()));
    };
    diff_documents(&read_file(source)?, &read_file(target)?)
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(patch) => {
            let mut out = io::stdout().lock();
            if let Err(e) = writeln!(out, "{patch}") {
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
