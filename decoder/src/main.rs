//! Decode a transmission and evaluate its expression.
//!
//! The transmission is a single line of hexadecimal text, supplied either directly or as the
//! first line of a file. Two results are printed to stdout:
//! 1. The sum of the version fields of every packet.
//! 2. The value of the expression encoded by the packet tree.
//!
//! Logs are written to stderr.
//!
//! # Usage
//!
//! ```sh
//! cargo run --release -- --hex 9C0141080250320F1802104A08
//! ```
//!
//! ```txt
//! 20
//! 1
//! ```
//!
//! ```sh
//! cargo run --release -- --path input.txt --tree
//! ```

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};
use tracing::{debug, error, info, Level};
use transmission_codec::{evaluate, version_sum, Config, Decode, Error, Packet};

/// Results of decoding and evaluating one transmission.
#[derive(Debug, PartialEq, Eq)]
struct Summary {
    version_sum: u64,
    value: u64,
}

/// Returns the first line of the file at `path`, or an empty string if the file is empty.
fn read_line(path: &Path) -> io::Result<String> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    lines.next().unwrap_or_else(|| Ok(String::new()))
}

/// Decodes `hex` and folds the resulting tree.
fn run(hex: &str, cfg: &Config) -> Result<(Packet, Summary), Error> {
    let packet = Packet::decode_hex_cfg(hex, cfg)?;
    let summary = Summary {
        version_sum: version_sum(&packet),
        value: evaluate(&packet)?,
    };
    Ok((packet, summary))
}

fn main() {
    // Parse arguments
    let matches = Command::new("transmission-decoder")
        .about("decode a transmission and evaluate its expression")
        .arg(
            Arg::new("path")
                .long("path")
                .value_parser(value_parser!(PathBuf))
                .help("File whose first line holds the transmission"),
        )
        .arg(
            Arg::new("hex")
                .long("hex")
                .help("Transmission as hexadecimal text"),
        )
        .group(
            ArgGroup::new("input")
                .args(["path", "hex"])
                .required(true),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_parser(value_parser!(usize))
                .help("Maximum packet nesting (default 256)"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .action(ArgAction::SetTrue)
                .help("Print the decoded packet tree"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .get_matches();

    // Create logger
    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // Load input
    let hex = if let Some(path) = matches.get_one::<PathBuf>("path") {
        match read_line(path) {
            Ok(line) => line,
            Err(err) => {
                error!(path = %path.display(), ?err, "failed to read input");
                process::exit(1);
            }
        }
    } else {
        matches
            .get_one::<String>("hex")
            .cloned()
            .unwrap_or_default()
    };
    debug!(digits = hex.trim().len(), "loaded transmission");

    // Decode and evaluate
    let cfg = matches
        .get_one::<usize>("max-depth")
        .copied()
        .map(Config::new)
        .unwrap_or_default();
    let (packet, summary) = match run(&hex, &cfg) {
        Ok(result) => result,
        Err(err) => {
            error!(?err, "failed to process transmission");
            process::exit(1);
        }
    };
    info!(
        version_sum = summary.version_sum,
        value = summary.value,
        "processed transmission"
    );

    if matches.get_flag("tree") {
        println!("{packet}");
    }
    println!("{}", summary.version_sum);
    println!("{}", summary.value);
}
