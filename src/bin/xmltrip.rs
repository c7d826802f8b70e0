//! Command-line front end for the round-trip engine.
//!
//! Re-emits XML files unchanged (the default), pretty-printed, minimized, or
//! compacted, checks that a file survives a parse/serialize round trip byte
//! for byte, and converts between output encodings.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use xmltrip::{parse_bytes, Config, Document};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// xmltrip -- parse and re-emit XML without disturbing its formatting.
#[derive(Parser, Debug)]
#[command(name = "xmltrip", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// XML files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Log parser and serializer activity to stderr.
    #[arg(long, short)]
    verbose: bool,

    // -- Output modes ------------------------------------------------------
    /// Re-indent the output, ignoring the original layout.
    #[arg(long, conflicts_with_all = ["minimal", "raw"])]
    pretty: bool,

    /// Drop comments, processing instructions, and the XML declaration.
    #[arg(long, conflicts_with = "raw")]
    minimal: bool,

    /// Compact output with whitespace-only text removed.
    #[arg(long)]
    raw: bool,

    /// Indentation unit for --pretty (e.g. "\t"). Defaults to four spaces.
    #[arg(long, value_name = "STRING")]
    indent: Option<String>,

    /// Only verify that each file round-trips byte for byte; print nothing.
    #[arg(long)]
    check: bool,

    /// Output in the given encoding (e.g., UTF-8, ISO-8859-1, UTF-16LE).
    /// Defaults to the document's own encoding.
    #[arg(long, value_name = "ENCODING")]
    encode: Option<String>,

    /// Save output to a file instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    output: Option<String>,
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_ROUNDTRIP_MISMATCH: u8 = 2;
const EXIT_IO_ERROR: u8 = 3;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut worst_exit: u8 = EXIT_SUCCESS;
    for file in &cli.files {
        let exit = process_file(&cli, file);
        if exit > worst_exit {
            worst_exit = exit;
        }
    }

    ExitCode::from(worst_exit)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "xmltrip=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let input = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_IO_ERROR;
        }
    };

    let doc = match parse_bytes(&input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{filename}: {e}");
            eprintln!("{}", e.snippet());
            return EXIT_PARSE_ERROR;
        }
    };
    debug!(file = filename, encoding = doc.encoding(), "parsed");

    if cli.check {
        return check_roundtrip(filename, &doc, &input);
    }

    let config = build_config(cli);
    let mut bytes = Vec::with_capacity(input.len());
    if let Err(e) = doc.write_bytes_with(&mut bytes, cli.encode.as_deref(), &config) {
        eprintln!("{filename}: {e}");
        return EXIT_IO_ERROR;
    }

    match write_output(cli, &bytes) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{filename}: failed to write output: {e}");
            EXIT_IO_ERROR
        }
    }
}

/// Re-encodes the unmodified document in its own encoding and compares it
/// with the input bytes.
fn check_roundtrip(filename: &str, doc: &Document, input: &[u8]) -> u8 {
    let mut bytes = Vec::with_capacity(input.len());
    if let Err(e) = doc.write_bytes(&mut bytes, None) {
        eprintln!("{filename}: {e}");
        return EXIT_IO_ERROR;
    }
    if bytes == input {
        info!(file = filename, bytes = input.len(), "round trip is byte-identical");
        return EXIT_SUCCESS;
    }

    let offset = bytes
        .iter()
        .zip(input)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| bytes.len().min(input.len()));
    eprintln!("{filename}: round trip differs at byte {offset}");
    EXIT_ROUNDTRIP_MISMATCH
}

fn build_config(cli: &Cli) -> Config {
    let config = if cli.pretty {
        Config::pretty()
    } else if cli.minimal {
        Config::minimal()
    } else if cli.raw {
        Config::raw()
    } else {
        Config::defaults()
    };
    match &cli.indent {
        Some(indent) if cli.pretty => config.indent_unit(unescape(indent)),
        _ => config,
    }
}

/// Expands `\t` and `\n` typed literally on the command line.
fn unescape(s: &str) -> String {
    s.replace("\\t", "\t").replace("\\n", "\n")
}

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// Reads input from a file or stdin (when filename is `-`).
fn read_input(filename: &str) -> io::Result<Vec<u8>> {
    if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(filename)
    }
}

fn write_output(cli: &Cli, bytes: &[u8]) -> io::Result<()> {
    match &cli.output {
        Some(path) => fs::write(path, bytes),
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(bytes)?;
            lock.flush()
        }
    }
}
