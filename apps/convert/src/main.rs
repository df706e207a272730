// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! gedcom-convert - Convert GEDCOM files to XML or normalized GEDCOM.
//!
//! Reads a GEDCOM file in any supported character set and writes the
//! element event stream as a UTF-8 XML document (default) or as clean
//! UTF-8 GEDCOM.
//!
//! Parser thresholds come from the environment:
//!
//! - `GEDCOM_VALIDITY_WINDOW` - leading lines checked for garbage (default 20)
//! - `GEDCOM_SNIFF_LINES` - header lines scanned for `CHAR` (default 100)
//! - `GEDCOM_PROGRESS_INTERVAL` - lines between progress logs (default 10000)
//! - `GEDCOM_ROOT_ELEMENT` - document root name (default `GED`)
//! - `LOG_FORMAT=json` - structured log output

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use gedcom_lite_core::{Charset, GedcomReader, GedcomWriter, Input};

mod config;
mod xml;

use config::Config;
use xml::XmlSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Xml,
    Gedcom,
}

/// Convert a GEDCOM genealogy file.
#[derive(Parser, Debug)]
#[command(name = "gedcom-convert", version, about)]
struct Args {
    /// GEDCOM file to read, or `-` for stdin.
    input: PathBuf,

    /// Write output here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decode with this character set instead of detecting it
    /// (e.g. ANSEL, UTF-8, WINDOWS-1251).
    #[arg(long)]
    encoding: Option<String>,

    /// Keep the output of documents flagged invalid.
    #[arg(long)]
    allow_invalid: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Xml)]
    format: Format,

    /// Print a JSON parse summary to stderr.
    #[arg(long)]
    summary: bool,
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_logging(&config);

    tracing::debug!(?config, "Starting gedcom-convert");

    let mut input = if args.input.as_os_str() == "-" {
        Input::reader(io::stdin().lock())
    } else {
        Input::path(&args.input)
    };
    if let Some(encoding) = &args.encoding {
        let charset = Charset::resolve(encoding).with_context(|| format!("invalid --encoding {:?}", encoding))?;
        input = input.with_charset(charset);
    }

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut reader = GedcomReader::new(config.parser_config());
    let result = match args.format {
        Format::Xml => reader.parse(input, &mut XmlSink::new(out)),
        Format::Gedcom => reader.parse(input, &mut GedcomWriter::new(out)),
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            discard_output(args.output.as_deref());
            return Err(err).with_context(|| format!("failed to convert {}", args.input.display()));
        }
    };

    if args.summary {
        eprintln!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    if !outcome.is_valid() {
        if args.allow_invalid {
            tracing::warn!(validity = ?outcome.validity, "Keeping output of invalid document");
        } else {
            discard_output(args.output.as_deref());
            bail!(
                "{} is not a valid GEDCOM document ({:?}); rerun with --allow-invalid to keep the output",
                args.input.display(),
                outcome.validity
            );
        }
    }

    Ok(())
}

/// Remove a partially written output file
fn discard_output(path: Option<&Path>) {
    if let Some(path) = path {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %err, "Could not remove output file");
        }
    }
}
