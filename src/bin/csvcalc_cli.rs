//! CLI tool for csvcalc - plans rows from a CSV file and replays quantity edits
//!
//! Usage:
//!   csvcalc_cli <items.csv>                          # Print planned rows as JSON
//!   csvcalc_cli <items.csv> -c options.json          # Use calculator options
//!   csvcalc_cli <items.csv> -q 0=2 -q 1=3            # Apply quantities, print totals
//!   csvcalc_cli <items.csv> --id 0 --price 2         # Choose id/price columns

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};

use csvcalc::error::{CsvCalcError, Result};
use csvcalc::logging::init_logging_stderr;
use csvcalc::{parse_document, CalcOptions, Ledger, TemplateBinding};

const USAGE: &str =
    "Usage: csvcalc_cli <input.csv> [-c options.json] [--id COL] [--price COL] [-q ROW=QTY]...";

struct Args {
    input: String,
    options: Option<String>,
    id_column: usize,
    price_column: usize,
    edits: Vec<(usize, String)>,
}

fn parse_column(flag: &str, value: Option<String>) -> Result<usize> {
    let value = value.ok_or_else(|| CsvCalcError::Other(format!("{flag} needs a value")))?;
    value
        .parse()
        .map_err(|_| CsvCalcError::Other(format!("{flag}: not a column index: {value}")))
}

fn parse_edit(value: Option<String>) -> Result<(usize, String)> {
    let value = value.ok_or_else(|| CsvCalcError::Other("-q needs ROW=QTY".into()))?;
    let (row, qty) = value
        .split_once('=')
        .ok_or_else(|| CsvCalcError::Other(format!("-q: expected ROW=QTY, got {value}")))?;
    let row = row
        .parse()
        .map_err(|_| CsvCalcError::Other(format!("-q: not a row index: {row}")))?;
    Ok((row, qty.to_string()))
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let input = args.next().ok_or_else(|| CsvCalcError::Other(USAGE.into()))?;
    let mut parsed = Args {
        input,
        options: None,
        id_column: 0,
        price_column: 2,
        edits: Vec::new(),
    };

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-c" => parsed.options = args.next(),
            "--id" => parsed.id_column = parse_column("--id", args.next())?,
            "--price" => parsed.price_column = parse_column("--price", args.next())?,
            "-q" => parsed.edits.push(parse_edit(args.next())?),
            other => return Err(CsvCalcError::Other(format!("unknown argument {other}\n{USAGE}"))),
        }
    }
    Ok(parsed)
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let options = match &args.options {
        Some(path) => CalcOptions::from_json(&fs::read_to_string(path)?)?,
        None => CalcOptions::default(),
    };
    let text = fs::read_to_string(&args.input)?;

    let binding = TemplateBinding {
        id_column: Some(args.id_column),
    };
    let rows = binding.materialize(&parse_document(&text, &options));
    let mut ledger = Ledger::from_columns(
        &rows,
        args.id_column,
        args.price_column,
        options.only_integer,
    );

    let mut edits = Vec::with_capacity(args.edits.len());
    for (row, qty) in &args.edits {
        match ledger.apply_quantity(*row, qty) {
            Some(update) => edits.push(serde_json::json!({
                "row": row,
                "input": qty,
                "update": update,
            })),
            None => tracing::warn!(row, rows = ledger.len(), "edit ignored, no such row"),
        }
    }

    let report = serde_json::json!({
        "rows": rows,
        "records": ledger.rows(),
        "edits": edits,
        "total": ledger.total(),
    });
    let json = serde_json::to_string_pretty(&report)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(json.as_bytes())?;
    writeln!(stdout)?;
    Ok(())
}

fn main() {
    init_logging_stderr();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
