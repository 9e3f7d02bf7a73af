//! Record extraction for the delimited sales export.
//!
//! One record per line, comma-delimited, fields addressed by position. Only
//! the positions below are recognized; everything else on the line is
//! ignored. Tokenizing is a plain comma split: the export carries no quoted
//! or escaped fields, and that is part of the input contract.
//!
//! Every extraction failure (short line, unparsable number, unparsable
//! timestamp) is a recoverable parse error: the caller skips the record and
//! keeps going. A header line fails the first numeric field and is skipped
//! like any other malformed record.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{Datelike, NaiveDateTime};

use crunchcrab_core::error::{Error, Result};

/// Positional field indices in the sales export.
const FIELD_COUNTRY: usize = 2;
const FIELD_ITEM_TYPE: usize = 3;
const FIELD_ORDER_TS: usize = 6;
const FIELD_ORDER_ID: usize = 7;
const FIELD_UNITS_SOLD: usize = 9;
const FIELD_UNIT_PRICE: usize = 10;
const FIELD_TOTAL_PROFIT: usize = 14;

/// A line must carry at least this many fields to be extractable.
const MIN_FIELDS: usize = 15;

/// Order timestamp format; only the year is consumed downstream.
const ORDER_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One extracted sales record. Ephemeral: produced per input line and
/// consumed immediately into a (key, value) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub country: String,
    pub item_type: String,
    pub order_year: i32,
    pub order_id: i64,
    pub units_sold: i64,
    pub unit_price: f64,
    pub total_profit: f64,
}

/// Extract one record from one line.
pub fn parse_line(line: &str) -> Result<SalesRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(Error::Parse {
            field: "record",
            reason: format!("expected at least {} fields, got {}", MIN_FIELDS, fields.len()),
        });
    }

    Ok(SalesRecord {
        country: fields[FIELD_COUNTRY].to_string(),
        item_type: fields[FIELD_ITEM_TYPE].to_string(),
        order_year: parse_order_year(fields[FIELD_ORDER_TS])?,
        order_id: parse_int(fields[FIELD_ORDER_ID], "order id")?,
        units_sold: parse_int(fields[FIELD_UNITS_SOLD], "units sold")?,
        unit_price: parse_float(fields[FIELD_UNIT_PRICE], "unit price")?,
        total_profit: parse_float(fields[FIELD_TOTAL_PROFIT], "total profit")?,
    })
}

/// Parse the order timestamp and keep the year.
///
/// An unparsable timestamp is a parse error for the caller to handle, never
/// a sentinel year.
fn parse_order_year(raw: &str) -> Result<i32> {
    let ts = NaiveDateTime::parse_from_str(raw, ORDER_TS_FORMAT).map_err(|e| Error::Parse {
        field: "order timestamp",
        reason: e.to_string(),
    })?;
    Ok(ts.year())
}

fn parse_int(raw: &str, field: &'static str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|e| Error::Parse {
        field,
        reason: e.to_string(),
    })
}

fn parse_float(raw: &str, field: &'static str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|e| Error::Parse {
        field,
        reason: e.to_string(),
    })
}

/// Read every line of the input file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}
