//! Parsing of raw asset metadata text into flat records.
//!
//! Supported inputs: JSON arrays, JSONL, delimited CSV/TSV with a header
//! row, and bare newline-delimited id lists.

use nom::{bytes::complete::take_while, character::complete::char, IResult};
use serde_json::Value;

use crate::error::{AssetError, Result};
use crate::record::{Record, ID_FIELD};

/// Input data format for a metadata load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// A JSON array of objects.
    Json,
    /// One JSON object per line.
    Jsonl,
    /// Comma-separated values with a header row.
    Csv,
    /// Tab-separated values with a header row, no quoting.
    Tsv,
    /// One bare identifier per line.
    IdList,
}

impl DataFormat {
    /// Look up a format by its explicit option name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" => Some(Self::Jsonl),
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// Guess the format from a filename extension. Anything unrecognized is
    /// treated as a bare id list.
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
            Some(ext) => Self::from_name(&ext).unwrap_or(Self::IdList),
            None => Self::IdList,
        }
    }
}

/// Options controlling record parsing.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Fields exempt from dynamic typing; their values always stay strings.
    /// Identifier fields belong here so numeric-looking ids survive intact.
    pub string_fields: Vec<String>,
    /// Fields whose values are comma-split into string arrays.
    pub array_fields: Vec<String>,
    /// Whether JSONL lines holding arrays are flattened into the record list.
    pub flatten: bool,
}

/// Parse raw text into an ordered sequence of flat records.
pub fn parse_records(data: &str, format: DataFormat, opts: &ParseOptions) -> Result<Vec<Record>> {
    match format {
        DataFormat::Json => Ok(serde_json::from_str(data)?),
        DataFormat::Jsonl => parse_jsonl(data, opts.flatten),
        DataFormat::Csv => parse_delimited(data, ',', true, opts),
        DataFormat::Tsv => parse_delimited(data, '\t', false, opts),
        DataFormat::IdList => Ok(parse_id_list(data)),
    }
}

/// Parse a double-quoted field with `""` escapes. May span newlines.
fn quoted_field(input: &str) -> IResult<&str, String> {
    let (input, _) = char('"')(input)?;
    let mut out = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '"' {
            if input[i + 1..].starts_with('"') {
                out.push('"');
                chars.next();
            } else {
                return Ok((&input[i + 1..], out));
            }
        } else {
            out.push(c);
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse an unquoted field: everything up to the delimiter or line ending.
fn bare_field(input: &str, delim: char) -> IResult<&str, &str> {
    take_while(|c| c != delim && c != '\n' && c != '\r')(input)
}

/// Parse one delimited row, consuming its line ending.
fn read_row(input: &str, delim: char, quoting: bool) -> IResult<&str, Vec<String>> {
    let mut fields = Vec::new();
    let mut rest = input;
    loop {
        let (r, value) = if quoting && rest.starts_with('"') {
            quoted_field(rest)?
        } else {
            let (r, s) = bare_field(rest, delim)?;
            (r, s.to_string())
        };
        fields.push(value);
        rest = r;
        if let Some(r) = rest.strip_prefix(delim) {
            rest = r;
            continue;
        }
        if rest.is_empty() {
            return Ok((rest, fields));
        }
        if let Some(r) = rest.strip_prefix("\r\n") {
            return Ok((r, fields));
        }
        if let Some(r) = rest.strip_prefix('\n') {
            return Ok((r, fields));
        }
        if let Some(r) = rest.strip_prefix('\r') {
            return Ok((r, fields));
        }
        // Trailing junk after a closing quote.
        return Err(nom::Err::Failure(nom::error::Error::new(
            rest,
            nom::error::ErrorKind::Char,
        )));
    }
}

fn parse_delimited(data: &str, delim: char, quoting: bool, opts: &ParseOptions) -> Result<Vec<Record>> {
    let mut rest = data;
    let mut line = 0usize;

    let header: Vec<String> = loop {
        if rest.is_empty() {
            return Err(AssetError::MissingHeader);
        }
        line += 1;
        let (r, row) = read_row(rest, delim, quoting)
            .map_err(|_| AssetError::parse("malformed row", line))?;
        rest = r;
        if row.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        break row.iter().map(|h| h.trim().to_string()).collect();
    };

    let mut records = Vec::new();
    while !rest.is_empty() {
        line += 1;
        let (r, row) = read_row(rest, delim, quoting)
            .map_err(|_| AssetError::parse("malformed row", line))?;
        rest = r;
        if row.iter().all(|f| f.is_empty()) {
            continue;
        }
        let mut record = Record::new();
        for (i, raw) in row.iter().enumerate() {
            let Some(field) = header.get(i) else {
                log::warn!("line {line}: dropping value beyond header width");
                continue;
            };
            let value = if opts.string_fields.iter().any(|f| f == field) {
                Value::String(raw.clone())
            } else {
                dynamic_value(raw)
            };
            record.set(field.clone(), value);
        }
        split_array_fields(&mut record, &opts.array_fields);
        records.push(record);
    }
    log::debug!("parsed {} delimited records", records.len());
    Ok(records)
}

/// Dynamic typing for delimited values: booleans and numbers are promoted,
/// everything else stays a string.
fn dynamic_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if !trimmed.is_empty() {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::from(f);
            }
        }
    }
    Value::String(raw.to_string())
}

/// Coerce configured fields to comma-split string arrays. Empty values map
/// to an empty array rather than `[""]`.
fn split_array_fields(record: &mut Record, array_fields: &[String]) {
    for field in array_fields {
        let Some(value) = record.get(field) else { continue };
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let text = text.trim();
        let parts: Vec<Value> = if text.is_empty() {
            Vec::new()
        } else {
            text.split(',')
                .map(|p| Value::String(p.trim().to_string()))
                .collect()
        };
        record.set(field.clone(), Value::Array(parts));
    }
}

fn parse_jsonl(data: &str, flatten: bool) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (i, raw) in data.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        // A malformed line fails the whole load, not just the line.
        let value: Value = serde_json::from_str(trimmed)?;
        match value {
            Value::Array(items) if flatten => {
                for item in items {
                    records.push(
                        Record::from_value(item).ok_or(AssetError::NotAnObject { line: i + 1 })?,
                    );
                }
            }
            other => records.push(
                Record::from_value(other).ok_or(AssetError::NotAnObject { line: i + 1 })?,
            ),
        }
    }
    Ok(records)
}

fn parse_id_list(data: &str) -> Vec<Record> {
    data.lines()
        .filter_map(|l| {
            let trimmed = l.trim();
            if trimmed.is_empty() {
                return None;
            }
            let mut record = Record::new();
            record.set(ID_FIELD, trimmed);
            Some(record)
        })
        .collect()
}
