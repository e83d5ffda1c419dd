//! Tabular input: CSV parsing into typed cells and best-effort column resolution.
//!
//! Column resolution is a heuristic. When no candidate name matches, the first
//! text-typed column is taken as the resume text, even if it holds something
//! unrelated such as free-form comments.

use std::collections::HashMap;
use std::fmt;

use csv::ReaderBuilder;
use serde_json::Value;

use crate::errors::RankError;

pub const RESUME_TEXT_COLUMNS: &[&str] = &[
    "Resume_str", "resume_str", "Resume", "resume", "text", "Text", "content", "Content",
];
pub const ID_COLUMNS: &[&str] = &["ID", "id", "Id", "candidate_id", "CandidateID"];
pub const CATEGORY_COLUMNS: &[&str] = &["Category", "category", "Label", "label"];

/// Markers read as missing values, same set as pandas' default `na_values`.
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single typed cell. Types are inferred per cell from the raw CSV field.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NA_VALUES.contains(&trimmed) {
            return Cell::Empty;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Integer(i);
        }
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Cell::Float(f);
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Cell::Bool(true),
            "false" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    /// Text form of the cell; empty cells read as "".
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            other => other.to_string(),
        }
    }

    /// Pass-through value for echoed identifier/category fields.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Integer(i) => Value::from(*i),
            Cell::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => f.write_str(&float_repr(*v)),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Float text in Python `repr` form: `2.0`, `1.5e+20`, `1e-05`.
fn float_repr(v: f64) -> String {
    let debug = format!("{v:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, RankError> {
        if headers.is_empty() {
            return Err(RankError::Parse("No columns to parse from file".to_string()));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
            return Err(RankError::Parse(format!(
                "Row {i} has {} fields, expected {}",
                row.len(),
                headers.len()
            )));
        }
        Ok(Self {
            headers: dedupe_headers(headers),
            rows,
        })
    }

    /// Parses CSV bytes. The first record is the header row. Short rows are
    /// padded with empty cells; rows longer than the header are rejected.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, RankError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(RankError::Parse("No columns to parse from file".to_string()));
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(RankError::Parse(format!(
                    "Row {i} has {} fields, expected {}",
                    record.len(),
                    headers.len()
                )));
            }
            let mut row: Vec<Cell> = record.iter().map(Cell::parse).collect();
            row.resize(headers.len(), Cell::Empty);
            rows.push(row);
        }

        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// A column is text-typed when its cells cannot share a numeric or boolean
    /// type: any text cell, or booleans mixed with numbers.
    pub fn is_text_column(&self, index: usize) -> bool {
        let mut numeric = false;
        let mut boolean = false;
        for cell in self.column(index) {
            match cell {
                Cell::Text(_) => return true,
                Cell::Integer(_) | Cell::Float(_) => numeric = true,
                Cell::Bool(_) => boolean = true,
                Cell::Empty => {}
            }
        }
        numeric && boolean
    }

    fn first_named(&self, candidates: &[&str]) -> Option<usize> {
        candidates.iter().find_map(|name| self.column_index(name))
    }
}

/// Renames repeated headers `name`, `name.1`, `name.2`, ...
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 { h } else { format!("{h}.{count}") };
            *count += 1;
            name
        })
        .collect()
}

/// Column indices used by the ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub text: usize,
    pub id: Option<usize>,
    pub category: Option<usize>,
}

pub fn resolve_columns(table: &Table) -> Result<ResolvedColumns, RankError> {
    let text = table
        .first_named(RESUME_TEXT_COLUMNS)
        .or_else(|| (0..table.headers().len()).find(|&i| table.is_text_column(i)))
        .ok_or_else(|| {
            RankError::MissingColumn(
                "Could not find a resume text column (e.g., Resume_str).".to_string(),
            )
        })?;

    Ok(ResolvedColumns {
        text,
        id: table.first_named(ID_COLUMNS),
        category: table.first_named(CATEGORY_COLUMNS),
    })
}
