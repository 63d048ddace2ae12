//! CSV ingestion pipeline: load, clean, resolve categories, persist.

use std::fmt;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{category_repository, transaction_repository};
use crate::error::{Error, Result};
use crate::models::transaction::NewTransaction;
use crate::validate::{format_amount, normalize_transaction_type, parse_tags, sanitize_string};

/// Per-row outcome of an ingestion run. Rows dropped during cleaning are
/// reported here, not just counted on the console.
#[derive(Debug)]
pub struct IngestOutcome {
    pub inserted: usize,
    pub skipped: Vec<RowSkip>,
}

#[derive(Debug)]
pub struct RowSkip {
    /// 1-based line in the source file (the header is line 1).
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SkipReason {
    UnparseableDate(String),
    BadAmount(String),
    InvalidType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnparseableDate(raw) => write!(f, "unparseable date '{}'", raw),
            SkipReason::BadAmount(raw) => write!(f, "non-numeric amount '{}'", raw),
            SkipReason::InvalidType(raw) => write!(f, "invalid transaction type '{}'", raw),
        }
    }
}

/// Column layout resolved from the header row. Header names are trimmed
/// and lowercased before matching.
struct ColumnMap {
    date: usize,
    amount: usize,
    txn_type: usize,
    category: Option<usize>,
    description: Option<usize>,
    tags: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().to_lowercase() == name)
        };
        Ok(ColumnMap {
            date: position("date").ok_or(Error::MissingColumn("date"))?,
            amount: position("amount").ok_or(Error::MissingColumn("amount"))?,
            txn_type: position("type").ok_or(Error::MissingColumn("type"))?,
            category: position("category"),
            description: position("description"),
            tags: position("tags"),
        })
    }
}

/// Accepted input date formats, normalized to ISO on the way in.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d.%m.%Y", "%Y/%m/%d"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Ingests a delimited file with a header row. The whole file is
/// rejected when a required column is missing; individual rows that fail
/// cleaning are skipped and reported in the outcome.
pub fn ingest_csv(conn: &Connection, path: &Path, user_id: Option<&str>) -> Result<IngestOutcome> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let columns = ColumnMap::from_headers(reader.headers()?)?;

    let mut outcome = IngestOutcome {
        inserted: 0,
        skipped: Vec::new(),
    };

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 2;

        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let optional_cell =
            |idx: Option<usize>| idx.map(cell).filter(|value| !value.is_empty());

        let date_raw = cell(columns.date);
        let Some(date) = parse_date(date_raw) else {
            outcome.push_skip(line, SkipReason::UnparseableDate(date_raw.to_string()));
            continue;
        };

        let amount_raw = cell(columns.amount);
        let Some(amount) = format_amount(amount_raw) else {
            outcome.push_skip(line, SkipReason::BadAmount(amount_raw.to_string()));
            continue;
        };

        let type_raw = cell(columns.txn_type);
        let Some(txn_type) = normalize_transaction_type(type_raw) else {
            outcome.push_skip(line, SkipReason::InvalidType(type_raw.to_string()));
            continue;
        };

        let category_id = match optional_cell(columns.category) {
            Some(name) => Some(category_repository::get_or_create(conn, name)?),
            None => None,
        };
        let description = optional_cell(columns.description).and_then(sanitize_string);
        let tags = optional_cell(columns.tags)
            .map(parse_tags)
            .filter(|tags| !tags.is_empty())
            .map(|tags| tags.join(","));

        transaction_repository::insert_transaction(
            conn,
            &NewTransaction {
                date,
                amount,
                txn_type,
                category_id,
                description,
                tags,
                user_id: user_id.map(|u| u.to_string()),
            },
        )?;
        outcome.inserted += 1;
    }

    info!(
        path = %path.display(),
        inserted = outcome.inserted,
        skipped = outcome.skipped.len(),
        "ingestion complete"
    );
    Ok(outcome)
}

impl IngestOutcome {
    fn push_skip(&mut self, line: usize, reason: SkipReason) {
        warn!(line, %reason, "skipping row");
        self.skipped.push(RowSkip { line, reason });
    }
}
