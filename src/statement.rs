// 📄 Statement Reader
// Delimited file → header row + data rows, for the ingestion engine

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::parser::detect_format;

/// Header row plus data rows, cells verbatim
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read a statement file from disk.
pub fn read_statement(file_path: &Path, delimiter: u8) -> Result<Statement> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    parse_statement(file, delimiter)
        .with_context(|| format!("Failed to read statement: {}", file_path.display()))
}

/// Split delimited text into a `Statement`.
///
/// Broker exports carry preamble lines (account summaries, download
/// timestamps) above the header. The header is the first record a broker
/// detector recognizes, else the first with at least two non-empty cells.
pub fn parse_statement<R: Read>(reader: R, delimiter: u8) -> Result<Statement> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV line {}", line_num + 1))?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();

        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    let header_idx = records
        .iter()
        .position(|r| detect_format(r).is_some())
        .or_else(|| {
            records
                .iter()
                .position(|r| r.iter().filter(|c| !c.trim().is_empty()).count() >= 2)
        })
        .ok_or_else(|| anyhow::anyhow!("no header row found"))?;

    debug!(skipped = header_idx, "located header row");

    let mut rows = records.split_off(header_idx);
    let headers = rows.remove(0);

    Ok(Statement { headers, rows })
}

// ============================================================================
// TESTS
// ============================================================================
