//! Reads the server list CSV into validated host entries.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::models::HostEntry;

pub const COL_HOSTNAME: &str = "hostname";
pub const COL_USER: &str = "initial_admin_user";
pub const COL_PASSWORD: &str = "initial_admin_password";

/// Load host entries from `path`, skipping incomplete rows.
pub fn load(path: &Path) -> Result<Vec<HostEntry>> {
    if !path.exists() {
        return Err(Error::CsvNotFound(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file {}", path.display()))?;

    Ok(parse_entries(&content))
}

pub fn parse_entries(content: &str) -> Vec<HostEntry> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = parse_records(content).records.into_iter();

    let Some(header) = records.next() else {
        tracing::warn!("CSV input has no header row");
        return Vec::new();
    };

    let column = |name: &str| header.iter().position(|h| h == name);
    let (h_idx, u_idx, p_idx) = (column(COL_HOSTNAME), column(COL_USER), column(COL_PASSWORD));

    let mut entries = Vec::new();
    for (row_no, row) in records.enumerate() {
        let field = |idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let (hostname, user, password) = (field(h_idx), field(u_idx), field(p_idx));

        if hostname.is_empty() || user.is_empty() || password.is_empty() {
            tracing::warn!("Row {} incomplete - skipped", row_no + 1);
            continue;
        }
        entries.push(HostEntry::new(hostname, user, password));
    }

    tracing::debug!("Parsed {} complete rows from CSV", entries.len());
    entries
}

#[derive(Debug, Default)]
struct ParsedCsv {
    records: Vec<Vec<String>>,
    /// Line on which a quoted field opened and was never closed.
    unterminated_at: Option<usize>,
}

/// Split CSV text into records of fields.
///
/// A double quote opens a quoted field only as the first character of the
/// field; elsewhere it is literal. Quoted fields may contain commas, doubled
/// quotes and line breaks. Lines that are entirely empty produce no record.
fn parse_records(content: &str) -> ParsedCsv {
    let mut parsed = ParsedCsv::default();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match c {
            '"' if in_quotes => {
                // Check for escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if at_field_start => {
                in_quotes = true;
                quote_line = line;
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                at_field_start = true;
                continue;
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut parsed.records, std::mem::take(&mut fields));
                at_field_start = true;
                continue;
            }
            _ => current.push(c),
        }
        at_field_start = false;
    }

    if in_quotes {
        tracing::warn!(
            "Quoted field opened on line {} is never closed - rest of file read into it",
            quote_line
        );
        parsed.unterminated_at = Some(quote_line);
    }

    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        push_record(&mut parsed.records, fields);
    }

    parsed
}

fn push_record(records: &mut Vec<Vec<String>>, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].is_empty();
    if !blank {
        records.push(fields);
    }
}
