// Reading the address list out of CSV files and plain line lists

use crate::error::InputError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated with a header row; addresses come from one named column.
    Csv,
    /// One address per line, `#` starts a comment.
    Lines,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("txt") | Some("lst") => InputFormat::Lines,
            _ => InputFormat::Csv,
        }
    }
}

/// Read the addresses to validate from `path`.
///
/// For CSV input `column` names the header to read from; line lists ignore it.
/// Empty cells are skipped, everything else is kept in file order.
pub fn load_addresses(path: &Path, column: &str) -> Result<Vec<String>, InputError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            InputError::InputNotFound(path.to_path_buf())
        } else {
            InputError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let format = InputFormat::from_path(path);
    debug!("Reading {} as {:?}", path.display(), format);

    let addresses = match format {
        InputFormat::Lines => load_addresses_from_lines(&content),
        InputFormat::Csv => {
            let records = parse_csv(&content).map_err(|reason| InputError::Malformed {
                path: path.to_path_buf(),
                reason,
            })?;
            load_addresses_from_records(&records, column)?
        }
    };

    info!("Loaded {} addresses from {}", addresses.len(), path.display());
    Ok(addresses)
}

pub fn load_addresses_from_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Pull one column out of parsed CSV records. The first record is the header.
pub fn load_addresses_from_records(
    records: &[Vec<String>],
    column: &str,
) -> Result<Vec<String>, InputError> {
    let (header, rows) = records
        .split_first()
        .ok_or_else(|| InputError::ColumnNotFound(column.to_string()))?;

    let index = header
        .iter()
        .position(|name| name.trim() == column)
        .ok_or_else(|| InputError::ColumnNotFound(column.to_string()))?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get(index))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect())
}

/// Minimal RFC 4180 reader: quoted fields, doubled quotes, CRLF or LF line
/// endings, and newlines inside quotes. A leading UTF-8 BOM is dropped.
pub fn parse_csv(content: &str) -> Result<Vec<Vec<String>>, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(format!("unterminated quoted field in record {}", records.len() + 1));
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// Quote a field when it contains a delimiter, a quote or a line break.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
