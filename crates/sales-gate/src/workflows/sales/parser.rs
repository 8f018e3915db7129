use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

/// Structural failure while splitting text into a header and rows.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("input has no header line")]
    MissingHeader,
    #[error("header declares column '{column}' more than once")]
    DuplicateColumn { column: String },
    #[error("line {line} has {found} fields but the header declares {expected}")]
    FieldCount { line: u64, expected: u64, found: u64 },
    #[error("input is not valid UTF-8 text")]
    Encoding,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid delimited data: {0}")]
    Csv(csv::Error),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        let structural = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => Some(ParseError::FieldCount {
                line: pos.as_ref().map(|pos| pos.line()).unwrap_or_default(),
                expected: *expected_len,
                found: *len,
            }),
            csv::ErrorKind::Utf8 { .. } => Some(ParseError::Encoding),
            _ => None,
        };
        structural.unwrap_or(ParseError::Csv(err))
    }
}

/// One data row, keyed by the header's column names in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRecord {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl TabularRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parsed file: the header's column set plus every data row in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularFile {
    columns: Arc<[String]>,
    records: Vec<TabularRecord>,
}

impl TabularFile {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[TabularRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TabularRecord> {
        self.records
    }
}

pub fn parse_reader<R: Read>(mut reader: R) -> Result<TabularFile, ParseError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes(&bytes)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<TabularFile, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError::Encoding)?;
    parse_str(text)
}

pub fn parse_str(text: &str) -> Result<TabularFile, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ParseError::MissingHeader);
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header = csv_reader.headers()?.clone();
    let mut seen = HashSet::new();
    for column in header.iter() {
        if !seen.insert(column) {
            return Err(ParseError::DuplicateColumn {
                column: column.to_string(),
            });
        }
    }

    let columns: Arc<[String]> = header.iter().map(str::to_string).collect();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        records.push(TabularRecord {
            columns: Arc::clone(&columns),
            values: row.iter().map(str::to_string).collect(),
        });
    }

    Ok(TabularFile { columns, records })
}
