//! CSV upload parser
//!
//! Plain comma splitting, no quoting. The first non-blank line is the header;
//! `address`, `latitude` and `longitude` must appear in it (any order, any
//! case, other columns allowed). Data rows with a different field count than
//! the header are skipped and counted. A coordinate that does not parse fails the whole
//! file.

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::ParsedBatch;
use crate::error::{AssetError, AssetResult};

const REQUIRED_COLUMNS: [&str; 3] = ["address", "latitude", "longitude"];

/// Positions of the required columns within the header
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    width: usize,
    address: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnMap {
    fn from_header(line: &str) -> AssetResult<Self> {
        let names: Vec<String> = line
            .split(',')
            .map(|cell| cell.trim().to_lowercase())
            .collect();
        let position = |column: &str| names.iter().position(|name| name == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&column| position(column).is_none())
            .map(|column| column.to_string())
            .collect();

        match (position("address"), position("latitude"), position("longitude")) {
            (Some(address), Some(latitude), Some(longitude)) => Ok(Self {
                width: names.len(),
                address,
                latitude,
                longitude,
            }),
            _ => Err(AssetError::MissingColumns(missing)),
        }
    }
}

/// Parse CSV text into asset candidates, in file order
pub fn parse_csv(text: &str) -> AssetResult<ParsedBatch> {
    // Keep 1-based line numbers for error messages
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .peekable();

    let (_, header) = lines
        .next()
        .ok_or_else(|| AssetError::MalformedInput("CSV file is empty".to_string()))?;
    if lines.peek().is_none() {
        return Err(AssetError::MalformedInput(
            "CSV file needs a header row and at least one data row".to_string(),
        ));
    }

    let columns = ColumnMap::from_header(header)?;

    let mut candidates = Vec::new();
    let mut skipped_rows = 0;
    for (line_number, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.width {
            debug!(
                line = line_number,
                expected = columns.width,
                found = fields.len(),
                "Skipping CSV row with mismatched field count"
            );
            skipped_rows += 1;
            continue;
        }

        let latitude = parse_coordinate(fields[columns.latitude], "latitude", line_number)?;
        let longitude = parse_coordinate(fields[columns.longitude], "longitude", line_number)?;

        candidates.push(json!({
            "address": fields[columns.address],
            "latitude": latitude,
            "longitude": longitude,
        }));
    }

    if skipped_rows > 0 {
        warn!(
            skipped_rows,
            kept = candidates.len(),
            "Skipped CSV rows with mismatched field count"
        );
    }

    Ok(ParsedBatch {
        candidates,
        skipped_rows,
    })
}

fn parse_coordinate(field: &str, column: &str, line: usize) -> AssetResult<f64> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| AssetError::InvalidNumeric {
            line,
            column: column.to_string(),
            value: field.to_string(),
        })
}
