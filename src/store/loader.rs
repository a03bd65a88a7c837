use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use super::{Collection, MemoryRecord};
use crate::error::{MemoryMapError, Result};

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Abort on the first bad row.
    Strict,
    /// Log and drop bad rows.
    #[default]
    SkipInvalid,
}

pub struct Loaded {
    pub collection: Collection,
    /// Validation errors for dropped rows (`SkipInvalid` only).
    pub rejected: Vec<MemoryMapError>,
}

/// Coordinates come in as text so a bad number is reported against its
/// column instead of as an opaque CSV decode failure.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    location: Option<String>,
    latitude: String,
    longitude: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl Row {
    fn into_record(self, row: usize) -> Result<MemoryRecord> {
        let latitude = parse_coordinate(&self.latitude, row, "latitude")?;
        let longitude = parse_coordinate(&self.longitude, row, "longitude")?;
        let record = MemoryRecord::new(
            self.location.unwrap_or_default(),
            latitude,
            longitude,
            self.caption.unwrap_or_default(),
            self.image.unwrap_or_default(),
        );
        record.validate(row)?;
        Ok(record)
    }
}

fn parse_coordinate(raw: &str, row: usize, field: &'static str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| MemoryMapError::record(row, field, format!("{raw:?} is not a number")))
}

/// Load memories from a CSV file with a header row naming `location`,
/// `latitude`, `longitude`, `caption` and `image` (any order).
pub fn load(path: &Path, policy: LoadPolicy) -> Result<Loaded> {
    let file = std::fs::File::open(path)?;
    let loaded = read(file, policy)?;
    info!(
        path = %path.display(),
        memories = loaded.collection.len(),
        rejected = loaded.rejected.len(),
        "loaded memories"
    );
    Ok(loaded)
}

/// Same as [`load`] over any reader. Row numbers in errors count data rows
/// from zero, header excluded. A row with the wrong number of fields is a
/// per-row problem; a header missing a required column is a `Csv` error.
pub fn read<R: Read>(reader: R, policy: LoadPolicy) -> Result<Loaded> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (row_no, raw) in csv_reader.records().enumerate() {
        let raw = raw?;
        let parsed = if raw.len() == headers.len() {
            let row: Row = raw.deserialize(Some(&headers))?;
            row.into_record(row_no)
        } else {
            Err(MemoryMapError::record(
                row_no,
                "row",
                format!("expected {} fields, found {}", headers.len(), raw.len()),
            ))
        };
        match parsed {
            Ok(record) => records.push(record),
            Err(e) if policy == LoadPolicy::SkipInvalid => {
                warn!(row = row_no, error = %e, "skipping memory record");
                rejected.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Loaded {
        collection: Collection::new(records)?,
        rejected,
    })
}
