pub mod loader;
pub mod hasher;

use serde::{Deserialize, Serialize};

use crate::error::{MemoryMapError, Result};
use crate::search::rank::ScoredResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One geotagged memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub location: String,
    pub coordinates: Coordinates,
    pub caption: String,
    /// Photo reference, passed through to the presentation layer untouched.
    pub image: String,
}

impl MemoryRecord {
    pub fn new(
        location: impl Into<String>,
        latitude: f64,
        longitude: f64,
        caption: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            coordinates: Coordinates {
                latitude,
                longitude,
            },
            caption: caption.into(),
            image: image.into(),
        }
    }

    /// Text that gets embedded: location followed by caption.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.location.trim(), self.caption.trim())
            .trim()
            .to_string()
    }

    /// Check coordinate ranges and that there is something to embed.
    /// `position` is only used to label the error.
    pub fn validate(&self, position: usize) -> Result<()> {
        let Coordinates {
            latitude,
            longitude,
        } = self.coordinates;
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MemoryMapError::record(
                position,
                "latitude",
                format!("{latitude} is outside [-90, 90]"),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MemoryMapError::record(
                position,
                "longitude",
                format!("{longitude} is outside [-180, 180]"),
            ));
        }
        let text = self.search_text();
        if text.is_empty() {
            return Err(MemoryMapError::record(
                position,
                "caption",
                "location and caption are both empty",
            ));
        }
        if !text.chars().any(char::is_alphanumeric) {
            return Err(MemoryMapError::record(
                position,
                "caption",
                format!("no letters or digits in {text:?}"),
            ));
        }
        Ok(())
    }
}

/// Bounding box of a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

/// The immutable set of records for one session. A record's position
/// here is its identity.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: Vec<MemoryRecord>,
}

impl Collection {
    /// Validate every record. Fails on the first malformed one.
    pub fn new(records: Vec<MemoryRecord>) -> Result<Self> {
        for (position, record) in records.iter().enumerate() {
            record.validate(position)?;
        }
        Ok(Self { records })
    }

    pub fn get(&self, index: usize) -> Option<&MemoryRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fingerprint(&self) -> String {
        hasher::fingerprint(&self.records)
    }

    /// Latitude/longitude box around the records a result set refers to.
    /// Indices not in the collection are ignored.
    pub fn bounds(&self, results: &[ScoredResult]) -> Option<Bounds> {
        let mut coords = results
            .iter()
            .filter_map(|r| self.get(r.record))
            .map(|r| r.coordinates);
        let first = coords.next()?;
        let mut bounds = Bounds {
            south_west: first,
            north_east: first,
        };
        for c in coords {
            bounds.south_west.latitude = bounds.south_west.latitude.min(c.latitude);
            bounds.south_west.longitude = bounds.south_west.longitude.min(c.longitude);
            bounds.north_east.latitude = bounds.north_east.latitude.max(c.latitude);
            bounds.north_east.longitude = bounds.north_east.longitude.max(c.longitude);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(record: usize) -> ScoredResult {
        ScoredResult {
            record,
            score: 1.0,
            rank: 0,
            highlighted: false,
        }
    }

    #[test]
    fn search_text_joins_location_and_caption() {
        let r = MemoryRecord::new(" Goa ", 15.6745, 73.7068, "Sunset at Arambol Beach ", "goa.jpg");
        assert_eq!(r.search_text(), "Goa Sunset at Arambol Beach");
        let r = MemoryRecord::new("", 0.0, 0.0, "only caption", "x.jpg");
        assert_eq!(r.search_text(), "only caption");
    }

    #[test]
    fn latitude_out_of_range() {
        let err = Collection::new(vec![
            MemoryRecord::new("Ok", 10.0, 10.0, "fine", "a.jpg"),
            MemoryRecord::new("Bad", 91.0, 10.0, "north of north", "b.jpg"),
        ])
        .unwrap_err();
        match err {
            MemoryMapError::RecordValidation { record, field, .. } => {
                assert_eq!(record, 1);
                assert_eq!(field, "latitude");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn longitude_out_of_range_and_nan() {
        let r = MemoryRecord::new("Bad", 0.0, -180.5, "x", "x.jpg");
        assert!(matches!(
            r.validate(0),
            Err(MemoryMapError::RecordValidation { field: "longitude", .. })
        ));
        let r = MemoryRecord::new("Bad", f64::NAN, 0.0, "x", "x.jpg");
        assert!(matches!(
            r.validate(0),
            Err(MemoryMapError::RecordValidation { field: "latitude", .. })
        ));
    }

    #[test]
    fn range_edges_are_valid() {
        let r = MemoryRecord::new("Pole", -90.0, 180.0, "edge", "p.jpg");
        assert!(r.validate(0).is_ok());
    }

    #[test]
    fn blank_text_rejected() {
        let r = MemoryRecord::new("  ", 0.0, 0.0, "", "x.jpg");
        assert!(matches!(
            r.validate(3),
            Err(MemoryMapError::RecordValidation { record: 3, field: "caption", .. })
        ));
    }

    #[test]
    fn punctuation_only_text_rejected() {
        let r = MemoryRecord::new("", 10.0, 10.0, "!!!", "x.jpg");
        assert!(matches!(
            r.validate(0),
            Err(MemoryMapError::RecordValidation { record: 0, field: "caption", .. })
        ));
        let r = MemoryRecord::new("", 10.0, 10.0, "Café №5", "x.jpg");
        assert!(r.validate(0).is_ok());
    }

    #[test]
    fn bounds_cover_results() {
        let collection = Collection::new(vec![
            MemoryRecord::new("Goa", 15.6745, 73.7068, "beach", "a.jpg"),
            MemoryRecord::new("Bangalore", 13.0411, 77.6153, "sky", "b.jpg"),
            MemoryRecord::new("Manali", 32.2432, 77.1892, "snow", "c.jpg"),
        ])
        .unwrap();
        let b = collection.bounds(&[scored(0), scored(1)]).unwrap();
        assert_eq!(b.south_west.latitude, 13.0411);
        assert_eq!(b.south_west.longitude, 73.7068);
        assert_eq!(b.north_east.latitude, 15.6745);
        assert_eq!(b.north_east.longitude, 77.6153);
        assert!(collection.bounds(&[]).is_none());
        assert!(collection.bounds(&[scored(9)]).is_none());
    }
}
