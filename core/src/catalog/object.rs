use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const NAIVE_EPOCH_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unparsable epoch '{0}'")]
pub struct EpochError(pub String);

/// Parses a catalog epoch. Timestamps without an offset are taken as UTC.
pub fn parse_epoch(raw: &str) -> Result<DateTime<Utc>, EpochError> {
    let text = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NAIVE_EPOCH_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| EpochError(raw.to_string()))
}

/// Catalog metadata for one tracked object. Its propagatable state stays
/// with the ephemeris provider and is looked up by `catalog_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitingObject {
    pub catalog_id: u32,
    pub name: String,
    /// Raw epoch text as ingested.
    pub epoch: String,
}

impl OrbitingObject {
    pub fn new(catalog_id: u32, name: impl Into<String>, epoch: impl Into<String>) -> Self {
        Self {
            catalog_id,
            name: name.into(),
            epoch: epoch.into(),
        }
    }

    pub fn parsed_epoch(&self) -> Result<DateTime<Utc>, EpochError> {
        parse_epoch(&self.epoch)
    }
}

/// Registry of objects keyed by catalog id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    objects: BTreeMap<u32, OrbitingObject>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object, returning the entry it replaced.
    pub fn insert(&mut self, object: OrbitingObject) -> Option<OrbitingObject> {
        self.objects.insert(object.catalog_id, object)
    }

    pub fn get(&self, catalog_id: u32) -> Option<&OrbitingObject> {
        self.objects.get(&catalog_id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrbitingObject> {
        self.objects.values()
    }

    /// Case-insensitive substring match on the name; lowest catalog id wins.
    pub fn find_by_name(&self, pattern: &str) -> Option<&OrbitingObject> {
        let needle = pattern.to_uppercase();
        self.objects
            .values()
            .find(|object| object.name.to_uppercase().contains(&needle))
    }
}

impl FromIterator<OrbitingObject> for Catalog {
    fn from_iter<I: IntoIterator<Item = OrbitingObject>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for object in iter {
            catalog.insert(object);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_zulu_offset_and_naive_epochs() {
        let zulu = parse_epoch("2024-03-01T12:00:00.500Z").unwrap();
        assert_eq!(zulu.hour(), 12);
        assert_eq!(zulu.nanosecond(), 500_000_000);

        let offset = parse_epoch("2024-03-01T14:00:00+02:00").unwrap();
        assert_eq!(offset, parse_epoch("2024-03-01T12:00:00Z").unwrap());

        let naive = parse_epoch("2024-03-01T12:00:00.123456").unwrap();
        assert_eq!(naive.hour(), 12);
        assert_eq!(naive.nanosecond(), 123_456_000);
    }

    #[test]
    fn rejects_garbage_epoch() {
        let err = parse_epoch("yesterday").unwrap_err();
        assert_eq!(err, EpochError("yesterday".into()));
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let catalog: Catalog = vec![
            OrbitingObject::new(44714, "STARLINK-1008", "2024-03-01T00:00:00Z"),
            OrbitingObject::new(25544, "ISS (ZARYA)", "2024-03-01T00:00:00Z"),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.find_by_name("iss").unwrap().catalog_id, 25544);
        assert!(catalog.find_by_name("hubble").is_none());
        assert_eq!(catalog.len(), 2);
    }
}
