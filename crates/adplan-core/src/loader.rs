//! Location data loading from CSV or JSON files.
//!
//! CSV files carry one row per location with a `location` column followed by
//! the record fields. JSON files hold an object mapping location name to
//! record. Both keep the file's order.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::record::{LocationRecord, LocationTable};
use crate::LoadError;

#[derive(Debug, Deserialize)]
struct CsvRow {
    location: String,
    age: i64,
    income: i64,
    employed_population: i64,
    population: i64,
    ad_cost: f64,
    foot_traffic: i64,
}

impl CsvRow {
    fn into_parts(self) -> (String, LocationRecord) {
        (
            self.location,
            LocationRecord {
                age: self.age,
                income: self.income,
                employed_population: self.employed_population,
                population: self.population,
                ad_cost: self.ad_cost,
                foot_traffic: self.foot_traffic,
            },
        )
    }
}

/// Entries of a JSON location object in document order, repeated keys included.
struct JsonEntries(Vec<(String, LocationRecord)>);

impl<'de> Deserialize<'de> for JsonEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = JsonEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object mapping location name to record")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, LocationRecord>()? {
                    entries.push(entry);
                }
                Ok(JsonEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Load locations from `path`, choosing the format by file extension.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] for extensions other than `csv`
/// and `json`, and the format-specific variants for read, parse, or
/// validation failures.
pub fn load_locations(path: &Path) -> Result<LocationTable, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let content = || {
        std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })
    };

    let table = match extension.as_deref() {
        Some("csv") => parse_csv(&content()?, &path.display().to_string())?,
        Some("json") => parse_json(&content()?, &path.display().to_string())?,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.display().to_string(),
            })
        }
    };

    tracing::info!(path = %path.display(), locations = table.len(), "location data loaded");
    Ok(table)
}

/// Parse CSV text with a header row. `origin` labels errors.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] for malformed rows and [`LoadError::Invalid`]
/// for rows that fail record validation.
pub fn parse_csv(content: &str, origin: &str) -> Result<LocationTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut table = LocationTable::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row.map_err(|e| LoadError::Csv {
            path: origin.to_string(),
            source: e,
        })?;
        let (name, record) = row.into_parts();
        table.insert(name, record).map_err(|e| LoadError::Invalid {
            path: origin.to_string(),
            source: e,
        })?;
    }
    Ok(table)
}

/// Parse a JSON object of location name to record. `origin` labels errors.
///
/// # Errors
///
/// Returns [`LoadError::Json`] for malformed documents and
/// [`LoadError::Invalid`] for records that fail validation or repeat a name.
pub fn parse_json(content: &str, origin: &str) -> Result<LocationTable, LoadError> {
    let JsonEntries(entries) = serde_json::from_str(content).map_err(|e| LoadError::Json {
        path: origin.to_string(),
        source: e,
    })?;

    let mut table = LocationTable::new();
    for (name, record) in entries {
        table.insert(name, record).map_err(|e| LoadError::Invalid {
            path: origin.to_string(),
            source: e,
        })?;
    }
    Ok(table)
}
