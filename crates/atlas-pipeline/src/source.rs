//! Source abstractions and in-memory implementations.

use crate::records::{CaseRecord, CountryPolygon};
use atlas_common::{AtlasError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Identity of a source's content at a point in time.
///
/// Two fingerprints compare equal when the path, byte length and modification
/// time all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    /// Source location.
    pub path: PathBuf,
    /// Length in bytes, or record count for in-memory sources.
    pub len: u64,
    /// Modification time in nanoseconds since the Unix epoch.
    pub modified_nanos: u128,
}

impl SourceFingerprint {
    /// Reads the fingerprint of a file from its metadata.
    pub fn of_file(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .map_err(|err| AtlasError::source_error_with("cannot read source metadata", path, err))?;
        let modified_nanos = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| elapsed.as_nanos());

        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified_nanos,
        })
    }

    /// Fingerprint for data that lives in memory.
    pub fn in_memory(label: &Path, len: usize) -> Self {
        Self {
            path: label.to_path_buf(),
            len: len as u64,
            modified_nanos: 0,
        }
    }
}

/// Supplies case records.
pub trait CaseSource {
    /// Where the records come from; used as the cache key.
    fn location(&self) -> &Path;

    /// Current fingerprint of the underlying data.
    fn fingerprint(&self) -> Result<SourceFingerprint>;

    /// Reads every record, in source order.
    fn load(&self) -> Result<Vec<CaseRecord>>;
}

/// Supplies country polygons.
pub trait PolygonSource {
    /// Where the polygons come from; used as the cache key.
    fn location(&self) -> &Path;

    /// Current fingerprint of the underlying data.
    fn fingerprint(&self) -> Result<SourceFingerprint>;

    /// Reads every polygon, in source order.
    fn load(&self) -> Result<Vec<CountryPolygon>>;
}

/// Case records held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCaseSource {
    label: PathBuf,
    records: Vec<CaseRecord>,
}

impl InMemoryCaseSource {
    /// Wraps `records` under a descriptive label.
    pub fn new(label: impl Into<PathBuf>, records: Vec<CaseRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }
}

impl CaseSource for InMemoryCaseSource {
    fn location(&self) -> &Path {
        &self.label
    }

    fn fingerprint(&self) -> Result<SourceFingerprint> {
        Ok(SourceFingerprint::in_memory(&self.label, self.records.len()))
    }

    fn load(&self) -> Result<Vec<CaseRecord>> {
        Ok(self.records.clone())
    }
}

/// Polygons held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryPolygonSource {
    label: PathBuf,
    polygons: Vec<CountryPolygon>,
}

impl InMemoryPolygonSource {
    /// Wraps `polygons` under a descriptive label.
    pub fn new(label: impl Into<PathBuf>, polygons: Vec<CountryPolygon>) -> Self {
        Self {
            label: label.into(),
            polygons,
        }
    }
}

impl PolygonSource for InMemoryPolygonSource {
    fn location(&self) -> &Path {
        &self.label
    }

    fn fingerprint(&self) -> Result<SourceFingerprint> {
        Ok(SourceFingerprint::in_memory(&self.label, self.polygons.len()))
    }

    fn load(&self) -> Result<Vec<CountryPolygon>> {
        Ok(self.polygons.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::test_utils::write_temp_file;

    #[test]
    fn test_file_fingerprint_tracks_length() {
        let file = write_temp_file(b"iso_code\nUSA\n", ".csv");
        let fingerprint = SourceFingerprint::of_file(file.path()).unwrap();
        assert_eq!(fingerprint.len, 13);
        assert_eq!(fingerprint.path, file.path());
    }

    #[test]
    fn test_missing_file_is_a_source_error() {
        let err = SourceFingerprint::of_file(Path::new("/nonexistent/cases.csv")).unwrap_err();
        assert!(err.is_source());
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemoryCaseSource::new("memory:cases", Vec::new());
        assert_eq!(source.location(), Path::new("memory:cases"));
        assert_eq!(source.fingerprint().unwrap().len, 0);
        assert!(source.load().unwrap().is_empty());
    }
}
