//! CSV case source, optionally read out of a zip archive.

use crate::records::CaseRecord;
use crate::source::{CaseSource, SourceFingerprint};
use atlas_common::{parse_timestamp, AtlasError, CountryCode, Field, Measure, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Reads OWID-style case tables.
///
/// A path ending in `.zip` is opened as an archive and its first `.csv`
/// entry is read.
#[derive(Debug, Clone)]
pub struct CsvCaseSource {
    path: PathBuf,
}

impl CsvCaseSource {
    /// Creates a source for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_archive(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }

    fn open(&self) -> Result<Box<dyn Read>> {
        if self.is_archive() {
            return Ok(Box::new(Cursor::new(read_first_csv_entry(&self.path)?)));
        }
        let file = File::open(&self.path)
            .map_err(|err| AtlasError::source_error_with("cannot open case table", &self.path, err))?;
        Ok(Box::new(file))
    }
}

impl CaseSource for CsvCaseSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn fingerprint(&self) -> Result<SourceFingerprint> {
        SourceFingerprint::of_file(&self.path)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<CaseRecord>> {
        let records = read_cases(self.open()?, &self.path)?;
        info!(records = records.len(), "Loaded case table");
        Ok(records)
    }
}

fn read_first_csv_entry(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|err| AtlasError::source_error_with("cannot open archive", path, err))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|err| AtlasError::source_error_with("unreadable zip archive", path, err))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| AtlasError::source_error_with("unreadable zip entry", path, err))?;
        if !entry.name().to_ascii_lowercase().ends_with(".csv") {
            continue;
        }
        debug!(entry = entry.name(), "Reading case table from archive");
        let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
        entry
            .read_to_end(&mut buffer)
            .map_err(|err| AtlasError::source_error_with("cannot decompress zip entry", path, err))?;
        return Ok(buffer);
    }

    Err(AtlasError::source_error("archive contains no .csv entry", path))
}

struct ColumnIndex {
    code: usize,
    name: usize,
    date: usize,
    total_cases: usize,
    total_deaths: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let find = |field: Field| {
            headers
                .iter()
                .position(|header| header.trim() == field.source_column())
                .ok_or_else(|| {
                    AtlasError::source_error(format!("missing required column '{field}'"), path)
                })
        };

        Ok(Self {
            code: find(Field::CountryCode)?,
            name: find(Field::CountryName)?,
            date: find(Field::Date)?,
            total_cases: find(Field::TotalCases)?,
            total_deaths: find(Field::TotalDeaths)?,
        })
    }
}

/// Parses a case table from any reader. `path` is only used for error context.
///
/// Columns outside the canonical five are ignored.
pub fn read_cases<R: Read>(reader: R, path: &Path) -> Result<Vec<CaseRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|err| AtlasError::source_error_with("unreadable CSV header", path, err))?
        .clone();
    let columns = ColumnIndex::resolve(&headers, path)?;

    let mut records = Vec::new();
    for (offset, row) in csv_reader.records().enumerate() {
        let row_number = offset + 1;
        let row = row.map_err(|err| {
            AtlasError::source_error_with(format!("malformed CSV at data row {row_number}"), path, err)
        })?;
        let cell = |index: usize| row.get(index).unwrap_or_default();

        let raw_date = cell(columns.date);
        let observed_at = parse_timestamp(raw_date).ok_or_else(|| {
            AtlasError::source_error(
                format!("data row {row_number}: unparseable date '{raw_date}'"),
                path,
            )
        })?;

        records.push(CaseRecord {
            country_code: CountryCode::new(cell(columns.code)),
            country_name: cell(columns.name).to_string(),
            observed_at,
            total_cases: Measure::parse(cell(columns.total_cases)),
            total_deaths: Measure::parse(cell(columns.total_deaths)),
        });
    }

    Ok(records)
}
