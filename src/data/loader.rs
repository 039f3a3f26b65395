use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType as _, Reader, Xlsx, XlsxError};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::model::{columns, Dataset, LocationRecord, COLUMN_ORDER};

/// Name of the sheet holding the location table in CQC's HSCA workbook.
pub const SHEET_NAME: &str = "HSCA_Active_Locations";

// ---------------------------------------------------------------------------
// Errors & data-quality report
// ---------------------------------------------------------------------------

/// A failure that aborts the whole load. Per-cell problems never end up here;
/// they are coerced to null and counted in the [`LoadReport`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read workbook: {0}")]
    Workbook(#[from] XlsxError),
    #[error("sheet \"{0}\" not found in workbook")]
    SheetMissing(String),
    #[error("required column \"{0}\" is missing")]
    ColumnMissing(&'static str),
    #[error("cannot parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

/// What happened during a load: how many rows survived the required-field
/// drop rule and how many cells were coerced to null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Non-empty bed-count cells that could not be parsed as a
    /// non-negative integer.
    pub bed_coercions: usize,
    /// Non-empty publication-date cells that could not be parsed as a date.
    pub date_coercions: usize,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows loaded ({} dropped, {} bed / {} date values unreadable)",
            self.rows_kept, self.rows_dropped, self.bed_coercions, self.date_coercions
        )
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` – CQC HSCA workbook (sheet `HSCA_Active_Locations`)
/// * `.csv`  – the same columns as a plain CSV (e.g. a previous CSV export)
pub fn load_path(path: &Path) -> Result<(Dataset, LoadReport), LoadError> {
    let bytes = std::fs::read(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    load_bytes(&bytes, &ext)
}

/// Dispatch in-memory bytes by file extension (lowercase, without the dot).
pub fn load_bytes(bytes: &[u8], ext: &str) -> Result<(Dataset, LoadReport), LoadError> {
    match ext {
        "xlsx" => load_xlsx_bytes(bytes),
        "csv" => load_csv_bytes(bytes),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Parse an HSCA workbook from in-memory bytes.
///
/// Per row: the bed count and publication date are coerced to null when
/// unparsable, then the row is dropped entirely when brand, bed count, or
/// directorate is null.
pub fn load_xlsx_bytes(bytes: &[u8]) -> Result<(Dataset, LoadReport), LoadError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(SHEET_NAME).map_err(|err| match err {
        XlsxError::WorksheetNotFound(name) => LoadError::SheetMissing(name),
        other => LoadError::Workbook(other),
    })?;

    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);
    let header: Vec<String> = header
        .iter()
        .map(|cell| cell.as_string().unwrap_or_default().trim().to_string())
        .collect();
    let index = ColumnIndex::resolve(&header)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for row in rows {
        report.rows_seen += 1;
        let cell = |i: usize| row.get(i).unwrap_or(&Data::Empty);

        let bed_count = coerce_beds(cell(index.bed_count), &mut report);
        let publication_date = coerce_date(cell(index.publication_date), &mut report);
        let brand_name = cell_str(cell(index.brand_name));
        let directorate = cell_str(cell(index.directorate));

        // Required-field drop rule: brand, bed count, directorate.
        let (Some(brand_name), Some(bed_count), Some(directorate)) =
            (brand_name, bed_count, directorate)
        else {
            report.rows_dropped += 1;
            continue;
        };

        records.push(LocationRecord {
            location_id: cell_str(cell(index.location_id)).unwrap_or_default(),
            location_name: cell_str(cell(index.location_name)).unwrap_or_default(),
            provider_name: cell_str(cell(index.provider_name)),
            brand_name,
            local_authority: cell_str(cell(index.local_authority)),
            directorate,
            bed_count,
            overall_rating: cell_str(cell(index.overall_rating)),
            publication_date,
            latitude: cell_f64(cell(index.latitude)),
            longitude: cell_f64(cell(index.longitude)),
        });
    }

    report.rows_kept = records.len();
    Ok((Dataset::from_records(records), report))
}

/// Parse the same table from CSV bytes. Header row required; the cell
/// coercion rules match the xlsx path (everything arrives as a string).
pub fn load_csv_bytes(bytes: &[u8]) -> Result<(Dataset, LoadReport), LoadError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let index = ColumnIndex::resolve(&header)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for result in reader.records() {
        let row = result?;
        report.rows_seen += 1;
        let field = |i: usize| nonempty(row.get(i).unwrap_or(""));

        let bed_count = match field(index.bed_count) {
            None => None,
            Some(raw) => {
                let parsed = parse_beds(raw);
                if parsed.is_none() {
                    report.bed_coercions += 1;
                }
                parsed
            }
        };
        let publication_date = match field(index.publication_date) {
            None => None,
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    report.date_coercions += 1;
                }
                parsed
            }
        };

        let (Some(brand_name), Some(bed_count), Some(directorate)) = (
            field(index.brand_name).map(str::to_string),
            bed_count,
            field(index.directorate).map(str::to_string),
        ) else {
            report.rows_dropped += 1;
            continue;
        };

        records.push(LocationRecord {
            location_id: field(index.location_id).unwrap_or_default().to_string(),
            location_name: field(index.location_name).unwrap_or_default().to_string(),
            provider_name: field(index.provider_name).map(str::to_string),
            brand_name,
            local_authority: field(index.local_authority).map(str::to_string),
            directorate,
            bed_count,
            overall_rating: field(index.overall_rating).map(str::to_string),
            publication_date,
            latitude: field(index.latitude).and_then(|s| s.parse().ok()),
            longitude: field(index.longitude).and_then(|s| s.parse().ok()),
        });
    }

    report.rows_kept = records.len();
    Ok((Dataset::from_records(records), report))
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Positions of the eleven expected columns within the header row.
struct ColumnIndex {
    location_id: usize,
    location_name: usize,
    provider_name: usize,
    brand_name: usize,
    local_authority: usize,
    directorate: usize,
    bed_count: usize,
    overall_rating: usize,
    publication_date: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnIndex {
    fn resolve(header: &[String]) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or(LoadError::ColumnMissing(name))
        };
        // Keep COLUMN_ORDER authoritative: every listed column must exist.
        for name in COLUMN_ORDER {
            find(name)?;
        }
        Ok(ColumnIndex {
            location_id: find(columns::LOCATION_ID)?,
            location_name: find(columns::LOCATION_NAME)?,
            provider_name: find(columns::PROVIDER_NAME)?,
            brand_name: find(columns::BRAND_NAME)?,
            local_authority: find(columns::LOCAL_AUTHORITY)?,
            directorate: find(columns::DIRECTORATE)?,
            bed_count: find(columns::BED_COUNT)?,
            overall_rating: find(columns::OVERALL_RATING)?,
            publication_date: find(columns::PUBLICATION_DATE)?,
            latitude: find(columns::LATITUDE)?,
            longitude: find(columns::LONGITUDE)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell coercion helpers (coerce-to-null semantics)
// ---------------------------------------------------------------------------

fn coerce_beds(cell: &Data, report: &mut LoadReport) -> Option<u32> {
    if matches!(cell, Data::Empty) {
        return None;
    }
    let parsed = cell_beds(cell);
    if parsed.is_none() {
        report.bed_coercions += 1;
    }
    parsed
}

fn coerce_date(cell: &Data, report: &mut LoadReport) -> Option<NaiveDate> {
    if matches!(cell, Data::Empty) {
        return None;
    }
    let parsed = cell_date(cell);
    if parsed.is_none() {
        report.date_coercions += 1;
    }
    parsed
}

fn cell_str(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => nonempty(s).map(str::to_string),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_float(*f)),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cell_beds(cell: &Data) -> Option<u32> {
    match cell {
        Data::Int(i) if *i >= 0 => Some(*i as u32),
        Data::Float(f) if *f >= 0.0 => Some(f.round() as u32),
        Data::String(s) => parse_beds(s.trim()),
        _ => None,
    }
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell.as_date(),
        Data::String(s) => parse_date(s.trim()),
        _ => None,
    }
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_beds(s: &str) -> Option<u32> {
    s.parse::<u32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u32))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.date())
                .ok()
        })
}

fn nonempty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}
