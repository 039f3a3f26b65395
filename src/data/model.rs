use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column layout of the HSCA_Active_Locations sheet
// ---------------------------------------------------------------------------

/// Column headers exactly as the CQC workbook names them.
pub mod columns {
    pub const LOCATION_ID: &str = "Location ID";
    pub const LOCATION_NAME: &str = "Location Name";
    pub const PROVIDER_NAME: &str = "Provider Name";
    pub const BRAND_NAME: &str = "Brand Name";
    pub const LOCAL_AUTHORITY: &str = "Location Local Authority";
    pub const DIRECTORATE: &str = "Location Inspection Directorate";
    pub const BED_COUNT: &str = "Care homes beds";
    pub const OVERALL_RATING: &str = "Location Latest Overall Rating";
    pub const PUBLICATION_DATE: &str = "Publication Date";
    pub const LATITUDE: &str = "Location Latitude";
    pub const LONGITUDE: &str = "Location Longitude";
}

/// Fixed column order for loading and for the exported filtered view.
pub const COLUMN_ORDER: [&str; 11] = [
    columns::LOCATION_ID,
    columns::LOCATION_NAME,
    columns::PROVIDER_NAME,
    columns::BRAND_NAME,
    columns::LOCAL_AUTHORITY,
    columns::DIRECTORATE,
    columns::BED_COUNT,
    columns::OVERALL_RATING,
    columns::PUBLICATION_DATE,
    columns::LATITUDE,
    columns::LONGITUDE,
];

// ---------------------------------------------------------------------------
// LocationRecord – one row of the source sheet
// ---------------------------------------------------------------------------

/// A single inspected care-home location (one row of the source sheet).
///
/// Brand, bed count, and directorate are non-optional: rows where any of the
/// three could not be read are dropped by the loader before a record is built.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub location_id: String,
    pub location_name: String,
    pub provider_name: Option<String>,
    pub brand_name: String,
    pub local_authority: Option<String>,
    pub directorate: String,
    pub bed_count: u32,
    pub overall_rating: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// RatingChoice – one selectable value of the rating filter
// ---------------------------------------------------------------------------

/// A selectable rating value. `Unrated` stands for rows with no published
/// rating; those rows pass the rating filter only when `Unrated` is selected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatingChoice {
    Rated(String),
    Unrated,
}

impl fmt::Display for RatingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingChoice::Rated(s) => write!(f, "{s}"),
            RatingChoice::Unrated => write!(f, "Not rated"),
        }
    }
}

impl RatingChoice {
    pub fn from_record(record: &LocationRecord) -> Self {
        match &record.overall_rating {
            Some(r) => RatingChoice::Rated(r.clone()),
            None => RatingChoice::Unrated,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Bed-range bounds reported for an empty dataset.
pub const EMPTY_BED_BOUNDS: (u32, u32) = (0, 100);

/// The full parsed dataset with pre-computed filter-option indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records, in source-row order.
    pub records: Vec<LocationRecord>,
    /// Sorted unique brand names.
    pub brands: Vec<String>,
    /// Sorted unique local authorities (rows with one).
    pub local_authorities: Vec<String>,
    /// Sorted unique rating values present (rows with one).
    pub ratings: Vec<String>,
    /// Whether any record has no published rating.
    pub has_unrated: bool,
}

impl Dataset {
    /// Build the filter-option indices from the loaded records.
    pub fn from_records(records: Vec<LocationRecord>) -> Self {
        let mut brands: BTreeSet<&str> = BTreeSet::new();
        let mut local_authorities: BTreeSet<&str> = BTreeSet::new();
        let mut ratings: BTreeSet<&str> = BTreeSet::new();
        let mut has_unrated = false;

        for rec in &records {
            brands.insert(&rec.brand_name);
            if let Some(la) = &rec.local_authority {
                local_authorities.insert(la);
            }
            match &rec.overall_rating {
                Some(r) => {
                    ratings.insert(r);
                }
                None => has_unrated = true,
            }
        }

        let brands = brands.into_iter().map(str::to_string).collect();
        let local_authorities = local_authorities.into_iter().map(str::to_string).collect();
        let ratings = ratings.into_iter().map(str::to_string).collect();

        Dataset {
            records,
            brands,
            local_authorities,
            ratings,
            has_unrated,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed min/max bed count, or [`EMPTY_BED_BOUNDS`] for an empty
    /// dataset. Recomputed from scratch whenever a new file is loaded.
    pub fn bed_bounds(&self) -> (u32, u32) {
        let mut beds = self.records.iter().map(|r| r.bed_count);
        match beds.next() {
            None => EMPTY_BED_BOUNDS,
            Some(first) => beds.fold((first, first), |(lo, hi), b| (lo.min(b), hi.max(b))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(brand: &str, beds: u32) -> LocationRecord {
        LocationRecord {
            location_id: format!("1-{brand}-{beds}"),
            location_name: format!("{brand} House"),
            provider_name: Some(format!("{brand} Ltd")),
            brand_name: brand.to_string(),
            local_authority: Some("Leeds".to_string()),
            directorate: "Adult social care".to_string(),
            bed_count: beds,
            overall_rating: Some("Good".to_string()),
            publication_date: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn indices_are_sorted_and_unique() {
        let ds = Dataset::from_records(vec![
            record("Beta", 10),
            record("Alpha", 20),
            record("Beta", 30),
        ]);
        assert_eq!(ds.brands, vec!["Alpha", "Beta"]);
        assert_eq!(ds.local_authorities, vec!["Leeds"]);
        assert_eq!(ds.ratings, vec!["Good"]);
        assert!(!ds.has_unrated);
    }

    #[test]
    fn bed_bounds_default_when_empty() {
        let ds = Dataset::from_records(Vec::new());
        assert_eq!(ds.bed_bounds(), EMPTY_BED_BOUNDS);
    }

    #[test]
    fn bed_bounds_observed() {
        let ds = Dataset::from_records(vec![record("A", 15), record("B", 120), record("C", 4)]);
        assert_eq!(ds.bed_bounds(), (4, 120));
    }

    #[test]
    fn unrated_rows_are_tracked() {
        let mut rec = record("A", 5);
        rec.overall_rating = None;
        let ds = Dataset::from_records(vec![rec]);
        assert!(ds.has_unrated);
        assert!(ds.ratings.is_empty());
    }
}
