use std::collections::BTreeSet;

use super::model::{Dataset, LocationRecord, RatingChoice};

/// The only directorate the dashboard reports on. Exact, case-sensitive.
pub const ADULT_SOCIAL_CARE: &str = "Adult social care";

// ---------------------------------------------------------------------------
// Directorate restriction
// ---------------------------------------------------------------------------

/// Restrict a freshly loaded dataset to adult social care. Applied once per
/// load; every downstream view (including the brand ranking, which ignores
/// the interactive selection) works from the restricted dataset.
pub fn restrict_to_adult_social_care(dataset: &Dataset) -> Dataset {
    let records = dataset
        .records
        .iter()
        .filter(|rec| rec.directorate == ADULT_SOCIAL_CARE)
        .cloned()
        .collect();
    Dataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Interactive filter selection
// ---------------------------------------------------------------------------

/// The user's current filter choices. Rebuilt from widget state on every
/// interaction; `None` for brand / local authority means "All".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub brand: Option<String>,
    pub local_authority: Option<String>,
    /// Inclusive bed-count range.
    pub bed_range: (u32, u32),
    /// Which rating values pass. An empty set matches nothing.
    pub allowed_ratings: BTreeSet<RatingChoice>,
}

impl FilterSelection {
    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &LocationRecord) -> bool {
        if let Some(brand) = &self.brand {
            if record.brand_name != *brand {
                return false;
            }
        }
        if let Some(la) = &self.local_authority {
            if record.local_authority.as_deref() != Some(la.as_str()) {
                return false;
            }
        }
        let (lo, hi) = self.bed_range;
        if record.bed_count < lo || record.bed_count > hi {
            return false;
        }
        self.allowed_ratings
            .contains(&RatingChoice::from_record(record))
    }
}

/// Default selection for a newly loaded dataset: everything visible except
/// unrated rows, which must be opted into explicitly.
pub fn init_selection(dataset: &Dataset) -> FilterSelection {
    FilterSelection {
        brand: None,
        local_authority: None,
        bed_range: dataset.bed_bounds(),
        allowed_ratings: dataset
            .ratings
            .iter()
            .map(|r| RatingChoice::Rated(r.clone()))
            .collect(),
    }
}

/// Indices of records passing the current selection, in source-row order.
/// Recomputed in full on every filter change.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LocationRecord;

    fn record(brand: &str, beds: u32, rating: Option<&str>, directorate: &str) -> LocationRecord {
        LocationRecord {
            location_id: format!("1-{brand}-{beds}"),
            location_name: format!("{brand} House"),
            provider_name: Some(format!("{brand} Ltd")),
            brand_name: brand.to_string(),
            local_authority: Some("Leeds".to_string()),
            directorate: directorate.to_string(),
            bed_count: beds,
            overall_rating: rating.map(str::to_string),
            publication_date: None,
            latitude: None,
            longitude: None,
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record("A", 15, Some("Good"), ADULT_SOCIAL_CARE),
            record("A", 30, Some("Good"), ADULT_SOCIAL_CARE),
            record("B", 5, Some("Requires improvement"), "Children's services"),
        ])
    }

    #[test]
    fn directorate_restriction_is_exact_and_shrinking() {
        let ds = sample();
        let restricted = restrict_to_adult_social_care(&ds);
        assert_eq!(restricted.len(), 2);
        assert!(restricted.len() <= ds.len());
        assert!(restricted
            .records
            .iter()
            .all(|r| r.directorate == ADULT_SOCIAL_CARE));
        // Case-sensitive: a differently cased value does not match.
        let odd = Dataset::from_records(vec![record("C", 9, None, "adult social care")]);
        assert!(restrict_to_adult_social_care(&odd).is_empty());
    }

    #[test]
    fn empty_rating_set_matches_nothing() {
        let ds = restrict_to_adult_social_care(&sample());
        let mut selection = init_selection(&ds);
        selection.allowed_ratings.clear();
        assert!(filtered_indices(&ds, &selection).is_empty());
    }

    #[test]
    fn bed_range_is_inclusive() {
        let ds = restrict_to_adult_social_care(&sample());
        let mut selection = init_selection(&ds);
        selection.bed_range = (20, 100);
        let visible = filtered_indices(&ds, &selection);
        assert_eq!(visible.len(), 1);
        assert_eq!(ds.records[visible[0]].bed_count, 30);

        // Boundary values themselves pass.
        selection.bed_range = (15, 30);
        assert_eq!(filtered_indices(&ds, &selection).len(), 2);
    }

    #[test]
    fn brand_and_local_authority_exact_match() {
        let ds = restrict_to_adult_social_care(&sample());
        let mut selection = init_selection(&ds);
        selection.brand = Some("A".to_string());
        assert_eq!(filtered_indices(&ds, &selection).len(), 2);
        selection.brand = Some("Z".to_string());
        assert!(filtered_indices(&ds, &selection).is_empty());

        let mut selection = init_selection(&ds);
        selection.local_authority = Some("York".to_string());
        assert!(filtered_indices(&ds, &selection).is_empty());
    }

    #[test]
    fn unrated_rows_need_explicit_opt_in() {
        let ds = Dataset::from_records(vec![
            record("A", 10, Some("Good"), ADULT_SOCIAL_CARE),
            record("A", 12, None, ADULT_SOCIAL_CARE),
        ]);
        let mut selection = init_selection(&ds);
        assert_eq!(filtered_indices(&ds, &selection).len(), 1);
        selection.allowed_ratings.insert(RatingChoice::Unrated);
        assert_eq!(filtered_indices(&ds, &selection).len(), 2);
    }

    #[test]
    fn default_selection_spans_observed_beds() {
        let ds = restrict_to_adult_social_care(&sample());
        let selection = init_selection(&ds);
        assert_eq!(selection.bed_range, (15, 30));
        assert_eq!(filtered_indices(&ds, &selection).len(), 2);
    }
}
