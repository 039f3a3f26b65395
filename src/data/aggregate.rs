use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::model::Dataset;

/// Map markers stop growing past this radius regardless of home size.
pub const MAX_MARKER_RADIUS: f64 = 10.0;

// ---------------------------------------------------------------------------
// Overview – headline metrics and provider segmentation
// ---------------------------------------------------------------------------

/// Headline metrics over the filtered view.
///
/// Provider segmentation is a total partition of the distinct named
/// providers by their summed bed counts: ≤20, 21–100, >100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_beds: u64,
    pub total_locations: usize,
    pub total_providers: usize,
    pub providers_small: usize,
    pub providers_mid: usize,
    pub providers_large: usize,
}

pub fn overview(dataset: &Dataset, visible: &[usize]) -> Overview {
    let mut total_beds = 0u64;
    let mut locations: HashSet<&str> = HashSet::new();
    let mut provider_beds: HashMap<&str, u64> = HashMap::new();

    for &idx in visible {
        let rec = &dataset.records[idx];
        total_beds += u64::from(rec.bed_count);
        locations.insert(&rec.location_id);
        if let Some(provider) = &rec.provider_name {
            *provider_beds.entry(provider).or_default() += u64::from(rec.bed_count);
        }
    }

    let mut out = Overview {
        total_beds,
        total_locations: locations.len(),
        total_providers: provider_beds.len(),
        ..Overview::default()
    };
    for &beds in provider_beds.values() {
        match beds {
            0..=20 => out.providers_small += 1,
            21..=100 => out.providers_mid += 1,
            _ => out.providers_large += 1,
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Top brands by bed share
// ---------------------------------------------------------------------------

/// One brand's share of the market, over the whole directorate-restricted
/// dataset (the interactive filters deliberately do not apply here).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandShare {
    pub brand: String,
    pub beds: u64,
    /// Percentage of the dataset's total beds; `None` when the dataset has
    /// no beds at all (rendered as "N/A").
    pub share_pct: Option<f64>,
}

/// Brands ranked by summed bed count descending, ties broken by first
/// appearance in the source table (stable sort), truncated to `limit`.
pub fn top_brands_by_bed_share(dataset: &Dataset, limit: usize) -> Vec<BrandShare> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u64> = HashMap::new();

    for rec in &dataset.records {
        let entry = totals.entry(&rec.brand_name).or_insert_with(|| {
            order.push(&rec.brand_name);
            0
        });
        *entry += u64::from(rec.bed_count);
    }

    let grand_total: u64 = totals.values().sum();
    let mut shares: Vec<BrandShare> = order
        .into_iter()
        .map(|brand| {
            let beds = totals[brand];
            BrandShare {
                brand: brand.to_string(),
                beds,
                share_pct: (grand_total > 0).then(|| 100.0 * beds as f64 / grand_total as f64),
            }
        })
        .collect();
    shares.sort_by(|a, b| b.beds.cmp(&a.beds));
    shares.truncate(limit);
    shares
}

// ---------------------------------------------------------------------------
// Rating breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCount {
    pub rating: String,
    pub count: usize,
    /// Percentage of the rated rows in the filtered view.
    pub share_pct: f64,
}

/// Count and share per rating present among the filtered rows. Unrated rows
/// are not counted and do not enter the percentage base. Ordered by count
/// descending, ties broken by first appearance.
pub fn rating_breakdown(dataset: &Dataset, visible: &[usize]) -> Vec<RatingCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for &idx in visible {
        if let Some(rating) = &dataset.records[idx].overall_rating {
            let entry = counts.entry(rating).or_insert_with(|| {
                order.push(rating);
                0
            });
            *entry += 1;
        }
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut breakdown: Vec<RatingCount> = order
        .into_iter()
        .map(|rating| RatingCount {
            rating: rating.to_string(),
            count: counts[rating],
            share_pct: 100.0 * counts[rating] as f64 / total as f64,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

/// Share of a specific rating, or `None` when it is absent (rendered "N/A").
pub fn share_for(breakdown: &[RatingCount], rating: &str) -> Option<f64> {
    breakdown
        .iter()
        .find(|rc| rc.rating == rating)
        .map(|rc| rc.share_pct)
}

// ---------------------------------------------------------------------------
// Inspection activity by month
// ---------------------------------------------------------------------------

/// Inspection counts per calendar month, keyed by the first of the month and
/// ordered ascending. Rows without a publication date are excluded.
pub fn monthly_inspections(dataset: &Dataset, visible: &[usize]) -> Vec<(NaiveDate, usize)> {
    let mut by_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for &idx in visible {
        if let Some(date) = dataset.records[idx].publication_date {
            *by_month.entry((date.year(), date.month())).or_default() += 1;
        }
    }
    by_month
        .into_iter()
        .filter_map(|((year, month), count)| {
            NaiveDate::from_ymd_opt(year, month, 1).map(|d| (d, count))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Map points
// ---------------------------------------------------------------------------

/// A geocoded location ready for the map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub beds: u32,
    /// `beds / 10`, capped at [`MAX_MARKER_RADIUS`].
    pub radius: f64,
}

/// One point per filtered row with both coordinates present.
pub fn map_points(dataset: &Dataset, visible: &[usize]) -> Vec<MapPoint> {
    visible
        .iter()
        .filter_map(|&idx| {
            let rec = &dataset.records[idx];
            let (lat, lon) = (rec.latitude?, rec.longitude?);
            Some(MapPoint {
                latitude: lat,
                longitude: lon,
                name: rec.location_name.clone(),
                beds: rec.bed_count,
                radius: (f64::from(rec.bed_count) / 10.0).min(MAX_MARKER_RADIUS),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, init_selection, ADULT_SOCIAL_CARE};
    use crate::data::model::LocationRecord;

    fn record(
        brand: &str,
        provider: &str,
        beds: u32,
        rating: Option<&str>,
        date: Option<(i32, u32, u32)>,
    ) -> LocationRecord {
        LocationRecord {
            location_id: format!("1-{brand}-{provider}-{beds}"),
            location_name: format!("{brand} House"),
            provider_name: Some(provider.to_string()),
            brand_name: brand.to_string(),
            local_authority: Some("Leeds".to_string()),
            directorate: ADULT_SOCIAL_CARE.to_string(),
            bed_count: beds,
            overall_rating: rating.map(str::to_string),
            publication_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            latitude: None,
            longitude: None,
        }
    }

    fn all(ds: &Dataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn overview_scenario_same_provider_lands_in_mid_bucket() {
        // Two brand-A rows with the same provider: beds 15 + 30 = 45 → 21–100.
        let ds = Dataset::from_records(vec![
            record("A", "A Ltd", 15, Some("Good"), None),
            record("A", "A Ltd", 30, Some("Good"), None),
        ]);
        let out = overview(&ds, &all(&ds));
        assert_eq!(out.total_beds, 45);
        assert_eq!(out.total_locations, 2);
        assert_eq!(out.total_providers, 1);
        assert_eq!(
            (out.providers_small, out.providers_mid, out.providers_large),
            (0, 1, 0)
        );
    }

    #[test]
    fn bucket_boundaries_and_totality() {
        let ds = Dataset::from_records(vec![
            record("A", "P1", 20, None, None),  // exactly 20 → small
            record("B", "P2", 21, None, None),  // 21 → mid
            record("C", "P3", 100, None, None), // exactly 100 → mid
            record("D", "P4", 101, None, None), // 101 → large
        ]);
        let out = overview(&ds, &all(&ds));
        assert_eq!(
            (out.providers_small, out.providers_mid, out.providers_large),
            (1, 2, 1)
        );
        assert_eq!(
            out.providers_small + out.providers_mid + out.providers_large,
            out.total_providers
        );
    }

    #[test]
    fn overview_of_empty_view_is_all_zero() {
        let ds = Dataset::from_records(Vec::new());
        assert_eq!(overview(&ds, &[]), Overview::default());
    }

    #[test]
    fn top_brands_rank_desc_with_stable_ties() {
        let ds = Dataset::from_records(vec![
            record("Small", "P1", 10, None, None),
            record("TiedFirst", "P2", 40, None, None),
            record("TiedSecond", "P3", 40, None, None),
            record("Big", "P4", 100, None, None),
        ]);
        let shares = top_brands_by_bed_share(&ds, 10);
        let names: Vec<&str> = shares.iter().map(|s| s.brand.as_str()).collect();
        assert_eq!(names, vec!["Big", "TiedFirst", "TiedSecond", "Small"]);

        let total_pct: f64 = shares.iter().filter_map(|s| s.share_pct).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
        assert!(shares[0].share_pct.unwrap() > shares.last().unwrap().share_pct.unwrap());
    }

    #[test]
    fn top_brands_truncates_and_handles_empty_dataset() {
        let ds = Dataset::from_records(
            (0..15)
                .map(|i| record(&format!("B{i:02}"), "P", 10 + i, None, None))
                .collect(),
        );
        assert_eq!(top_brands_by_bed_share(&ds, 10).len(), 10);

        let empty = Dataset::from_records(Vec::new());
        assert!(top_brands_by_bed_share(&empty, 10).is_empty());
    }

    #[test]
    fn zero_bed_dataset_reports_no_share() {
        let ds = Dataset::from_records(vec![record("A", "P", 0, None, None)]);
        let shares = top_brands_by_bed_share(&ds, 10);
        assert_eq!(shares[0].share_pct, None);
    }

    #[test]
    fn ratings_scenario_after_bed_range_filter() {
        // A [20,100] range over beds {15, 30} keeps only the 30-bed row;
        // Good = 100%, Outstanding absent.
        let ds = Dataset::from_records(vec![
            record("A", "A Ltd", 15, Some("Good"), None),
            record("A", "A Ltd", 30, Some("Good"), None),
        ]);
        let mut selection = init_selection(&ds);
        selection.bed_range = (20, 100);
        let visible = filtered_indices(&ds, &selection);
        assert_eq!(visible.len(), 1);

        let breakdown = rating_breakdown(&ds, &visible);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].rating, "Good");
        assert_eq!(breakdown[0].count, 1);
        assert_eq!(share_for(&breakdown, "Good"), Some(100.0));
        assert_eq!(share_for(&breakdown, "Outstanding"), None);
    }

    #[test]
    fn rating_breakdown_skips_unrated_rows() {
        let ds = Dataset::from_records(vec![
            record("A", "P", 10, Some("Good"), None),
            record("A", "P", 10, Some("Good"), None),
            record("A", "P", 10, Some("Outstanding"), None),
            record("A", "P", 10, None, None),
        ]);
        let breakdown = rating_breakdown(&ds, &all(&ds));
        assert_eq!(breakdown[0].rating, "Good");
        assert_eq!(breakdown[0].count, 2);
        let total: f64 = breakdown.iter().map(|rc| rc.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rating_breakdown_of_empty_view_is_empty() {
        let ds = Dataset::from_records(vec![record("A", "P", 10, None, None)]);
        assert!(rating_breakdown(&ds, &all(&ds)).is_empty());
        assert!(rating_breakdown(&ds, &[]).is_empty());
    }

    #[test]
    fn monthly_series_groups_by_month_and_skips_null_dates() {
        // Dates {2024-01-05, 2024-01-20, 2024-02-01} plus one null.
        let ds = Dataset::from_records(vec![
            record("A", "P", 10, None, Some((2024, 1, 5))),
            record("A", "P", 10, None, Some((2024, 1, 20))),
            record("A", "P", 10, None, Some((2024, 2, 1))),
            record("A", "P", 10, None, None),
        ]);
        let series = monthly_inspections(&ds, &all(&ds));
        assert_eq!(
            series,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2),
                (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 1),
            ]
        );
    }

    #[test]
    fn map_points_require_both_coordinates_and_cap_radius() {
        let mut with_coords = record("A", "P", 250, None, None);
        with_coords.latitude = Some(52.5);
        with_coords.longitude = Some(-1.5);
        let mut lat_only = record("B", "P", 30, None, None);
        lat_only.latitude = Some(51.0);
        let mut small = record("C", "P", 30, None, None);
        small.latitude = Some(53.0);
        small.longitude = Some(-2.0);

        let ds = Dataset::from_records(vec![with_coords, lat_only, small]);
        let points = map_points(&ds, &all(&ds));
        assert_eq!(points.len(), 2);
        // 250 beds would be radius 25; capped at the maximum.
        assert_eq!(points[0].radius, MAX_MARKER_RADIUS);
        assert_eq!(points[1].radius, 3.0);
    }
}
