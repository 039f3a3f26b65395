use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::path::Path;

use anyhow::{Context, Result};

use crate::color::RatingColors;
use crate::data::filter::{
    filtered_indices, init_selection, restrict_to_adult_social_care, FilterSelection,
};
use crate::data::loader::{self, LoadReport};
use crate::data::model::{Dataset, RatingChoice};

// ---------------------------------------------------------------------------
// Loaded file – one cache entry, keyed by content
// ---------------------------------------------------------------------------

/// The parse result for one uploaded file, keyed by a digest of its bytes.
/// Re-opening a file with identical content reuses this entry instead of
/// re-parsing; different content replaces it wholesale.
pub struct LoadedFile {
    pub digest: u64,
    pub file_name: String,
    /// Directorate-restricted dataset; every view reads from this.
    pub dataset: Dataset,
    pub report: LoadReport,
}

fn content_digest(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// View tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Ratings,
    Activity,
    Map,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Ratings, Tab::Activity, Tab::Map];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Brand Overview",
            Tab::Ratings => "Ratings",
            Tab::Activity => "Inspection Activity",
            Tab::Map => "Map View",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Parsed upload (None until the user opens a file).
    pub loaded: Option<LoadedFile>,

    /// Current interactive filter choices.
    pub selection: FilterSelection,

    /// Indices of records passing the current selection (cached).
    pub visible: Vec<usize>,

    /// Colours for the rating values of the loaded dataset.
    pub rating_colors: Option<RatingColors>,

    /// Which view tab is active.
    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            loaded: None,
            selection: FilterSelection {
                brand: None,
                local_authority: None,
                bed_range: crate::data::model::EMPTY_BED_BOUNDS,
                allowed_ratings: Default::default(),
            },
            visible: Vec::new(),
            rating_colors: None,
            tab: Tab::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Read, digest, and parse a file, going through the content-keyed cache.
    /// On success the filters are reset to span the new dataset.
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let digest = content_digest(&bytes);

        if let Some(loaded) = &self.loaded {
            if loaded.digest == digest {
                log::info!("content digest unchanged, reusing parsed dataset");
                self.status_message = None;
                return Ok(());
            }
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let (dataset, report) = loader::load_bytes(&bytes, &ext)?;
        let dataset = restrict_to_adult_social_care(&dataset);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.install(LoadedFile {
            digest,
            file_name,
            dataset,
            report,
        });
        Ok(())
    }

    /// Ingest a parsed file: reset filters, colours, and visible rows.
    pub fn install(&mut self, loaded: LoadedFile) {
        log::info!(
            "loaded {}: {} adult-social-care locations ({})",
            loaded.file_name,
            loaded.dataset.len(),
            loaded.report.summary()
        );
        self.selection = init_selection(&loaded.dataset);
        self.visible = (0..loaded.dataset.len()).collect();
        self.rating_colors = Some(RatingColors::new(&loaded.dataset));
        self.status_message = None;
        self.loaded = Some(loaded);
        self.refilter();
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(loaded) = &self.loaded {
            self.visible = filtered_indices(&loaded.dataset, &self.selection);
        }
    }

    /// Toggle a single rating value in the allowed set.
    pub fn toggle_rating(&mut self, choice: &RatingChoice) {
        if !self.selection.allowed_ratings.remove(choice) {
            self.selection.allowed_ratings.insert(choice.clone());
        }
        self.refilter();
    }

    /// Select every rating value the dataset offers, unrated included.
    pub fn select_all_ratings(&mut self) {
        if let Some(loaded) = &self.loaded {
            self.selection.allowed_ratings = loaded
                .dataset
                .ratings
                .iter()
                .map(|r| RatingChoice::Rated(r.clone()))
                .collect();
            if loaded.dataset.has_unrated {
                self.selection.allowed_ratings.insert(RatingChoice::Unrated);
            }
            self.refilter();
        }
    }

    /// Deselect every rating value; the filtered view becomes empty.
    pub fn select_no_ratings(&mut self) {
        self.selection.allowed_ratings.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::ADULT_SOCIAL_CARE;
    use crate::data::model::LocationRecord;

    fn record(brand: &str, beds: u32, rating: Option<&str>) -> LocationRecord {
        LocationRecord {
            location_id: format!("1-{brand}-{beds}"),
            location_name: format!("{brand} House"),
            provider_name: Some(format!("{brand} Ltd")),
            brand_name: brand.to_string(),
            local_authority: Some("Leeds".to_string()),
            directorate: ADULT_SOCIAL_CARE.to_string(),
            bed_count: beds,
            overall_rating: rating.map(str::to_string),
            publication_date: None,
            latitude: None,
            longitude: None,
        }
    }

    fn loaded(records: Vec<LocationRecord>) -> LoadedFile {
        LoadedFile {
            digest: 1,
            file_name: "test.xlsx".to_string(),
            dataset: Dataset::from_records(records),
            report: LoadReport::default(),
        }
    }

    #[test]
    fn install_resets_selection_and_visibility() {
        let mut state = AppState::default();
        state.install(loaded(vec![
            record("A", 10, Some("Good")),
            record("B", 40, Some("Outstanding")),
        ]));
        assert_eq!(state.visible.len(), 2);
        assert_eq!(state.selection.bed_range, (10, 40));
        assert_eq!(state.selection.allowed_ratings.len(), 2);
    }

    #[test]
    fn select_none_then_all_round_trips() {
        let mut state = AppState::default();
        state.install(loaded(vec![
            record("A", 10, Some("Good")),
            record("B", 40, None),
        ]));
        // Unrated rows are hidden by default.
        assert_eq!(state.visible.len(), 1);

        state.select_no_ratings();
        assert!(state.visible.is_empty());

        state.select_all_ratings();
        assert_eq!(state.visible.len(), 2);
    }

    #[test]
    fn toggle_rating_flips_membership() {
        let mut state = AppState::default();
        state.install(loaded(vec![record("A", 10, Some("Good"))]));
        let good = RatingChoice::Rated("Good".to_string());

        state.toggle_rating(&good);
        assert!(state.visible.is_empty());
        state.toggle_rating(&good);
        assert_eq!(state.visible.len(), 1);
    }

    #[test]
    fn digests_differ_for_different_content() {
        assert_ne!(content_digest(b"one"), content_digest(b"two"));
        assert_eq!(content_digest(b"same"), content_digest(b"same"));
    }
}
