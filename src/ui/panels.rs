use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::export::{filtered_view_to_csv, filtered_view_to_xlsx};
use crate::data::model::RatingChoice;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(loaded) = &state.loaded else {
        ui.label("No file loaded.");
        return;
    };

    // Clone the option lists so we can mutate the selection inside the loop.
    let brands = loaded.dataset.brands.clone();
    let local_authorities = loaded.dataset.local_authorities.clone();
    let ratings = loaded.dataset.ratings.clone();
    let has_unrated = loaded.dataset.has_unrated;
    let (min_beds, max_beds) = loaded.dataset.bed_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Brand ----
            ui.strong("Brand");
            option_combo(ui, "brand_filter", &mut state.selection.brand, &brands);
            ui.separator();

            // ---- Local authority ----
            ui.strong("Local authority");
            option_combo(
                ui,
                "local_authority_filter",
                &mut state.selection.local_authority,
                &local_authorities,
            );
            ui.separator();

            // ---- Bed count range ----
            ui.strong("Bed count");
            let (mut lo, mut hi) = state.selection.bed_range;
            ui.add(Slider::new(&mut lo, min_beds..=max_beds).text("min"));
            ui.add(Slider::new(&mut hi, min_beds..=max_beds).text("max"));
            // Keep the range well-formed when the handles cross.
            if lo > hi {
                hi = lo;
            }
            state.selection.bed_range = (lo, hi);
            ui.separator();

            // ---- Ratings ----
            let n_selected = state.selection.allowed_ratings.len();
            let n_total = ratings.len() + usize::from(has_unrated);
            ui.strong(format!("Rating  ({n_selected}/{n_total})"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_ratings();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_ratings();
                }
            });

            let mut choices: Vec<RatingChoice> = ratings
                .iter()
                .map(|r| RatingChoice::Rated(r.clone()))
                .collect();
            if has_unrated {
                choices.push(RatingChoice::Unrated);
            }
            for choice in &choices {
                let mut checked = state.selection.allowed_ratings.contains(choice);
                let mut text = RichText::new(choice.to_string());
                if let Some(colors) = &state.rating_colors {
                    text = text.color(colors.color_for(choice));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_rating(choice);
                }
            }
        });

    // Recompute visible indices after any widget change.
    state.refilter();
}

/// A combo box over `Some(value)` choices with a leading "All" sentinel.
fn option_combo(ui: &mut Ui, id: &str, selection: &mut Option<String>, options: &[String]) {
    let current = selection.clone().unwrap_or_else(|| "All".to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.clone())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(selection.is_none(), "All").clicked() {
                *selection = None;
            }
            for option in options {
                if ui
                    .selectable_label(selection.as_deref() == Some(option), option)
                    .clicked()
                {
                    *selection = Some(option.clone());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_data = state.loaded.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Export filtered data (.xlsx)…"))
                .clicked()
            {
                export_dialog(state, ExportFormat::Xlsx);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data, egui::Button::new("Export filtered data (.csv)…"))
                .clicked()
            {
                export_dialog(state, ExportFormat::Csv);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data, egui::Button::new("Save data-quality report…"))
                .clicked()
            {
                save_report_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(loaded) = &state.loaded {
            ui.label(format!(
                "{}: {} locations, {} visible",
                loaded.file_name,
                loaded.dataset.len(),
                state.visible.len()
            ));
            if loaded.report.rows_dropped > 0 {
                ui.label(
                    RichText::new(format!("({} rows dropped)", loaded.report.rows_dropped))
                        .color(Color32::YELLOW),
                )
                .on_hover_text(loaded.report.summary());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open HSCA locations file")
        .add_filter("Supported files", &["xlsx", "csv"])
        .add_filter("Excel workbook", &["xlsx"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match state.open_file(&path) {
            Ok(()) => {}
            Err(e) => {
                log::error!("failed to load file: {e:#}");
                state.status_message = Some(format!("Cannot read file: {e:#}"));
            }
        }
    }
}

#[derive(Clone, Copy)]
enum ExportFormat {
    Xlsx,
    Csv,
}

fn export_dialog(state: &mut AppState, format: ExportFormat) {
    let (label, ext, default_name) = match format {
        ExportFormat::Xlsx => ("Excel workbook", "xlsx", "filtered_data.xlsx"),
        ExportFormat::Csv => ("CSV", "csv", "filtered_data.csv"),
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(default_name)
        .add_filter(label, &[ext])
        .save_file();

    if let Some(path) = file {
        match write_export(state, format, &path) {
            Ok(rows) => log::info!("exported {rows} rows to {}", path.display()),
            Err(e) => {
                log::error!("export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}

fn write_export(
    state: &AppState,
    format: ExportFormat,
    path: &std::path::Path,
) -> Result<usize> {
    let loaded = state.loaded.as_ref().context("no dataset loaded")?;
    let bytes = match format {
        ExportFormat::Xlsx => filtered_view_to_xlsx(&loaded.dataset, &state.visible)
            .context("serializing workbook")?,
        ExportFormat::Csv => {
            filtered_view_to_csv(&loaded.dataset, &state.visible).context("serializing CSV")?
        }
    };
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(state.visible.len())
}

fn save_report_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save data-quality report")
        .set_file_name("load_report.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match write_report(state, &path) {
            Ok(()) => log::info!("saved data-quality report to {}", path.display()),
            Err(e) => {
                log::error!("saving report failed: {e:#}");
                state.status_message = Some(format!("Saving report failed: {e:#}"));
            }
        }
    }
}

fn write_report(state: &AppState, path: &std::path::Path) -> Result<()> {
    let loaded = state.loaded.as_ref().context("no dataset loaded")?;
    let report = serde_json::json!({
        "file_name": loaded.file_name,
        "load": loaded.report,
        "adult_social_care_locations": loaded.dataset.len(),
    });
    let serialized = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, serialized).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
