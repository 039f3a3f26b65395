use chrono::Datelike;
use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::data::aggregate::{
    map_points, monthly_inspections, overview, rating_breakdown, share_for,
    top_brands_by_bed_share,
};
use crate::data::model::RatingChoice;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Central panel – tabbed views over the filtered dataset
// ---------------------------------------------------------------------------

/// Render the active view tab in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.loaded.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an HSCA locations file to get started  (File → Open…)");
        });
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            if ui.selectable_label(state.tab == tab, tab.label()).clicked() {
                state.tab = tab;
            }
        }
    });
    ui.separator();

    let Some(loaded) = &state.loaded else {
        return;
    };
    let dataset = &loaded.dataset;
    let visible = &state.visible;

    match state.tab {
        Tab::Overview => overview_view(ui, state),
        Tab::Ratings => ratings_view(ui, state),
        Tab::Activity => activity_view(ui, dataset, visible),
        Tab::Map => map_view(ui, dataset, visible),
    }
}

// ---------------------------------------------------------------------------
// Brand & provider overview
// ---------------------------------------------------------------------------

fn overview_view(ui: &mut Ui, state: &AppState) {
    let Some(loaded) = &state.loaded else {
        return;
    };
    let summary = overview(&loaded.dataset, &state.visible);

    ui.heading("Brand & Provider Overview");
    ui.add_space(4.0);
    metric(ui, "Total beds", &thousands(summary.total_beds));
    metric(ui, "Total providers", &summary.total_providers.to_string());
    metric(ui, "Total locations", &summary.total_locations.to_string());

    ui.add_space(8.0);
    ui.strong("Provider segmentation by bed count");
    ui.label(format!("Providers ≤ 20 beds: {}", summary.providers_small));
    ui.label(format!("Providers 21–100 beds: {}", summary.providers_mid));
    ui.label(format!("Providers > 100 beds: {}", summary.providers_large));

    ui.add_space(8.0);
    ui.strong("Top 10 brands by bed share");
    ui.label(
        RichText::new("Computed over all adult-social-care locations, before filters.")
            .small()
            .color(Color32::GRAY),
    );

    let shares = top_brands_by_bed_share(&loaded.dataset, 10);
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(100.0))
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Brand");
            });
            header.col(|ui| {
                ui.strong("Beds");
            });
            header.col(|ui| {
                ui.strong("Market share");
            });
        })
        .body(|mut body| {
            for share in &shares {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&share.brand);
                    });
                    row.col(|ui| {
                        ui.label(thousands(share.beds));
                    });
                    row.col(|ui| {
                        ui.label(pct(share.share_pct));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Rating overview
// ---------------------------------------------------------------------------

fn ratings_view(ui: &mut Ui, state: &AppState) {
    let Some(loaded) = &state.loaded else {
        return;
    };
    let breakdown = rating_breakdown(&loaded.dataset, &state.visible);

    ui.heading("Rating Overview");
    ui.add_space(4.0);
    metric(ui, "% Good", &pct(share_for(&breakdown, "Good")));
    metric(ui, "% Outstanding", &pct(share_for(&breakdown, "Outstanding")));
    ui.add_space(8.0);

    if breakdown.is_empty() {
        ui.label("No rated locations match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(80.0))
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Rating");
            });
            header.col(|ui| {
                ui.strong("Count");
            });
            header.col(|ui| {
                ui.strong("%");
            });
        })
        .body(|mut body| {
            for entry in &breakdown {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        let mut text = RichText::new(&entry.rating);
                        if let Some(colors) = &state.rating_colors {
                            text = text
                                .color(colors.color_for(&RatingChoice::Rated(entry.rating.clone())));
                        }
                        ui.label(text);
                    });
                    row.col(|ui| {
                        ui.label(entry.count.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}%", entry.share_pct));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Inspection activity (time series)
// ---------------------------------------------------------------------------

fn activity_view(ui: &mut Ui, dataset: &crate::data::model::Dataset, visible: &[usize]) {
    ui.heading("Recent Inspection Activity");
    ui.add_space(4.0);

    let series = monthly_inspections(dataset, visible);
    if series.is_empty() {
        ui.label("No dated inspections match the current filters.");
        return;
    }

    let points: PlotPoints = series
        .iter()
        .map(|(month, count)| [month_index(month.year(), month.month()), *count as f64])
        .collect();

    Plot::new("inspection_activity")
        .x_axis_label("Month")
        .y_axis_label("Inspections")
        .x_axis_formatter(|mark, _range| month_label(mark.value))
        .label_formatter(|_name, value| {
            format!("{}: {:.0} inspections", month_label(value.x), value.y.max(0.0))
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Inspections per month")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

/// Months since year 0, the x unit of the activity chart.
fn month_index(year: i32, month: u32) -> f64 {
    (year * 12 + month as i32 - 1) as f64
}

fn month_label(index: f64) -> String {
    let months = index.round() as i64;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;
    format!("{year:04}-{month:02}")
}

// ---------------------------------------------------------------------------
// Map of locations
// ---------------------------------------------------------------------------

fn map_view(ui: &mut Ui, dataset: &crate::data::model::Dataset, visible: &[usize]) {
    ui.heading("Map of Locations");
    ui.add_space(4.0);

    let points = map_points(dataset, visible);
    if points.is_empty() {
        ui.label("No geocoded locations match the current filters.");
        return;
    }

    Plot::new("location_map")
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for point in &points {
                plot_ui.points(
                    Points::new(vec![[point.longitude, point.latitude]])
                        .radius(point.radius as f32)
                        .color(Color32::from_rgba_unmultiplied(80, 140, 240, 160))
                        .name(format!("{} ({} beds)", point.name, point.beds)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Small formatting helpers
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(label).color(Color32::GRAY));
        ui.strong(value);
    });
}

fn pct(share: Option<f64>) -> String {
    match share {
        Some(p) => format!("{p:.1}%"),
        None => "N/A".to_string(),
    }
}

fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
