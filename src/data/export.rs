use rust_xlsxwriter::{Workbook, XlsxError};

use super::loader::SHEET_NAME;
use super::model::{Dataset, LocationRecord, COLUMN_ORDER};

// ---------------------------------------------------------------------------
// Filtered-view export
// ---------------------------------------------------------------------------

/// Serialize the filtered view to workbook bytes: one sheet (named so the
/// loader can re-open its own output), header row, fixed column order, no
/// transformation beyond formatting. Dates are written as ISO strings, which
/// the loader's coercion parses back unchanged.
pub fn filtered_view_to_xlsx(dataset: &Dataset, visible: &[usize]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMN_ORDER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    for (out_row, &idx) in visible.iter().enumerate() {
        let rec = &dataset.records[idx];
        let row = out_row as u32 + 1;

        sheet.write_string(row, 0, &rec.location_id)?;
        sheet.write_string(row, 1, &rec.location_name)?;
        if let Some(provider) = &rec.provider_name {
            sheet.write_string(row, 2, provider)?;
        }
        sheet.write_string(row, 3, &rec.brand_name)?;
        if let Some(la) = &rec.local_authority {
            sheet.write_string(row, 4, la)?;
        }
        sheet.write_string(row, 5, &rec.directorate)?;
        sheet.write_number(row, 6, f64::from(rec.bed_count))?;
        if let Some(rating) = &rec.overall_rating {
            sheet.write_string(row, 7, rating)?;
        }
        if let Some(date) = rec.publication_date {
            sheet.write_string(row, 8, date.format("%Y-%m-%d").to_string())?;
        }
        if let Some(lat) = rec.latitude {
            sheet.write_number(row, 9, lat)?;
        }
        if let Some(lon) = rec.longitude {
            sheet.write_number(row, 10, lon)?;
        }
    }

    workbook.save_to_buffer()
}

/// The same view as CSV bytes, identical row/column shape.
pub fn filtered_view_to_csv(dataset: &Dataset, visible: &[usize]) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(COLUMN_ORDER)?;
        for &idx in visible {
            writer.write_record(csv_fields(&dataset.records[idx]))?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

fn csv_fields(rec: &LocationRecord) -> [String; 11] {
    [
        rec.location_id.clone(),
        rec.location_name.clone(),
        rec.provider_name.clone().unwrap_or_default(),
        rec.brand_name.clone(),
        rec.local_authority.clone().unwrap_or_default(),
        rec.directorate.clone(),
        rec.bed_count.to_string(),
        rec.overall_rating.clone().unwrap_or_default(),
        rec.publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        rec.latitude.map(|v| v.to_string()).unwrap_or_default(),
        rec.longitude.map(|v| v.to_string()).unwrap_or_default(),
    ]
}
