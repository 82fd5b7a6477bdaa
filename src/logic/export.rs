//! CSV and printable HTML exports of the prediction history.

use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::logic::calculations::format_thousands;
use crate::models::HistoryRecord;

pub const CSV_HEADERS: [&str; 11] = [
    "Date",
    "Time",
    "Crop",
    "Country",
    "Year",
    "Rainfall (mm)",
    "Temperature (°C)",
    "Pesticides (tonnes)",
    "Predicted Yield (kg/ha)",
    "Confidence (%)",
    "Location",
];

pub fn default_csv_filename(date: NaiveDate) -> String {
    format!("crop_predictions_{}.csv", date.format("%Y-%m-%d"))
}

/// Render records as CSV with every cell quoted.
pub fn history_to_csv(records: &[HistoryRecord]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);

    wtr.write_record(CSV_HEADERS)?;
    for record in records {
        let local = record.timestamp.with_timezone(&Local);
        wtr.write_record([
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M:%S").to_string(),
            record.input.item.clone(),
            record.input.country.clone(),
            record.input.year.to_string(),
            record.input.rainfall.to_string(),
            record.input.avg_temp.to_string(),
            record.input.pesticides.to_string(),
            format!("{:.0}", record.prediction.yield_value),
            record.prediction.confidence.to_string(),
            record.location_label(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| crate::error::CropCastError::InvalidData(format!("CSV output: {}", e)))
}

pub fn write_csv(records: &[HistoryRecord], path: &Path) -> Result<()> {
    std::fs::write(path, history_to_csv(records)?)?;
    tracing::info!(path = %path.display(), count = records.len(), "History exported to CSV");
    Ok(())
}

/// Standalone HTML page meant to be opened in a browser and printed.
pub fn history_to_html(records: &[HistoryRecord], generated_on: NaiveDate) -> String {
    let rows: String = records
        .iter()
        .map(|record| {
            format!(
                "        <tr>\n          <td>{}</td>\n          <td>{}</td>\n          <td>{}</td>\n          <td>{} mm</td>\n          <td>{}°C</td>\n          <td>{} kg/ha</td>\n          <td>{}%</td>\n        </tr>\n",
                record.timestamp.with_timezone(&Local).format("%Y-%m-%d"),
                escape_html(&record.input.item),
                escape_html(&record.input.country),
                record.input.rainfall,
                record.input.avg_temp,
                format_thousands(record.prediction.yield_value),
                record.prediction.confidence,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Crop Yield Prediction History</title>
    <style>
      body {{ font-family: Arial, sans-serif; margin: 20px; }}
      h1 {{ color: #10b981; text-align: center; }}
      table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
      th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
      th {{ background-color: #f2f2f2; }}
      .header {{ text-align: center; margin-bottom: 20px; }}
      .date {{ color: #666; }}
    </style>
  </head>
  <body>
    <div class="header">
      <h1>Crop Yield Prediction History</h1>
      <p class="date">Generated on: {generated}</p>
    </div>
    <table>
      <thead>
        <tr>
          <th>Date</th>
          <th>Crop</th>
          <th>Country</th>
          <th>Rainfall</th>
          <th>Temperature</th>
          <th>Predicted Yield</th>
          <th>Confidence</th>
        </tr>
      </thead>
      <tbody>
{rows}      </tbody>
    </table>
  </body>
</html>
"#,
        generated = generated_on.format("%Y-%m-%d"),
        rows = rows,
    )
}

pub fn write_html(records: &[HistoryRecord], path: &Path) -> Result<()> {
    let html = history_to_html(records, Local::now().date_naive());
    std::fs::write(path, html)?;
    tracing::info!(path = %path.display(), count = records.len(), "History report written");
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryLocation, PredictionInput, PredictionResult};

    fn record(item: &str, country: &str, location: Option<HistoryLocation>) -> HistoryRecord {
        let input = PredictionInput::new(2023, 1150.5, 2.25, 24.0, country, item);
        let result = PredictionResult::new(&input, 4523.6, Some(87));
        HistoryRecord::new(input, result, location)
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(default_csv_filename(date), "crop_predictions_2024-03-09.csv");
    }

    #[test]
    fn csv_quotes_every_cell() {
        let records = vec![record(
            "Rice, paddy",
            "India",
            Some(HistoryLocation {
                name: "Pune".into(),
                country: "IN".into(),
            }),
        )];
        let csv = history_to_csv(&records).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "\"Date\",\"Time\",\"Crop\",\"Country\",\"Year\",\"Rainfall (mm)\",\"Temperature (°C)\",\"Pesticides (tonnes)\",\"Predicted Yield (kg/ha)\",\"Confidence (%)\",\"Location\""
        );
        let row = lines.next().unwrap();
        assert!(row.ends_with(
            "\"Rice, paddy\",\"India\",\"2023\",\"1150.5\",\"24\",\"2.25\",\"4524\",\"87\",\"Pune, IN\""
        ));
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_marks_missing_location() {
        let csv = history_to_csv(&[record("Maize", "Kenya", None)]).unwrap();
        assert!(csv.trim_end().ends_with("\"N/A\""));
    }

    #[test]
    fn empty_history_exports_header_only() {
        let csv = history_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn html_report_lists_records() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let html = history_to_html(&[record("Sorghum", "Mali", None)], date);

        assert!(html.contains("<title>Crop Yield Prediction History</title>"));
        assert!(html.contains("Generated on: 2024-05-01"));
        assert!(html.contains("<td>Sorghum</td>"));
        assert!(html.contains("<td>1150.5 mm</td>"));
        assert!(html.contains("<td>4,524 kg/ha</td>"));
        assert!(html.contains("<td>87%</td>"));
    }

    #[test]
    fn html_escapes_text() {
        assert_eq!(escape_html("A & B <c>"), "A &amp; B &lt;c&gt;");
    }
}
