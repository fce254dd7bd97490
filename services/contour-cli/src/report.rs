//! Results reporting and formatting.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use confidence_contour::Histogram1d;

use crate::runner::ContourRun;

/// Formats contour runs for output.
pub struct ContourReport;

impl ContourReport {
    /// Format a summary as a console table, one row per percentage.
    pub fn format_table(run: &ContourRun) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Percentage", "Level", "Enclosed", "Loops", "Closed", "Points"]);

        for contour in &run.contours {
            let enclosed = format!("{:.1}%", contour.enclosed_fraction() * 100.0);
            table.add_row(vec![
                format!("{}%", contour.percentage()),
                format!("{:.3}", contour.level()),
                if contour.resolved() {
                    enclosed
                } else {
                    format!("{enclosed} (unresolved)")
                },
                contour.loop_count().to_string(),
                contour.closed_loop_count().to_string(),
                contour
                    .coordinates()
                    .iter()
                    .filter(|c| !c.is_gap())
                    .count()
                    .to_string(),
            ]);
        }

        let mut output = format!("Samples: {}\n", run.samples);
        if let Some(grid_step) = &run.grid_step {
            let [(x_min, x_max), (y_min, y_max)] = grid_step.bounds;
            output.push_str(&format!(
                "Grid step: {} over x [{}, {}], y [{}, {}]\n",
                grid_step.step, x_min, x_max, y_min, y_max
            ));
        }
        output.push_str(&table.to_string());
        output
    }

    /// Format the full run as JSON. Loop gaps serialize as `null`.
    pub fn format_json(run: &ContourRun) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(run)?)
    }

    /// Format contour coordinates as CSV rows, gaps written as `NaN`.
    pub fn format_csv(run: &ContourRun) -> String {
        let mut rows = Vec::new();
        for contour in &run.contours {
            for coordinate in contour.coordinates() {
                rows.push(format!(
                    "{},{},{},{}",
                    contour.percentage(),
                    contour.level(),
                    coordinate.x,
                    coordinate.y
                ));
            }
        }
        rows.join("\n")
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "percentage,level,x,y"
    }
}

/// Formats 1-D histograms for output.
pub struct HistogramReport;

impl HistogramReport {
    /// Format bins as a console table.
    pub fn format_table(histogram: &Histogram1d) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Bin", "From", "To", "Count"]);

        for (bin, count) in histogram.counts().iter().enumerate() {
            table.add_row(vec![
                bin.to_string(),
                format!("{:.4}", histogram.edges()[bin]),
                format!("{:.4}", histogram.edges()[bin + 1]),
                count.to_string(),
            ]);
        }

        format!(
            "Bins: {}  Bin size: {:.4}  Total: {}\n{}",
            histogram.bins(),
            histogram.bin_size(),
            histogram.total(),
            table
        )
    }

    /// Format the step outline as CSV rows.
    pub fn format_csv(histogram: &Histogram1d) -> String {
        histogram
            .step_outline()
            .iter()
            .map(|(x, y)| format!("{x},{y}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "x,count"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidence_contour::{histogram1d, Histogram1dOptions};

    #[test]
    fn test_histogram_csv_outline() {
        let options = Histogram1dOptions {
            bins: Some(2),
            ..Default::default()
        };
        let histogram = histogram1d(&[0.0, 0.5, 2.0], &options).unwrap();
        let csv = HistogramReport::format_csv(&histogram);
        assert_eq!(csv.lines().next(), Some("0,0"));
        assert_eq!(csv.lines().count(), 6);
    }

    #[test]
    fn test_histogram_table_lists_bins() {
        let options = Histogram1dOptions {
            bins: Some(3),
            ..Default::default()
        };
        let histogram = histogram1d(&[1.0, 2.0, 3.0, 3.0], &options).unwrap();
        let table = HistogramReport::format_table(&histogram);
        assert!(table.contains("Bins: 3"));
        assert!(table.contains("Total: 4"));
    }
}
