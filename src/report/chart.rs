use std::path::{Path, PathBuf};

use anyhow::anyhow;
use plotters::prelude::*;
use tracing::info;

use crate::{store::entities::SessionRecord, utils::time::DATE_FORMAT};

use super::{
    ExportError,
    aggregate::{DailyTotals, summarize_by_day},
};

/// Fixed name of the chart artifact; an existing file is overwritten.
pub const CHART_FILE: &str = "activity_analysis.png";

const CHART_SIZE: (u32, u32) = (1000, 600);

/// Renders the stacked daily bar chart into `dir` and returns the written
/// path. An empty store writes nothing and reports [ExportError::NoData].
pub fn render_chart(records: &[SessionRecord], dir: &Path) -> Result<PathBuf, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let totals = summarize_by_day(records);
    let path = dir.join(CHART_FILE);
    draw(&totals, &path).map_err(|source| ExportError::Render {
        path: path.clone(),
        source,
    })?;
    info!("Wrote activity chart to {path:?}");
    Ok(path)
}

fn draw(totals: &DailyTotals, path: &Path) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let dates = totals.dates();
    // Leave headroom above the tallest bar so it never touches the frame.
    let y_max = (totals.max_stacked_hours() * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Time Analysis", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..dates.len() as f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(dates.len().min(12))
        .x_label_formatter(&|x| {
            let index = x.floor() as usize;
            dates
                .get(index)
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        })
        .x_desc("Date")
        .y_desc("Hours Spent")
        .draw()?;

    // One series per activity so the legend gets an entry per name; each
    // segment sits on the running total of the segments drawn below it.
    let mut baselines = vec![0.0f64; dates.len()];
    for (series_index, activity) in totals.activities().iter().enumerate() {
        let color = Palette99::pick(series_index).mix(1.0);
        let bars = dates
            .iter()
            .enumerate()
            .filter_map(|(i, date)| {
                let hours = totals.hours(*date, activity);
                if hours <= 0.0 {
                    return None;
                }
                let base = baselines[i];
                baselines[i] += hours;
                Some(Rectangle::new(
                    [(i as f64 + 0.15, base), (i as f64 + 0.85, base + hours)],
                    color.filled(),
                ))
            })
            .collect::<Vec<_>>();

        chart
            .draw_series(bars)?
            .label(activity.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present().map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::render_chart;
    use crate::report::{ExportError, test_support::record};

    #[test]
    fn empty_store_writes_no_file() -> Result<()> {
        let dir = tempdir()?;
        let result = render_chart(&[], dir.path());
        assert!(matches!(result, Err(ExportError::NoData)));
        assert!(!dir.path().join("activity_analysis.png").exists());
        Ok(())
    }

    #[test]
    fn writes_a_png_for_recorded_sessions() -> Result<()> {
        let dir = tempdir()?;
        let records = vec![
            record("Study", (2024, 1, 1), (9, 0, 0), 1.5),
            record("Game", (2024, 1, 1), (20, 0, 0), 2.0),
            record("Study", (2024, 1, 2), (9, 0, 0), 0.5),
        ];

        let path = render_chart(&records, dir.path())?;
        assert!(path.exists());
        assert!(std::fs::metadata(&path)?.len() > 0);
        Ok(())
    }
}
