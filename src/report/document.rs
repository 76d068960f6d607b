use std::{
    collections::BTreeMap,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use tracing::info;

use crate::{
    store::entities::SessionRecord,
    utils::time::{DATE_FORMAT, decompose_hours},
};

use super::{ExportError, filter_by_date_range, parse_report_date};

// A4 geometry in millimeters. The cursor walks down from near the top edge
// and a fresh page starts once it drops below the break line, which may
// happen in the middle of a date group.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP_Y: f32 = 282.0;
const PAGE_BREAK_Y: f32 = 18.0;

const TITLE_X: f32 = 70.0;
const DATE_X: f32 = 18.0;
const TIME_X: f32 = 25.0;
const DETAIL_X: f32 = 32.0;

const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

/// Builds the dated PDF report over `[start, end]` (inclusive calendar
/// days), writes it into `dir` and returns the written path. Date inputs are
/// taken verbatim from the user and must be `YYYY-MM-DD`.
pub fn generate_report(
    records: &[SessionRecord],
    start_input: &str,
    end_input: &str,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let start = parse_report_date(start_input)?;
    let end = parse_report_date(end_input)?;

    let filtered = filter_by_date_range(records, start, end);
    if filtered.is_empty() {
        return Err(ExportError::EmptyRange { start, end });
    }

    let path = dir.join(report_file_name(start, end));
    write_document(&filtered, start, end, &path).map_err(|source| ExportError::Render {
        path: path.clone(),
        source,
    })?;
    info!("Wrote activity report to {path:?}");
    Ok(path)
}

/// The output name deterministically encodes both boundary dates.
pub fn report_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "Activity_Report_{}_to_{}.pdf",
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT)
    )
}

fn write_document(
    records: &[&SessionRecord],
    start: NaiveDate,
    end: NaiveDate,
    path: &Path,
) -> anyhow::Result<()> {
    // Group by calendar day ascending; within a day, store order is kept.
    let mut by_date = BTreeMap::<NaiveDate, Vec<&SessionRecord>>::new();
    for &record in records {
        by_date.entry(record.start_date()).or_default().push(record);
    }

    let mut writer = ReportWriter::new()?;
    writer.write(
        &format!(
            "Activity Report ({} to {})",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        ),
        HEADING_SIZE,
        Font::Regular,
        TITLE_X,
        10.5,
    );

    for (date, sessions) in by_date {
        writer.write(
            &date.format(DATE_FORMAT).to_string(),
            HEADING_SIZE,
            Font::Bold,
            DATE_X,
            7.0,
        );

        for session in sessions {
            writer.write(
                &format!(
                    "From {} to {}",
                    session.start_time.format("%H:%M:%S"),
                    session.end_time.format("%H:%M:%S")
                ),
                BODY_SIZE,
                Font::Regular,
                TIME_X,
                5.3,
            );
            writer.write(
                &format!("There was activity: {}", session.activity),
                BODY_SIZE,
                Font::Regular,
                DETAIL_X,
                5.3,
            );
            writer.write(
                &format!("Notes: {}", session.notes),
                BODY_SIZE,
                Font::Regular,
                DETAIL_X,
                5.3,
            );
            let (hours, minutes, seconds) = decompose_hours(session.duration_hours);
            writer.write(
                &format!("Duration: {hours} hours, {minutes} minutes, {seconds} seconds"),
                BODY_SIZE,
                Font::Regular,
                DETAIL_X,
                8.8,
            );
        }
    }

    writer.save(path)
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

/// Top-down text cursor over a growing PDF document.
struct ReportWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl ReportWriter {
    fn new() -> anyhow::Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new("Activity Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("{e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("{e}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: TOP_Y,
        })
    }

    /// Writes one line and advances the cursor by `step`, breaking to a new
    /// page first when the remaining space is below the threshold.
    fn write(&mut self, text: &str, size: f32, font: Font, x: f32, step: f32) {
        if self.y < PAGE_BREAK_Y {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
        let font = match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= step;
    }

    fn save(self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| anyhow!("{e}"))
    }
}
