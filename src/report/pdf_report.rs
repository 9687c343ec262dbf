// PDF report: A4 pages with the CPU, memory and disk summary sections

use super::summary::{SummaryRow, summary_rows};
use crate::error::ReportError;
use crate::models::Snapshot;
use chrono::{DateTime, Local};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE: f32 = 6.0;

const SECTIONS: [(&str, &str); 3] = [
    ("CPU", "CPU Metrics"),
    ("Memory", "Memory Metrics"),
    ("Disk", "Disk Metrics"),
];

fn pdf_err(e: impl std::fmt::Debug) -> ReportError {
    ReportError::Pdf(format!("{e:?}"))
}

/// Writes lines top to bottom, starting a new page when the margin is reached.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn text(&mut self, text: &str, size: f32, font: &IndirectFontRef, advance: f32) {
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= advance;
    }
}

pub(super) fn render(snapshot: &Snapshot, generated_at: DateTime<Local>) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        "System Monitoring Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let rows = summary_rows(snapshot);
    {
        let mut cursor = Cursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
        };
        cursor.text("System Monitoring Report", 16.0, &bold, 2.0 * LINE);
        cursor.text(
            &format!(
                "Generated on: {}",
                generated_at.format("%a, %d %b %Y %H:%M:%S %Z")
            ),
            10.0,
            &regular,
            2.5 * LINE,
        );

        for (section, title) in SECTIONS {
            cursor.text(title, 12.0, &bold, 1.5 * LINE);
            let section_rows: Vec<&SummaryRow> =
                rows.iter().filter(|r| r.section == section).collect();
            if section_rows.is_empty() {
                cursor.text("No data collected", 10.0, &regular, LINE);
            }
            for r in section_rows {
                cursor.text(&format!("{}: {}", r.metric, r.value), 10.0, &regular, LINE);
            }
            cursor.y -= LINE;
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}
