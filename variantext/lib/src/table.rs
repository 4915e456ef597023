//! Side-by-side comparison of variants.
//!
//! Columns are the sorted labels. Each segment becomes one cell covering the
//! columns it applies to:
//!
//! - common segments span every column,
//! - exclusive segments span only their own column,
//! - other segments span `[index(label), index(next_label))`, running to the
//!   last column when the run stays open.
//!
//! Cells are packed greedily left to right. A segment whose first column lies
//! left of the running cursor starts a new row; gaps inside a row become empty
//! spacer cells.
//!
//! ## Examples
//!
//! ```
//! use variantext::content::{Block, BlockKind, ContentRoot};
//! use variantext::segmenter::segment;
//! use variantext::table::ComparisonTable;
//!
//! let root = ContentRoot::from_blocks([
//!     Block::new(BlockKind::P, "##A first ##B second"),
//! ]);
//! let segmentation = segment(&root);
//! let table = ComparisonTable::new(&segmentation);
//!
//! assert_eq!(table.rows().len(), 1);
//! assert_eq!(table.rows()[0][0].span, 1);
//! assert_eq!(table.rows()[0][1].span, 1);
//! ```

use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets};
use html_escape::encode_double_quoted_attribute;

use crate::content::plain_text;
use crate::segmenter::{Segment, Segmentation};

/// One cell of a comparison row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell<'a> {
    /// First column covered.
    pub start: usize,
    /// Number of columns covered.
    pub span: usize,
    /// The segment shown, or `None` for a spacer.
    pub segment: Option<&'a Segment>,
}

/// A comparison table laid out from a segmentation.
#[derive(Debug, Clone)]
pub struct ComparisonTable<'a> {
    segmentation: &'a Segmentation,
    width: usize,
    rows: Vec<Vec<TableCell<'a>>>,
}

impl<'a> ComparisonTable<'a> {
    /// Lays out every segment of `segmentation`.
    #[tracing::instrument(skip_all, fields(segments = segmentation.len()))]
    pub fn new(segmentation: &'a Segmentation) -> Self {
        let width = segmentation.labels().len().max(1);
        let mut rows = Vec::new();
        let mut row: Vec<TableCell<'a>> = Vec::new();
        let mut cursor = 0;

        for segment in segmentation.segments() {
            let (start, end) = column_range(segmentation, segment, width);

            if start < cursor {
                finish_row(&mut rows, std::mem::take(&mut row), cursor, width);
                cursor = 0;
            }
            if start > cursor {
                row.push(TableCell {
                    start: cursor,
                    span: start - cursor,
                    segment: None,
                });
            }
            row.push(TableCell {
                start,
                span: end - start,
                segment: Some(segment),
            });
            cursor = end;
        }
        if !row.is_empty() {
            finish_row(&mut rows, row, cursor, width);
        }

        tracing::debug!(rows = rows.len(), columns = width, "Built comparison table");
        Self {
            segmentation,
            width,
            rows,
        }
    }

    pub fn rows(&self) -> &[Vec<TableCell<'a>>] {
        &self.rows
    }

    /// Number of columns; at least one even without labels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Column captions, the sorted labels.
    pub fn headers(&self) -> Vec<String> {
        let labels = self.segmentation.labels();
        if labels.is_empty() {
            return vec!["All".to_string()];
        }
        labels.iter().map(|label| label.to_string()).collect()
    }

    /// Renders the table as HTML, using `colspan` for spanning cells.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"variant-table\">\n<thead><tr>");
        for header in self.headers() {
            html.push_str(&format!("<th>{}</th>", html_escape::encode_text(&header)));
        }
        html.push_str("</tr></thead>\n<tbody>\n");

        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                let colspan = if cell.span > 1 {
                    format!(" colspan=\"{}\"", cell.span)
                } else {
                    String::new()
                };
                match cell.segment {
                    Some(segment) => html.push_str(&format!(
                        "<td{colspan} data-variant=\"{}\">{}</td>",
                        encode_double_quoted_attribute(segment.label.as_str()),
                        segment.content
                    )),
                    None => html.push_str(&format!("<td{colspan}></td>")),
                }
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</tbody>\n</table>");
        html
    }

    /// Renders the table for a terminal.
    ///
    /// comfy-table has no column spans, so a spanning cell shows its text in
    /// its first column and leaves the rest of the span blank.
    pub fn to_terminal(&self, max_width: Option<u16>) -> String {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = max_width {
            table.set_width(width);
        }

        table.set_header(
            self.headers()
                .into_iter()
                .map(|header| Cell::new(header).add_attribute(Attribute::Bold)),
        );

        for row in &self.rows {
            let mut cells = Vec::with_capacity(self.width);
            for cell in row {
                let text = cell
                    .segment
                    .map(|segment| plain_text(&segment.content))
                    .unwrap_or_default();
                cells.push(Cell::new(text));
                cells.extend((1..cell.span).map(|_| Cell::new("")));
            }
            table.add_row(cells);
        }

        table.to_string()
    }
}

/// Columns `[start, end)` covered by `segment`; never empty.
fn column_range(segmentation: &Segmentation, segment: &Segment, width: usize) -> (usize, usize) {
    let labels = segmentation.labels();
    let Some(start) = labels.index_of(&segment.label) else {
        return (0, width);
    };
    if segment.exclusive {
        return (start, start + 1);
    }
    let end = segment
        .next_label
        .as_ref()
        .and_then(|next| labels.index_of(next))
        .unwrap_or(width);
    (start, end.max(start + 1))
}

/// Pads the row's trailing gap and appends it.
fn finish_row<'a>(
    rows: &mut Vec<Vec<TableCell<'a>>>,
    mut row: Vec<TableCell<'a>>,
    cursor: usize,
    width: usize,
) {
    if cursor < width {
        row.push(TableCell {
            start: cursor,
            span: width - cursor,
            segment: None,
        });
    }
    rows.push(row);
}
