// Tabular PDF export on top of printpdf.
//
// A summary table is first laid out as plain drawing ops per page: A4
// landscape, a centered title on the first page, a header band repeated on
// every page, then 10 mm bordered rows until the bottom margin forces a page
// break. Geometry is in millimetres from the top-left corner. The ops are
// then replayed onto a printpdf document with the built-in Helvetica font,
// flipping y to PDF's bottom-left origin.
use crate::config::pdf_column_width;
use crate::error::{ReportError, Result};
use crate::export::TabularRow;
use printpdf::{
    path::{PaintMode, WindingOrder},
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference,
    Point, Polygon,
};
use std::ops::Range;

const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 10.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const TITLE_HEIGHT_MM: f32 = 10.0;
const HEADER_LINE_MM: f32 = 5.0;
const ROW_HEIGHT_MM: f32 = 10.0;
const FONT_SIZE_PT: f32 = 8.0;
const CELL_PADDING_MM: f32 = 1.0;
const HEADER_FILL: f32 = 0.86;
const MM_PER_PT: f32 = 25.4 / 72.0;

// Helvetica advance widths (AFM, 1/1000 em) for ' '..='~'.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];
const FALLBACK_WIDTH: u16 = 556;

fn glyph_width_mm(c: char) -> f32 {
    let units = match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - ' ' as usize],
        _ => FALLBACK_WIDTH,
    };
    units as f32 / 1000.0 * FONT_SIZE_PT * MM_PER_PT
}

fn text_width_mm(text: &str) -> f32 {
    text.chars().map(glyph_width_mm).sum()
}

fn inner_width(cell: f32) -> f32 {
    cell - 2.0 * CELL_PADDING_MM
}

/// Cut `text` so it fits inside `width` millimetres of cell.
fn fit_text(text: &str, width: f32) -> String {
    let limit = inner_width(width);
    let mut used = 0.0;
    text.chars()
        .take_while(|c| {
            used += glyph_width_mm(*c);
            used <= limit
        })
        .collect()
}

/// Wrap one header word to the cell width, breaking after `_` where
/// possible and mid-word otherwise. No characters are dropped.
fn wrap_word(word: &str, width: f32) -> Vec<String> {
    let limit = inner_width(width);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0;
    // Byte length of `line` through its last underscore.
    let mut last_break: Option<usize> = None;

    for c in word.chars() {
        let w = glyph_width_mm(c);
        while line_width + w > limit && !line.is_empty() {
            let rest = match last_break.take() {
                Some(at) => line.split_off(at),
                None => String::new(),
            };
            lines.push(std::mem::replace(&mut line, rest));
            line_width = text_width_mm(&line);
        }
        line.push(c);
        line_width += w;
        if c == '_' {
            last_break = Some(line.len());
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Header text split on spaces, each part wrapped to the cell.
fn header_lines(header: &str, width: f32) -> Vec<String> {
    header
        .split(' ')
        .filter(|part| !part.is_empty())
        .flat_map(|part| wrap_word(part, width))
        .collect()
}

/// Helvetica here is WinAnsi encoded; anything outside Latin-1 prints as `?`.
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c } else { '?' })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        filled: bool,
    },
    /// Text whose vertical centre sits at `mid_y`.
    Text { x: f32, mid_y: f32, text: String },
}

#[derive(Debug, Default)]
struct PageLayout {
    ops: Vec<Op>,
}

impl PageLayout {
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, filled: bool) {
        self.ops.push(Op::Rect { x, y, w, h, filled });
    }

    fn text(&mut self, x: f32, mid_y: f32, text: &str) {
        self.ops.push(Op::Text {
            x,
            mid_y,
            text: text.to_string(),
        });
    }

    fn centered_text(&mut self, x: f32, w: f32, mid_y: f32, text: &str) {
        let offset = ((w - text_width_mm(text)) / 2.0).max(CELL_PADDING_MM);
        self.text(x + offset, mid_y, text);
    }

    #[cfg(test)]
    fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text { text, .. } => Some(text.as_str()),
            Op::Rect { .. } => None,
        })
    }
}

struct Grid {
    widths: Vec<f32>,
    header_lines: Vec<Vec<String>>,
    header_height: f32,
}

impl Grid {
    fn new(headers: &[&str]) -> Self {
        let widths: Vec<f32> = headers.iter().map(|h| pdf_column_width(h)).collect();
        let header_lines: Vec<Vec<String>> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| header_lines(h, *w))
            .collect();
        let max_lines = header_lines.iter().map(Vec::len).max().unwrap_or(1).max(1);
        Self {
            widths,
            header_lines,
            header_height: max_lines as f32 * HEADER_LINE_MM,
        }
    }

    fn draw_header(&self, page: &mut PageLayout, y: f32) {
        let mut x = MARGIN_MM;
        for (w, lines) in self.widths.iter().zip(&self.header_lines) {
            page.rect(x, y, *w, self.header_height, true);
            let block = lines.len() as f32 * HEADER_LINE_MM;
            let top = y + (self.header_height - block) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let mid = top + (i as f32 + 0.5) * HEADER_LINE_MM;
                page.centered_text(x, *w, mid, line);
            }
            x += w;
        }
    }

    fn draw_row(&self, page: &mut PageLayout, y: f32, cells: &[String]) {
        let mut x = MARGIN_MM;
        for (i, w) in self.widths.iter().enumerate() {
            page.rect(x, y, *w, ROW_HEIGHT_MM, false);
            if let Some(text) = cells.get(i) {
                page.text(
                    x + CELL_PADDING_MM,
                    y + ROW_HEIGHT_MM / 2.0,
                    &fit_text(text, *w),
                );
            }
            x += w;
        }
    }
}

/// Split `rows` data rows into per-page index ranges.
fn paginate(rows: usize, header_height: f32) -> Vec<Range<usize>> {
    let usable = PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM;
    let per_page = |top: f32| -> usize {
        (((usable - top - header_height) / ROW_HEIGHT_MM).floor() as usize).max(1)
    };
    let first = per_page(MARGIN_MM + TITLE_HEIGHT_MM);
    let rest = per_page(MARGIN_MM);

    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = first;
    loop {
        let end = (start + capacity).min(rows);
        pages.push(start..end);
        if end >= rows {
            break;
        }
        start = end;
        capacity = rest;
    }
    pages
}

fn layout<T: TabularRow>(rows: &[T], title: &str) -> Vec<PageLayout> {
    let grid = Grid::new(T::HEADERS);
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.cells().iter().map(|c| latin1(&c.to_string())).collect())
        .collect();

    let mut pages = Vec::new();
    for (n, range) in paginate(body.len(), grid.header_height).into_iter().enumerate() {
        let mut page = PageLayout::default();
        let mut y = MARGIN_MM;
        if n == 0 {
            page.centered_text(
                MARGIN_MM,
                PAGE_WIDTH_MM - 2.0 * MARGIN_MM,
                y + TITLE_HEIGHT_MM / 2.0,
                &latin1(title),
            );
            y += TITLE_HEIGHT_MM;
        }
        grid.draw_header(&mut page, y);
        y += grid.header_height;
        for cells in &body[range] {
            grid.draw_row(&mut page, y, cells);
            y += ROW_HEIGHT_MM;
        }
        pages.push(page);
    }
    pages
}

fn pdf_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(e.to_string())
}

fn mm(v: f32) -> Mm {
    Mm(v.into())
}

// Closed ring of a rectangle given by its top-left corner.
fn corners(x: f32, y: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
    let top = PAGE_HEIGHT_MM - y;
    let bottom = top - h;
    vec![
        (Point::new(mm(x), mm(bottom)), false),
        (Point::new(mm(x + w), mm(bottom)), false),
        (Point::new(mm(x + w), mm(top)), false),
        (Point::new(mm(x), mm(top)), false),
    ]
}

fn black() -> Color {
    Color::Greyscale(Greyscale::new(0.0, None))
}

fn draw(layer: &PdfLayerReference, font: &IndirectFontRef, page: &PageLayout) {
    layer.set_outline_thickness(0.5);
    layer.set_outline_color(black());
    for op in &page.ops {
        match op {
            Op::Rect { x, y, w, h, filled } => {
                let ring = corners(*x, *y, *w, *h);
                if *filled {
                    layer.set_fill_color(Color::Greyscale(Greyscale::new(HEADER_FILL.into(), None)));
                    layer.add_polygon(Polygon {
                        rings: vec![ring],
                        mode: PaintMode::FillStroke,
                        winding_order: WindingOrder::NonZero,
                    });
                } else {
                    layer.add_line(Line {
                        points: ring,
                        is_closed: true,
                    });
                }
            }
            Op::Text { x, mid_y, text } => {
                let baseline = mid_y + FONT_SIZE_PT * 0.35 * MM_PER_PT;
                layer.set_fill_color(black());
                layer.use_text(
                    text.as_str(),
                    FONT_SIZE_PT.into(),
                    mm(*x),
                    mm(PAGE_HEIGHT_MM - baseline),
                    font,
                );
            }
        }
    }
}

/// Render a summary table as paginated PDF bytes.
pub fn to_pdf<T: TabularRow>(rows: &[T], title: &str) -> Result<Vec<u8>> {
    let pages = layout(rows, title);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Table");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

    {
        let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
        for _ in 1..pages.len() {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Table");
            layers.push(doc.get_page(page).get_layer(layer));
        }
        for (layer, page) in layers.iter().zip(&pages) {
            draw(layer, &font, page);
        }
    }
    doc.save_to_bytes().map_err(pdf_error)
}
