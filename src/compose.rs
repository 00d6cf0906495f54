//! Frame composition: section pixels onto a page canvas, then the canvas and
//! section text into terminal cells.

use crate::color::Color;
use crate::config::PageSettings;
use crate::scroll::Viewport;
use crate::text::TextSplitter;
use crate::viewer::SectionViewer;

/// Width of one terminal cell in CSS px
pub const CELL_WIDTH_PX: f64 = 8.0;
/// Height of one terminal cell in CSS px
pub const CELL_HEIGHT_PX: f64 = 16.0;
/// Device pixels per CSS px when each cell holds two stacked pixels
pub const CELL_PIXEL_RATIO: f64 = 1.0 / CELL_WIDTH_PX;
/// Glyph drawn in a cell whose foreground is the top pixel
pub const UPPER_HALF_BLOCK: &str = "▀";

const MARGIN_X_PX: f64 = 32.0;
const HEADING_TOP_PX: f64 = 32.0;
const DESCRIPTION_TOP: f64 = 0.65;
const DESCRIPTION_WIDTH: f64 = 0.4;
const SPECS_LEFT: f64 = 0.6;
const SPECS_TOP: f64 = 0.55;
const SPEC_SPACING_PX: f64 = 24.0;
const SPEC_BULLET: &str = "• ";
/// Text fainter than this is not drawn
const MIN_OPACITY: f64 = 0.02;

/// Opaque page-sized pixel buffer in device pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![background; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Flat RGBA bytes, row by row
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect()
    }
}

/// Draws one section at `top_css` px below the viewport top: background
/// disc, then the model surface over it.
pub fn compose_section(canvas: &mut Canvas, viewer: &SectionViewer, page: &PageSettings, top_css: f64) {
    let surface = viewer.surface();
    let ratio = surface.pixel_ratio();
    let top = (top_css * ratio).round() as isize;

    let background = &viewer.presentation().background;
    let radius = page.bg_radius_px * background.scale * ratio;
    let radius_sq = radius * radius;
    let center_x = surface.width() as f64 / 2.0;
    let center_y = surface.height() as f64 / 2.0;

    for sy in 0..surface.height() {
        let y = top + sy as isize;
        if y < 0 || y as usize >= canvas.height {
            continue;
        }
        let dy = sy as f64 + 0.5 - center_y;
        let row = y as usize * canvas.width;

        for sx in 0..surface.width().min(canvas.width) {
            let dx = sx as f64 + 0.5 - center_x;
            let mut color = page.background;
            if dx * dx + dy * dy <= radius_sq {
                color = background.color.over(color);
            }
            color = surface.pixel(sx, sy).over(color);
            canvas.pixels[row + sx] = color;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub symbol: String,
    pub fg: Color,
    pub bg: Color,
}

/// Grid of terminal cells ready to be presented
#[derive(Debug, Clone, PartialEq)]
pub struct CellFrame {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl CellFrame {
    /// Packs two canvas rows into each cell row with upper half-blocks
    pub fn from_canvas(canvas: &Canvas) -> Self {
        let cols = canvas.width;
        let rows = canvas.height.div_ceil(2);
        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let top = canvas.pixel(col, row * 2);
                let bottom = if row * 2 + 1 < canvas.height {
                    canvas.pixel(col, row * 2 + 1)
                } else {
                    top
                };
                cells.push(Cell {
                    symbol: UPPER_HALF_BLOCK.to_string(),
                    fg: top,
                    bg: bottom,
                });
            }
        }
        CellFrame { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, col: usize, row: usize) -> &Cell {
        &self.cells[row * self.cols + col]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Writes one grapheme into a cell, blending the text color over the
    /// cell's averaged pixels by `opacity`. Out-of-range positions are
    /// ignored.
    pub fn put_symbol(&mut self, col: isize, row: isize, symbol: &str, color: Color, opacity: f64) {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return;
        }
        if opacity < MIN_OPACITY {
            return;
        }
        let cell = &mut self.cells[row as usize * self.cols + col as usize];
        let bg = if cell.symbol == UPPER_HALF_BLOCK {
            cell.fg.lerp(cell.bg, 0.5)
        } else {
            cell.bg
        };
        cell.symbol = symbol.to_string();
        cell.fg = bg.lerp(color, opacity.min(1.0));
        cell.bg = bg;
    }

    /// Replaces a cell with a blank of solid `color`
    pub fn fill(&mut self, col: usize, row: usize, color: Color) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        self.cells[row * self.cols + col] = Cell {
            symbol: " ".to_string(),
            fg: color,
            bg: color,
        };
    }

    /// Writes `text` from `col` onwards, one cell per grapheme
    pub fn put_text(
        &mut self,
        col: isize,
        row: isize,
        text: &str,
        splitter: &dyn TextSplitter,
        color: Color,
        opacity: f64,
    ) {
        let mut offset = 0;
        for word in text.split(' ') {
            for symbol in splitter.chars(word) {
                self.put_symbol(col + offset, row, &symbol, color, opacity);
                offset += 1;
            }
            offset += 1;
        }
    }
}

fn to_col(x_css: f64) -> isize {
    (x_css / CELL_WIDTH_PX).round() as isize
}

fn to_row(y_css: f64) -> isize {
    (y_css / CELL_HEIGHT_PX).round() as isize
}

/// Draws a section's heading, description and list items at their current
/// animated offsets and opacities
pub fn compose_text(
    frame: &mut CellFrame,
    viewer: &SectionViewer,
    viewport: &Viewport,
    top_css: f64,
    color: Color,
    splitter: &dyn TextSplitter,
) {
    let presentation = viewer.presentation();

    let heading_col = to_col(MARGIN_X_PX);
    for ((symbol, column), style) in viewer
        .heading_chars()
        .iter()
        .zip(viewer.heading_columns())
        .zip(&presentation.heading)
    {
        let row = to_row(top_css + HEADING_TOP_PX + style.y);
        frame.put_symbol(heading_col + *column as isize, row, symbol, color, style.opacity);
    }

    let content = viewer.content();
    let description = &presentation.description;
    let width = ((viewport.width * DESCRIPTION_WIDTH) / CELL_WIDTH_PX).floor().max(1.0) as usize;
    let description_top = top_css + viewport.height * DESCRIPTION_TOP + description.y;
    for (i, line) in splitter.lines(&content.description, width).iter().enumerate() {
        let row = to_row(description_top + i as f64 * CELL_HEIGHT_PX);
        frame.put_text(heading_col, row, line, splitter, color, description.opacity);
    }

    let specs_col = to_col(viewport.width * SPECS_LEFT);
    let specs_top = top_css + viewport.height * SPECS_TOP;
    for (i, (item, style)) in content.specs.iter().zip(&presentation.specs).enumerate() {
        let row = to_row(specs_top + i as f64 * SPEC_SPACING_PX + style.y);
        let line = format!("{SPEC_BULLET}{item}");
        frame.put_text(specs_col, row, &line, splitter, color, style.opacity);
    }
}

/// Writes overlay lines at the top-left corner on an opaque `backing`
/// padded by one cell on each side
pub fn compose_overlay(
    frame: &mut CellFrame,
    lines: &[String],
    color: Color,
    backing: Color,
    splitter: &dyn TextSplitter,
) {
    for (row, line) in lines.iter().enumerate() {
        let width: usize = line.split(' ').map(|word| splitter.chars(word).len() + 1).sum();
        for col in 0..=width {
            frame.fill(col, row, backing);
        }
        frame.put_text(1, row as isize, line, splitter, color, 1.0);
    }
}
