use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

use coordrill::board::{CoordinateBoard, GridPos};

const LIGHT_SQUARE: Color = Color::Rgb(240, 217, 181);
const DARK_SQUARE: Color = Color::Rgb(181, 136, 99);
const CURSOR_SQUARE: Color = Color::Rgb(106, 159, 181);

/// Terminal cells covered by each board square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    pub x: u16,
    pub y: u16,
    pub cell_width: u16,
    pub cell_height: u16,
    pub size: usize,
    /// Area the board was fitted into; squares spilling past it are not drawn
    pub bounds: Rect,
}

impl BoardGeometry {
    /// Largest board that fits `area`, centred. Terminal cells are about
    /// twice as tall as wide, so squares are two columns per row.
    pub fn fit(area: Rect, size: usize) -> Self {
        let n = size.max(1) as u16;
        let cell_height = (area.height / n).min(area.width / (2 * n)).max(1);
        let cell_width = cell_height * 2;

        let x = area.x + area.width.saturating_sub(cell_width * n) / 2;
        let y = area.y + area.height.saturating_sub(cell_height * n) / 2;

        Self {
            x,
            y,
            cell_width,
            cell_height,
            size,
            bounds: area,
        }
    }

    pub fn cell_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            self.x + col as u16 * self.cell_width,
            self.y + row as u16 * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }

    /// Grid square under a terminal cell, if any. Cells outside `bounds`
    /// never map to a square, even when a clipped square would cover them.
    pub fn cell_at(&self, column: u16, row: u16) -> Option<GridPos> {
        if !self.bounds.contains(Position::new(column, row)) {
            return None;
        }
        if column < self.x || row < self.y {
            return None;
        }
        let col = ((column - self.x) / self.cell_width) as usize;
        let grid_row = ((row - self.y) / self.cell_height) as usize;
        if col >= self.size || grid_row >= self.size {
            return None;
        }
        Some(GridPos::new(col, grid_row))
    }
}

/// Draws the squares. The target is never highlighted.
pub struct BoardView<'a> {
    pub board: &'a CoordinateBoard,
    pub geometry: BoardGeometry,
    pub show_coordinates: bool,
    pub cursor: Option<GridPos>,
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let size = self.board.size();
        for row in 0..size {
            for col in 0..size {
                let cell = self.geometry.cell_rect(col, row).intersection(area);
                if cell.is_empty() {
                    continue;
                }

                let light = (col + row) % 2 == 0;
                let bg = if self.cursor == Some(GridPos::new(col, row)) {
                    CURSOR_SQUARE
                } else if light {
                    LIGHT_SQUARE
                } else {
                    DARK_SQUARE
                };
                let fg = if light { DARK_SQUARE } else { LIGHT_SQUARE };
                buf.set_style(cell, Style::default().bg(bg).fg(fg));

                if self.show_coordinates {
                    let label_row = Rect {
                        y: cell.y + cell.height / 2,
                        height: 1,
                        ..cell
                    };
                    Paragraph::new(self.board.coordinate_to_notation(col, row))
                        .style(Style::default().bg(bg).fg(fg))
                        .alignment(Alignment::Center)
                        .render(label_row, buf);
                }
            }
        }
    }
}
