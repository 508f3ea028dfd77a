use std::fmt;

use super::error::GameError;
use super::types::{Marker, Position};

/// Character grid loaded from a map. Rows keep their own length, so a ragged
/// map has a ragged board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Vec<Marker>>,
}

impl Board {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, GameError> {
        if lines.is_empty() {
            return Err(GameError::EmptyMap);
        }

        let rows = lines
            .iter()
            .map(|line| line.as_ref().chars().map(Marker::from_char).collect())
            .collect();

        Ok(Self { rows })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first map line, which is the nominal board width.
    pub fn width(&self) -> usize {
        self.row_width(0).unwrap_or(0)
    }

    pub fn row_width(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Vec::len)
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        self.row_width(pos.row).is_some_and(|width| pos.col < width)
    }

    pub fn cell_at(&self, pos: Position) -> Option<Marker> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    /// Writes without any rule checks; out-of-bounds writes are ignored.
    pub fn set_cell(&mut self, pos: Position, marker: Marker) {
        if let Some(cell) = self.rows.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            *cell = marker;
        }
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Marker)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &marker)| (Position::new(row, col), marker))
        })
    }

    pub fn count(&self, marker: Marker) -> usize {
        self.cells().filter(|&(_, m)| m == marker).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(Marker::to_string).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
