//! Core board types for Breakthrough.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Smallest legal board height.
pub const MIN_HEIGHT: usize = 6;
/// Largest legal board height.
pub const MAX_HEIGHT: usize = 16;
/// Smallest legal board width.
pub const MIN_WIDTH: usize = 4;
/// Largest legal board width.
pub const MAX_WIDTH: usize = 16;

/// A side in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Side {
    /// White pawns advance toward row 0.
    White,
    /// Black pawns advance toward row `height - 1`.
    Black,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Row a pawn of this side must reach to win on a board of the given height.
    pub fn target_row(self, height: usize) -> usize {
        match self {
            Side::White => 0,
            Side::Black => height - 1,
        }
    }

    /// Row one step forward from `row`, or `None` past the board edge.
    pub fn forward_row(self, row: usize, height: usize) -> Option<usize> {
        match self {
            Side::White => row.checked_sub(1),
            Side::Black => (row + 1 < height).then_some(row + 1),
        }
    }
}

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No pawn here.
    Empty,
    /// A pawn of the given side.
    Pawn(Side),
}

impl Cell {
    /// Converts the cell to its wire code (0 = empty, 1 = white, 2 = black).
    pub fn to_code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Pawn(Side::White) => 1,
            Cell::Pawn(Side::Black) => 2,
        }
    }

    /// Parses a wire code back into a cell. Returns `None` for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Pawn(Side::White)),
            2 => Some(Cell::Pawn(Side::Black)),
            _ => None,
        }
    }

    /// Whether this cell holds a pawn of the given side.
    pub fn holds(self, side: Side) -> bool {
        self == Cell::Pawn(side)
    }
}

/// Invalid board configuration.
#[derive(Debug, Clone, Display, Error)]
#[display("Invalid board configuration: {message}")]
pub struct ConfigError {
    /// Error message.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Rectangular grid of cells, `height × width`, row-major.
///
/// A board snapshot is never mutated once a move copies it; the engine
/// always works on a fresh clone, so earlier snapshots stay intact for
/// concurrent readers such as a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a board with the starting layout: rows 0–1 black,
    /// the bottom two rows white, everything else empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the dimensions fall outside
    /// `5 < height < 17`, `3 < width < 17`.
    #[instrument]
    pub fn new(height: usize, width: usize) -> Result<Self, ConfigError> {
        Self::check_dimensions(height, width)?;

        let mut cells = vec![Cell::Empty; height * width];
        for row in 0..height {
            let cell = if row <= 1 {
                Cell::Pawn(Side::Black)
            } else if row >= height - 2 {
                Cell::Pawn(Side::White)
            } else {
                Cell::Empty
            };
            cells[row * width..(row + 1) * width].fill(cell);
        }

        Ok(Self {
            height,
            width,
            cells,
        })
    }

    /// Builds a board from explicit rows, validating dimensions.
    ///
    /// This is the rehydration path for loaded save files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the grid is empty, ragged, or its
    /// dimensions fall outside the legal range.
    #[instrument(skip(rows))]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        Self::check_dimensions(height, width)?;

        if rows.iter().any(|row| row.len() != width) {
            return Err(ConfigError::new("rows have unequal widths"));
        }

        Ok(Self {
            height,
            width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    fn check_dimensions(height: usize, width: usize) -> Result<(), ConfigError> {
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
            return Err(ConfigError::new(format!(
                "height {height} out of range {MIN_HEIGHT}..={MAX_HEIGHT}"
            )));
        }
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(ConfigError::new(format!(
                "width {width} out of range {MIN_WIDTH}..={MAX_WIDTH}"
            )));
        }
        Ok(())
    }

    /// Board height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Board width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.height && col < self.width {
            self.cells.get(row * self.width + col).copied()
        } else {
            None
        }
    }

    /// Overwrites the cell at `(row, col)`. Coordinates must be in bounds.
    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(row < self.height && col < self.width);
        self.cells[row * self.width + col] = cell;
    }

    /// Number of pawns of the given side still on the board.
    pub fn count(&self, side: Side) -> usize {
        self.cells.iter().filter(|c| c.holds(side)).count()
    }

    /// Rows of wire codes, the shape stored in save files.
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|c| c.to_code()).collect())
            .collect()
    }
}
