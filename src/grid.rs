use std::fmt;
use std::fmt::Write;
use std::ops::Index;
use std::str::FromStr;

use thiserror::Error;

use crate::Coord;
use crate::cell::Cell;

/// Offsets of the Moore neighborhood, as `(row, column)`.
const NEIGHBORHOOD: [(i128, i128); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// What lies past the edges of a [`Grid`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Cells outside the grid are always dead, and the grid never changes shape.
    #[default]
    Bounded,

    /// Neighbors wrap around the edges, so the grid is the surface of a torus.
    Toroidal,

    /// Cells outside the grid are dead, but before each generation the grid is reframed to the
    /// live cells plus a one cell margin. Coordinates of live cells never change.
    Unbounded,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown boundary \"{0}\", expected one of bounded, toroidal or unbounded")]
pub struct UnknownBoundary(pub String);

impl FromStr for Boundary {
    type Err = UnknownBoundary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bounded" => Ok(Self::Bounded),
            "toroidal" | "torus" => Ok(Self::Toroidal),
            "unbounded" => Ok(Self::Unbounded),
            _ => Err(UnknownBoundary(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid grid dimensions: {rows} rows by {columns} columns")]
    InvalidDimensions { rows: Coord, columns: Coord },

    #[error("Cell ({row}, {column}) is out of the grid's bounds")]
    IndexOutOfBounds { row: Coord, column: Coord },
}

/// Smallest rectangle holding every live cell of a grid. All sides are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub top: Coord,
    pub bottom: Coord,
    pub left: Coord,
    pub right: Coord,
}

/// A rectangular array of cells.
///
/// Cells live in a single row-major buffer. The top-left cell sits at `origin`, which is `(0, 0)`
/// unless the grid was built with [`Grid::with_origin`], so every `(row, column)` taken or returned
/// here is a world coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: Coord,
    columns: Coord,
    origin: (Coord, Coord),
}

impl Grid {
    /// Create a grid of dead cells.
    ///
    /// Either dimension may be zero, in which case the grid holds no cells at all and every access
    /// fails. Negative dimensions are rejected.
    pub fn new(rows: Coord, columns: Coord) -> Result<Self, GridError> {
        Self::with_origin(rows, columns, (0, 0))
    }

    /// Like [`Grid::new`], but the top-left cell is at `origin` instead of `(0, 0)`.
    ///
    /// Dimensions whose product cannot be allocated fail with [`GridError::InvalidDimensions`].
    pub fn with_origin(
        rows: Coord,
        columns: Coord,
        origin: (Coord, Coord),
    ) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimensions { rows, columns };

        let (Ok(r), Ok(c)) = (usize::try_from(rows), usize::try_from(columns)) else {
            return Err(invalid);
        };

        let Some(len) = r.checked_mul(c) else {
            return Err(invalid);
        };

        // The far edges must stay addressable
        if origin.0.checked_add(rows).is_none() || origin.1.checked_add(columns).is_none() {
            return Err(invalid);
        }

        // Fails on lengths past `isize::MAX` bytes as well as on allocation failure
        let mut cells = Vec::new();
        if cells.try_reserve_exact(len).is_err() {
            return Err(invalid);
        }
        cells.resize(len, Cell::dead());

        Ok(Self {
            cells,
            rows,
            columns,
            origin,
        })
    }

    pub fn row_count(&self) -> Coord {
        self.rows
    }

    pub fn column_count(&self) -> Coord {
        self.columns
    }

    /// World coordinate of the top-left cell.
    pub fn origin(&self) -> (Coord, Coord) {
        self.origin
    }

    /// Whether the grid holds no cells, i.e. one of its dimensions is zero.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, row: Coord, column: Coord) -> bool {
        self.index_of(row, column).is_some()
    }

    pub fn get(&self, row: Coord, column: Coord) -> Option<Cell> {
        self.index_of(row, column).map(|i| self.cells[i])
    }

    /// Whether the cell is alive. Anything outside the grid is dead.
    pub fn is_alive(&self, row: Coord, column: Coord) -> bool {
        self.get(row, column).is_some_and(|cell| cell.is_alive())
    }

    /// Flip the cell at `(row, column)`.
    pub fn toggle(&mut self, row: Coord, column: Coord) -> Result<(), GridError> {
        let i = self
            .index_of(row, column)
            .ok_or(GridError::IndexOutOfBounds { row, column })?;

        self.cells[i].toggle();

        Ok(())
    }

    pub fn set(&mut self, row: Coord, column: Coord, alive: bool) -> Result<(), GridError> {
        let i = self
            .index_of(row, column)
            .ok_or(GridError::IndexOutOfBounds { row, column })?;

        self.cells[i] = Cell::new(alive);

        Ok(())
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Count the live cells in the Moore neighborhood of `(row, column)`.
    ///
    /// With [`Boundary::Toroidal`] positions past an edge wrap around to the opposite side. Any other
    /// boundary treats them as dead.
    pub fn live_neighbors(&self, row: Coord, column: Coord, boundary: Boundary) -> u8 {
        let r = i128::from(row) - i128::from(self.origin.0);
        let c = i128::from(column) - i128::from(self.origin.1);

        let mut n = 0;
        for (dr, dc) in NEIGHBORHOOD {
            if self.is_alive_local(r + dr, c + dc, boundary) {
                n += 1;
            }
        }

        n
    }

    /// Every position of the grid, in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (Coord, Coord)> + use<> {
        let (top, left) = self.origin;
        let (rows, columns) = (self.rows, self.columns);

        (top..top + rows).flat_map(move |row| (left..left + columns).map(move |column| (row, column)))
    }

    /// Positions of the live cells, in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_alive())
            .map(|(i, _)| self.position(i))
    }

    /// Bounding box of the live cells, `None` if everything is dead.
    pub fn live_bounds(&self) -> Option<Bounds> {
        self.live_cells().fold(None, |bounds, (row, column)| {
            let b = bounds.unwrap_or(Bounds {
                top: row,
                bottom: row,
                left: column,
                right: column,
            });

            Some(Bounds {
                top: b.top.min(row),
                bottom: b.bottom.max(row),
                left: b.left.min(column),
                right: b.right.max(column),
            })
        })
    }

    /// Copy the live cells into a grid of a new shape. Cells falling outside of it are dropped.
    pub fn resized(
        &self,
        rows: Coord,
        columns: Coord,
        origin: (Coord, Coord),
    ) -> Result<Self, GridError> {
        let mut grid = Self::with_origin(rows, columns, origin)?;

        for (row, column) in self.live_cells() {
            if let Some(i) = grid.index_of(row, column) {
                grid.cells[i] = Cell::alive();
            }
        }

        Ok(grid)
    }

    /// A grid of the same shape and origin, with every cell dead.
    pub(crate) fn cleared(&self) -> Self {
        Self {
            cells: vec![Cell::dead(); self.cells.len()],
            rows: self.rows,
            columns: self.columns,
            origin: self.origin,
        }
    }

    /// Cells in the same order as [`Grid::positions`].
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    fn position(&self, i: usize) -> (Coord, Coord) {
        // Only called with indices of existing cells, so `columns > 0`
        let columns = self.columns as usize;

        (
            self.origin.0 + (i / columns) as Coord,
            self.origin.1 + (i % columns) as Coord,
        )
    }

    fn index_of(&self, row: Coord, column: Coord) -> Option<usize> {
        let r = i128::from(row) - i128::from(self.origin.0);
        let c = i128::from(column) - i128::from(self.origin.1);

        self.local_index(r, c)
    }

    fn local_index(&self, r: i128, c: i128) -> Option<usize> {
        let (rows, columns) = (i128::from(self.rows), i128::from(self.columns));

        if !(0..rows).contains(&r) || !(0..columns).contains(&c) {
            return None;
        }

        // Fits, since `rows * columns` was checked against `usize` on construction
        Some((r * columns + c) as usize)
    }

    fn is_alive_local(&self, r: i128, c: i128, boundary: Boundary) -> bool {
        let (r, c) = match boundary {
            Boundary::Toroidal if !self.is_empty() => (
                r.rem_euclid(i128::from(self.rows)),
                c.rem_euclid(i128::from(self.columns)),
            ),
            _ => (r, c),
        };

        self.local_index(r, c)
            .is_some_and(|i| self.cells[i].is_alive())
    }
}

impl Index<(Coord, Coord)> for Grid {
    type Output = Cell;

    /// Panics if `(row, column)` lies outside of the grid, like slice indexing.
    fn index(&self, (row, column): (Coord, Coord)) -> &Self::Output {
        let Some(i) = self.index_of(row, column) else {
            panic!(
                "cell ({row}, {column}) is outside of the {}x{} grid at {:?}",
                self.rows, self.columns, self.origin
            )
        };

        &self.cells[i]
    }
}

/// Plaintext rendering: one line per row, `O` for live cells and `.` for dead ones.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns == 0 {
            return Ok(());
        }

        for row in self.cells.chunks(self.columns as usize) {
            for cell in row {
                f.write_char(if cell.is_alive() { 'O' } else { '.' })?;
            }

            f.write_char('\n')?;
        }

        Ok(())
    }
}
