use core::fmt;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Board dimensions as `(rows, cols)`.
pub type Size2 = (Coord, Coord);

/// Position of a cell on the board, compared by value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    row: Coord,
    col: Coord,
}

impl Coordinate {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    pub const fn row(self) -> Coord {
        self.row
    }

    pub const fn col(self) -> Coord {
        self.col
    }

    /// Moves this coordinate in place, used by pointer tracking.
    pub fn set(&mut self, row: Coord, col: Coord) {
        self.row = row;
        self.col = col;
    }

    pub const fn is_within(self, (rows, cols): Size2) -> bool {
        self.row < rows && self.col < cols
    }
}

impl From<(Coord, Coord)> for Coordinate {
    fn from((row, col): (Coord, Coord)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coordinate {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.row.into(), self.col.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Up, down, left, right, then the four diagonals.
const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coordinate, delta: (isize, isize), bounds: Size2) -> Option<Coordinate> {
    let (dr, dc) = delta;
    let (rows, cols) = bounds;

    let row = coords.row.checked_add_signed(dr.try_into().ok()?)?;
    if row >= rows {
        return None;
    }

    let col = coords.col.checked_add_signed(dc.try_into().ok()?)?;
    if col >= cols {
        return None;
    }

    Some(Coordinate::new(row, col))
}

/// In-bounds neighbors of a cell, at most eight.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coordinate,
    bounds: Size2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coordinate, bounds: Size2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
