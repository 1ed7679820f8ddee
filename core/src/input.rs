use serde::{Deserialize, Serialize};

use crate::*;

/// Screen placement of the board, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub origin_x: f32,
    pub origin_y: f32,
    pub tile_size: f32,
}

impl BoardLayout {
    pub const fn new(origin_x: f32, origin_y: f32, tile_size: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            tile_size,
        }
    }

    /// Centers `cols` tiles horizontally and leaves two rows of tiles above the board for the HUD.
    pub fn centered(screen_width: f32, cols: Coord, tile_size: f32) -> Self {
        let board_width = f32::from(cols) * tile_size;
        Self::new((screen_width - board_width) / 2.0, tile_size * 2.0, tile_size)
    }

    /// Maps a pixel position to the cell under it, `None` when it falls outside the board.
    pub fn tap_verify(&self, x: f32, y: f32, size: Size2) -> Option<Coordinate> {
        let row = self.axis_index(y - self.origin_y, size.0);
        let col = self.axis_index(x - self.origin_x, size.1);
        match (row, col) {
            (Some(row), Some(col)) => Some(Coordinate::new(row, col)),
            _ => {
                log::trace!("Tap outside the board at ({}, {})", x, y);
                None
            }
        }
    }

    /// Top-left pixel of a cell, as `(x, y)`.
    pub fn cell_origin(&self, coords: Coordinate) -> (f32, f32) {
        (
            self.origin_x + f32::from(coords.col()) * self.tile_size,
            self.origin_y + f32::from(coords.row()) * self.tile_size,
        )
    }

    fn axis_index(&self, offset: f32, len: Coord) -> Option<Coord> {
        if offset.is_nan() || offset < 0.0 || self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return None;
        }
        // truncation is floor for non-negative values
        let index = (offset / self.tile_size) as u32;
        if index < u32::from(len) {
            Some(index as Coord)
        } else {
            None
        }
    }
}

/// How a finished press is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tap {
    Click,
    Hold,
}

/// Follows one pointer from press to release: times the press and remembers the cell under it.
#[derive(Clone, Debug)]
pub struct PointerTracker<K: Clock = SystemClock> {
    timer: InteractionTimer<K>,
    tracked: Option<Coordinate>,
}

impl<K: Clock> PointerTracker<K> {
    pub fn new(timer: InteractionTimer<K>) -> Self {
        Self {
            timer,
            tracked: None,
        }
    }

    pub fn tracked(&self) -> Option<Coordinate> {
        self.tracked
    }

    pub fn press(&mut self, coords: Coordinate) {
        self.tracked = Some(coords);
        self.timer.start();
    }

    /// Ends the tracked press. `None` when nothing was pressed, so there is no press time to classify.
    pub fn release(&mut self) -> Option<Tap> {
        self.tracked.take()?;
        self.timer.end();
        if self.timer.is_hold() {
            Some(Tap::Hold)
        } else {
            Some(Tap::Click)
        }
    }

    /// Follows the pointer into `coords`, returning the cell it just left, if any.
    pub fn drag(&mut self, coords: Coordinate) -> Option<Coordinate> {
        let tracked = self.tracked.as_mut()?;
        self.timer.end();
        if *tracked == coords {
            return None;
        }
        let left = *tracked;
        tracked.set(coords.row(), coords.col());
        Some(left)
    }
}
