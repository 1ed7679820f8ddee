use serde::{Deserialize, Serialize};

/// Initial values for a [`Tile`], everything off by default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileOptions {
    pub mine: bool,
    pub hover: bool,
    pub flagged: bool,
    pub revealed: bool,
    pub adjacent: u8,
}

/// State of a single board cell.
///
/// Reveal is one-way: nothing in this type can hide a tile again. The
/// adjacency count is written while the board is generated and read only
/// afterwards; on mine tiles it carries no meaning.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    mine: bool,
    hover: bool,
    flagged: bool,
    revealed: bool,
    adjacent: u8,
}

impl Tile {
    pub const fn new(options: TileOptions) -> Self {
        let TileOptions {
            mine,
            hover,
            flagged,
            revealed,
            adjacent,
        } = options;
        Self {
            mine,
            hover,
            flagged,
            revealed,
            adjacent,
        }
    }

    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    pub const fn is_hovered(&self) -> bool {
        self.hover
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent
    }

    pub(crate) fn activate_mine(&mut self) {
        self.mine = true;
    }

    pub fn set_hover(&mut self) {
        self.hover = true;
    }

    pub fn unset_hover(&mut self) {
        self.hover = false;
    }

    pub fn set_revealed(&mut self) {
        self.revealed = true;
    }

    /// Returns the new flag state.
    pub fn toggle_flag(&mut self) -> bool {
        self.flagged = !self.flagged;
        self.flagged
    }

    pub(crate) fn add_adjacent_mine(&mut self) {
        self.adjacent = self.adjacent.saturating_add(1);
    }
}

impl From<TileOptions> for Tile {
    fn from(options: TileOptions) -> Self {
        Self::new(options)
    }
}
