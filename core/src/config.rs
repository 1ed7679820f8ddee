use alloc::string::ToString;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// `(rows, cols)`
    pub size: Size2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Size2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Size2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// A board needs at least one cell and at least one cell without a mine.
    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::InvalidSize);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines {
                requested: self.mines,
                cells: self.total_cells(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked((10, 10), 10)
    }
}

/// Everything needed to start a [`GameSession`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub game: GameConfig,
    /// Presses at least this long flag instead of reveal.
    pub hold_threshold_ms: u64,
    /// Screen placement of the board, centered on the default screen when absent.
    pub layout: Option<BoardLayout>,
    /// Fixed seed for mine placement, random when absent.
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub const DEFAULT_HOLD_THRESHOLD_MS: u64 = 250;
    pub const DEFAULT_SCREEN_WIDTH: f32 = 800.0;
    pub const DEFAULT_TILE_SIZE: f32 = 34.0;

    /// Parses a JSON document, missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("Rejected session config: {}", err);
            GameError::InvalidConfig(err.to_string())
        })?;
        config.game.validate()?;
        Ok(config)
    }

    pub fn board_layout(&self) -> BoardLayout {
        self.layout.unwrap_or_else(|| {
            BoardLayout::centered(
                Self::DEFAULT_SCREEN_WIDTH,
                self.game.size.1,
                Self::DEFAULT_TILE_SIZE,
            )
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            hold_threshold_ms: Self::DEFAULT_HOLD_THRESHOLD_MS,
            layout: None,
            seed: None,
        }
    }
}
