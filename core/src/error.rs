use alloc::string::String;
use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must have at least one row and one column")]
    InvalidSize,
    #[error("Too many mines, requested {requested} but the board has {cells} cells")]
    TooManyMines { requested: CellCount, cells: CellCount },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
