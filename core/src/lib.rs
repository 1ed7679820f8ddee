//! Minefield engine: board generation, flood-fill reveal, and the event-driven rules that turn pointer
//! presses into reveals and flags.

#![no_std]

extern crate alloc;

pub use board::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use input::*;
pub use session::*;
pub use tile::*;
pub use timer::*;
pub use types::*;

mod board;
mod config;
mod error;
mod event;
mod input;
mod session;
mod tile;
mod timer;
mod types;
