use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Playing -> Won
/// - Playing -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

impl From<Outcome> for GameState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won => Self::Won,
            Outcome::Lost => Self::Lost,
        }
    }
}

/// Sound the front end should play.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Won,
    Lost,
}

impl From<Outcome> for Cue {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won => Self::Won,
            Outcome::Lost => Self::Lost,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// Pointer went down on a tile.
    Pending(Coordinate),
    Flag(Coordinate),
    Reveal(Coordinate),
    /// Pointer left a tile without releasing on it.
    Cancel(Coordinate),
    End(Outcome),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Pending,
    Flag,
    Reveal,
    Cancel,
    End,
}

impl GameEvent {
    pub const fn coords(&self) -> Option<Coordinate> {
        match *self {
            Self::Pending(coords)
            | Self::Flag(coords)
            | Self::Reveal(coords)
            | Self::Cancel(coords) => Some(coords),
            Self::End(_) => None,
        }
    }
}

impl Event for GameEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Self::Pending(_) => EventKind::Pending,
            Self::Flag(_) => EventKind::Flag,
            Self::Reveal(_) => EventKind::Reveal,
            Self::Cancel(_) => EventKind::Cancel,
            Self::End(_) => EventKind::End,
        }
    }
}

/// Everything a game's listeners mutate.
#[derive(Debug)]
pub struct GameContext<K: Clock = SystemClock> {
    board: Board,
    state: Signal<GameState>,
    flags: Signal<i32>,
    session_timer: InteractionTimer<K>,
    cues: Vec<Cue>,
}

impl<K: Clock> GameContext<K> {
    pub fn new(board: Board, session_timer: InteractionTimer<K>) -> Self {
        let flags = i32::from(board.mine_count());
        Self {
            board,
            state: Signal::new(GameState::Playing),
            flags: Signal::new(flags),
            session_timer,
            cues: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        *self.state.get()
    }

    /// Mines minus placed flags; goes negative when over-flagged.
    pub fn flag_counter(&self) -> i32 {
        *self.flags.get()
    }

    pub fn session_timer(&self) -> &InteractionTimer<K> {
        &self.session_timer
    }

    fn tile_mut(&mut self, coords: Coordinate) -> Result<&mut Tile> {
        self.board.at_mut(coords).ok_or(GameError::InvalidCoords)
    }
}

pub type GameEmitter<K = SystemClock> = EventEmitter<GameContext<K>, GameEvent>;

/// Registers the rules of the game on `emitter`.
pub fn register_rules<K: Clock + 'static>(emitter: &mut GameEmitter<K>) {
    emitter.on(EventKind::Pending, |ctx, event, _| {
        let Some(coords) = event.coords() else {
            return Ok(());
        };
        let tile = ctx.tile_mut(coords)?;
        if tile.is_revealed() || tile.is_hovered() || tile.is_flagged() {
            return Ok(());
        }
        tile.set_hover();
        Ok(())
    });

    emitter.on(EventKind::Flag, |ctx, event, _| {
        let Some(coords) = event.coords() else {
            return Ok(());
        };
        let tile = ctx.tile_mut(coords)?;
        if tile.is_revealed() {
            return Ok(());
        }
        tile.unset_hover();
        let delta = if tile.toggle_flag() { -1 } else { 1 };
        let flags = ctx.flag_counter() + delta;
        ctx.flags.set(flags);
        log::debug!("Flag toggled at {}, flags left: {}", coords, flags);
        Ok(())
    });

    emitter.on(EventKind::Reveal, |ctx, event, emitter| {
        let Some(coords) = event.coords() else {
            return Ok(());
        };
        let tile = ctx.tile_mut(coords)?;
        if tile.is_flagged() {
            return Ok(());
        }

        if tile.adjacent_mines() == 0 {
            let revealed = ctx.board.reveal(coords);
            log::debug!("Flood fill from {} revealed {} tiles", coords, revealed.len());
        }

        let tile = ctx.tile_mut(coords)?;
        tile.unset_hover();
        tile.set_revealed();

        if tile.is_mine() {
            log::debug!("Mine hit at {}", coords);
            emitter.emit(ctx, &GameEvent::End(Outcome::Lost))?;
            return Ok(());
        }

        if ctx.board.is_cleared() {
            emitter.emit(ctx, &GameEvent::End(Outcome::Won))?;
        }
        Ok(())
    });

    emitter.on(EventKind::Cancel, |ctx, event, _| {
        let Some(coords) = event.coords() else {
            return Ok(());
        };
        ctx.tile_mut(coords)?.unset_hover();
        Ok(())
    });

    emitter.on(EventKind::End, |ctx, event, emitter| {
        let GameEvent::End(outcome) = *event else {
            return Ok(());
        };
        ctx.state.set(outcome.into());
        ctx.cues.push(outcome.into());
        ctx.session_timer.pause();
        ctx.board.reveal_all();
        emitter.clear();
        log::debug!(
            "Game ended: {:?} after {}",
            outcome,
            InteractionTimer::<K>::format(ctx.session_timer.duration())
        );
        Ok(())
    });
}

/// One game from first press to the end screen.
///
/// Pointer input comes in as pixel positions, is mapped onto the board, and is turned into [`GameEvent`]s
/// that the registered rules apply to the [`GameContext`]. Once the game ends every listener is dropped,
/// so further input has no effect. Start a new session for a new game.
#[derive(Debug)]
pub struct GameSession<K: Clock = SystemClock> {
    context: GameContext<K>,
    emitter: GameEmitter<K>,
    layout: BoardLayout,
    pointer: PointerTracker<K>,
}

impl GameSession<SystemClock> {
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<K: Clock + Clone + 'static> GameSession<K> {
    /// Generates the board from the configured seed, or from the current time when there is none.
    pub fn with_clock(config: SessionConfig, clock: K) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(time_seed);
        let board = Board::generate(config.game, seed)?;
        log::debug!("New game, seed: {}", seed);
        Ok(Self::with_board(board, &config, clock))
    }

    pub fn with_board(board: Board, config: &SessionConfig, clock: K) -> Self {
        let hold_threshold = Duration::from_millis(config.hold_threshold_ms);
        let mut session_timer = InteractionTimer::new(clock.clone(), hold_threshold);
        session_timer.start();

        let mut emitter = GameEmitter::new();
        register_rules(&mut emitter);

        Self {
            context: GameContext::new(board, session_timer),
            emitter,
            layout: config.board_layout(),
            pointer: PointerTracker::new(InteractionTimer::new(clock, hold_threshold)),
        }
    }
}

impl<K: Clock> GameSession<K> {
    pub fn context(&self) -> &GameContext<K> {
        &self.context
    }

    pub fn board(&self) -> &Board {
        self.context.board()
    }

    pub fn state(&self) -> GameState {
        self.context.state()
    }

    pub fn flag_counter(&self) -> i32 {
        self.context.flag_counter()
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Gives access to the emitter, e.g. to add listeners next to the game rules.
    pub fn emitter_mut(&mut self) -> &mut GameEmitter<K> {
        &mut self.emitter
    }

    /// Applies an event directly, bypassing pointer mapping. Returns whether anything listened.
    pub fn dispatch(&mut self, event: GameEvent) -> Result<bool> {
        self.emitter.emit(&mut self.context, &event)
    }

    pub fn tap_verify(&self, x: f32, y: f32) -> Option<Coordinate> {
        self.layout.tap_verify(x, y, self.context.board.size())
    }

    pub fn press(&mut self, x: f32, y: f32) -> Result<()> {
        let Some(coords) = self.tap_verify(x, y) else {
            return Ok(());
        };
        log::trace!("Press at {}", coords);
        self.dispatch(GameEvent::Pending(coords))?;
        self.pointer.press(coords);
        Ok(())
    }

    /// Ends the current press. Releases outside the board or without a press on it are dropped.
    pub fn release(&mut self, x: f32, y: f32) -> Result<()> {
        let tap = self.pointer.release();
        let (Some(tap), Some(coords)) = (tap, self.tap_verify(x, y)) else {
            return Ok(());
        };
        let event = match tap {
            Tap::Hold => GameEvent::Flag(coords),
            Tap::Click => GameEvent::Reveal(coords),
        };
        log::trace!("Release at {}: {:?}", coords, event);
        self.dispatch(event)?;
        Ok(())
    }

    pub fn drag(&mut self, x: f32, y: f32) -> Result<()> {
        let Some(coords) = self.tap_verify(x, y) else {
            return Ok(());
        };
        if let Some(left) = self.pointer.drag(coords) {
            log::trace!("Drag from {} to {}", left, coords);
            self.dispatch(GameEvent::Cancel(left))?;
        }
        Ok(())
    }

    /// Refreshes the session clock, call once per frame.
    pub fn tick(&mut self) {
        self.context.session_timer.end();
    }

    pub fn elapsed(&self) -> Duration {
        self.context.session_timer.duration()
    }

    pub fn elapsed_text(&self) -> String {
        InteractionTimer::<K>::format(self.elapsed())
    }

    /// Cues emitted since the last call.
    pub fn take_cues(&mut self) -> Vec<Cue> {
        core::mem::take(&mut self.context.cues)
    }

    pub fn subscribe_state<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameState) + 'static,
    {
        self.context.state.subscribe(listener)
    }

    pub fn subscribe_flags<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&i32) + 'static,
    {
        self.context.flags.subscribe(listener)
    }
}

fn time_seed() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0, |since| since.as_nanos() as u64)
}
