use std::time::Duration;

use minefield_core::*;

const HOLD: Duration = Duration::from_millis(400);
const CLICK: Duration = Duration::from_millis(40);

fn config(seed: u64) -> SessionConfig {
    SessionConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

fn center(session: &GameSession<ManualClock>, coords: Coordinate) -> (f32, f32) {
    let layout = session.layout();
    let (x, y) = layout.cell_origin(coords);
    (x + layout.tile_size / 2.0, y + layout.tile_size / 2.0)
}

fn tap(session: &mut GameSession<ManualClock>, clock: &ManualClock, coords: Coordinate, hold: Duration) {
    let (x, y) = center(session, coords);
    session.press(x, y).unwrap();
    clock.advance(hold);
    session.release(x, y).unwrap();
}

fn tile(session: &GameSession<ManualClock>, coords: Coordinate) -> Tile {
    *session.board().at(coords).unwrap()
}

#[test]
fn flood_fill_opens_open_region_without_mines() {
    let config = GameConfig::new((10, 10), 10).unwrap();

    let mut checked = 0;
    for seed in 0..64 {
        let mut board = Board::generate(config, seed).unwrap();
        let Some(origin) = board.iter().find_map(|(row, col, tile)| {
            (!tile.is_mine() && tile.adjacent_mines() == 0).then_some(Coordinate::new(row, col))
        }) else {
            continue;
        };

        let revealed = board.reveal(origin);

        assert!(revealed.len() > 1, "seed {seed}: zero tile at {origin} opened alone");
        assert!(revealed.contains(&origin));
        assert!(revealed.iter().all(|coords| !board.mines().contains(coords)));
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn revealing_a_mine_loses_and_reveals_everything() {
    let clock = ManualClock::new();
    let mut session = GameSession::with_clock(config(3), clock.clone()).unwrap();
    let mine = *session.board().mines().iter().next().unwrap();

    tap(&mut session, &clock, mine, CLICK);

    assert_eq!(session.state(), GameState::Lost);
    assert_eq!(session.take_cues(), vec![Cue::Lost]);
    assert!(session.board().iter().all(|(_, _, tile)| tile.is_revealed()));
}

#[test]
fn flagging_mines_and_clearing_the_rest_wins() {
    let clock = ManualClock::new();
    let mut session = GameSession::with_clock(config(11), clock.clone()).unwrap();
    let mines: Vec<_> = session.board().mines().iter().copied().collect();
    let safe: Vec<_> = session
        .board()
        .iter()
        .filter(|(_, _, tile)| !tile.is_mine())
        .map(|(row, col, _)| Coordinate::new(row, col))
        .collect();
    assert_eq!(mines.len(), 10);
    assert_eq!(safe.len(), 90);

    for &mine in &mines {
        tap(&mut session, &clock, mine, HOLD);
        assert!(tile(&session, mine).is_flagged());
    }
    assert_eq!(session.flag_counter(), 0);
    assert_eq!(session.state(), GameState::Playing);

    for &coords in &safe {
        tap(&mut session, &clock, coords, CLICK);
    }

    assert_eq!(session.state(), GameState::Won);
    assert_eq!(session.take_cues(), vec![Cue::Won]);
    assert!(mines.iter().all(|&mine| tile(&session, mine).is_flagged()));
}

#[test]
fn drag_to_another_cell_cancels_the_pressed_one() {
    let clock = ManualClock::new();
    let board = Board::from_mine_coords((3, 3), &[Coordinate::new(2, 2)]).unwrap();
    let mut session = GameSession::with_board(board, &SessionConfig::default(), clock.clone());
    let first = Coordinate::new(1, 1);
    let second = Coordinate::new(1, 2);

    let (x, y) = center(&session, first);
    session.press(x, y).unwrap();
    assert!(tile(&session, first).is_hovered());

    let (x, y) = center(&session, second);
    session.drag(x, y).unwrap();
    assert!(!tile(&session, first).is_hovered());

    clock.advance(CLICK);
    session.release(x, y).unwrap();
    assert!(tile(&session, second).is_revealed());
    assert!(!tile(&session, first).is_revealed());
}

#[test]
fn quick_release_after_press_outside_board_is_ignored() {
    let clock = ManualClock::new();
    let board = Board::from_mine_coords((3, 3), &[Coordinate::new(2, 2)]).unwrap();
    let mut session = GameSession::with_board(board, &SessionConfig::default(), clock.clone());
    let first = Coordinate::new(0, 0);
    let second = Coordinate::new(1, 1);
    tap(&mut session, &clock, first, HOLD);
    assert!(tile(&session, first).is_flagged());

    session.press(1.0, 1.0).unwrap();
    clock.advance(Duration::from_millis(10));
    let (x, y) = center(&session, second);
    session.release(x, y).unwrap();

    let released = tile(&session, second);
    assert!(!released.is_flagged());
    assert!(!released.is_revealed());
    assert_eq!(session.flag_counter(), 0);
}

#[test]
fn input_outside_board_is_dropped() {
    let clock = ManualClock::new();
    let mut session = GameSession::with_clock(config(5), clock.clone()).unwrap();
    let before = session.board().clone();

    session.press(5.0, 5.0).unwrap();
    clock.advance(CLICK);
    session.release(5.0, 5.0).unwrap();
    session.drag(-10.0, 900.0).unwrap();

    assert_eq!(session.board(), &before);
    assert_eq!(session.tap_verify(5.0, 5.0), None);
}

#[test]
fn no_input_is_processed_after_the_game_ends() {
    let clock = ManualClock::new();
    let mut session = GameSession::with_clock(config(8), clock.clone()).unwrap();
    let mine = *session.board().mines().iter().next().unwrap();
    tap(&mut session, &clock, mine, CLICK);
    let flags = session.flag_counter();

    tap(&mut session, &clock, mine, HOLD);

    assert_eq!(session.state(), GameState::Lost);
    assert_eq!(session.flag_counter(), flags);
    assert!(!session.dispatch(GameEvent::End(Outcome::Won)).unwrap());
    assert_eq!(session.state(), GameState::Lost);
}

#[test]
fn system_clock_measures_real_presses() {
    let mut timer = InteractionTimer::<SystemClock>::default();

    timer.start();
    std::thread::sleep(Duration::from_millis(30));
    timer.end();

    assert!(timer.duration() >= Duration::from_millis(30));
    assert!(timer.duration() < Duration::from_secs(5));
    assert!(timer.is_click());
}

#[test]
fn new_session_without_seed_uses_default_board() {
    let session = GameSession::new(SessionConfig::default()).unwrap();

    assert_eq!(session.board().size(), (10, 10));
    assert_eq!(session.board().mine_count(), 10);
    assert_eq!(session.flag_counter(), 10);
    assert_eq!(session.state(), GameState::Playing);
    assert_eq!(session.elapsed_text(), "00:00");
}
