use alloc::collections::BTreeSet;
use alloc::vec;
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid of tiles together with the coordinates of every mine on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    size: Size2,
    layout: Array2<Tile>,
    mines: BTreeSet<Coordinate>,
}

impl Board {
    /// Places `config.mines` distinct mines uniformly at random, then counts adjacencies.
    ///
    /// Sampling rejects cells that already hold a mine, so the configuration is validated first: a board
    /// with as many mines as cells is refused instead of sampling forever.
    pub fn new<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut board = Self::empty(config.size);
        let cols = CellCount::from(config.size.1);
        let total_cells = config.total_cells();
        let requested = usize::from(config.mines);

        while board.mines.len() < requested {
            let index: CellCount = rng.random_range(0..total_cells);
            // index < rows * cols, so both parts fit their axis
            let coords = Coordinate::new((index / cols) as Coord, (index % cols) as Coord);
            if board.mines.insert(coords) {
                board.layout[coords.to_nd_index()].activate_mine();
            }
        }

        board.count_adjacent_mines();
        log::debug!(
            "Generated {}x{} board with {} mines",
            config.size.0,
            config.size.1,
            board.mines.len()
        );
        Ok(board)
    }

    /// Same as [`Board::new`] with a small seeded generator, for reproducible games.
    pub fn generate(config: GameConfig, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    /// Builds a board with mines at exactly the given coordinates; duplicates count once.
    pub fn from_mine_coords(size: Size2, mine_coords: &[Coordinate]) -> Result<Self> {
        let config = GameConfig::new_unchecked(size, 0);
        config.validate()?;

        let mut board = Self::empty(size);
        for &coords in mine_coords {
            if !coords.is_within(size) {
                return Err(GameError::InvalidCoords);
            }
            if board.mines.insert(coords) {
                board.layout[coords.to_nd_index()].activate_mine();
            }
        }

        let mines = board.mine_count();
        if mines >= config.total_cells() {
            return Err(GameError::TooManyMines {
                requested: mines,
                cells: config.total_cells(),
            });
        }

        board.count_adjacent_mines();
        Ok(board)
    }

    fn empty(size: Size2) -> Self {
        Self {
            size,
            layout: Array2::default((usize::from(size.0), usize::from(size.1))),
            mines: BTreeSet::new(),
        }
    }

    fn count_adjacent_mines(&mut self) {
        for &mine in &self.mines {
            for neighbor in NeighborIter::new(mine, self.size) {
                self.layout[neighbor.to_nd_index()].add_adjacent_mine();
            }
        }
    }

    pub fn size(&self) -> Size2 {
        self.size
    }

    pub fn rows(&self) -> Coord {
        self.size.0
    }

    pub fn cols(&self) -> Coord {
        self.size.1
    }

    pub fn mine_count(&self) -> CellCount {
        // bounded by the cell count, which fits CellCount
        self.mines.len() as CellCount
    }

    pub fn mines(&self) -> &BTreeSet<Coordinate> {
        &self.mines
    }

    pub fn contains(&self, coords: Coordinate) -> bool {
        coords.is_within(self.size)
    }

    /// Bounds-safe lookup, `None` outside the board.
    pub fn at(&self, coords: Coordinate) -> Option<&Tile> {
        self.layout.get(coords.to_nd_index())
    }

    pub fn at_mut(&mut self, coords: Coordinate) -> Option<&mut Tile> {
        self.layout.get_mut(coords.to_nd_index())
    }

    pub fn neighbors(&self, coords: Coordinate) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }

    /// Flood fill starting at `origin`, returning every coordinate it revealed.
    ///
    /// A cell stops the fill when it is outside the board, already revealed, a mine or flagged. Any other cell
    /// is revealed, and when it has no adjacent mines its neighbors are queued as well. Since a revealed tile
    /// is never revealed again, no cell is visited twice and the result holds no duplicates.
    pub fn reveal(&mut self, origin: Coordinate) -> BTreeSet<Coordinate> {
        let size = self.size;
        let mut revealed = BTreeSet::new();
        let mut to_visit = vec![origin];

        while let Some(coords) = to_visit.pop() {
            let Some(tile) = self.layout.get_mut(coords.to_nd_index()) else {
                continue;
            };

            if tile.is_revealed() || tile.is_mine() || tile.is_flagged() {
                continue;
            }

            tile.set_revealed();
            revealed.insert(coords);
            log::trace!(
                "Flood revealed tile at {}, adjacent mines: {}",
                coords,
                tile.adjacent_mines()
            );

            if tile.adjacent_mines() == 0 {
                to_visit.extend(NeighborIter::new(coords, size));
            }
        }

        revealed
    }

    /// Reveals every tile, mines and flags included.
    pub fn reveal_all(&mut self) {
        for tile in self.layout.iter_mut() {
            if !tile.is_revealed() {
                tile.set_revealed();
            }
        }
    }

    /// Row-major `(row, col, tile)` triples; every call starts a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Coord, &Tile)> + '_ {
        // dimensions come from a Size2, so indices fit Coord
        self.layout
            .indexed_iter()
            .map(|((row, col), tile)| (row as Coord, col as Coord, tile))
    }

    /// Coordinates of every tile not revealed yet.
    pub fn hidden(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.iter()
            .filter(|(_, _, tile)| !tile.is_revealed())
            .map(|(row, col, _)| Coordinate::new(row, col))
    }

    /// Whether every safe tile is revealed, i.e. only mines remain hidden. Flags are not considered.
    pub fn is_cleared(&self) -> bool {
        self.layout
            .iter()
            .all(|tile| tile.is_revealed() || tile.is_mine())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn board(size: Size2, mines: &[(Coord, Coord)]) -> Board {
        let mines: Vec<Coordinate> = mines.iter().copied().map(Coordinate::from).collect();
        Board::from_mine_coords(size, &mines).unwrap()
    }

    fn tile(board: &Board, row: Coord, col: Coord) -> Tile {
        *board.at(Coordinate::new(row, col)).unwrap()
    }

    #[test]
    fn generate_places_exact_mine_count() {
        let board = Board::generate(GameConfig::new_unchecked((10, 10), 10), 7).unwrap();

        assert_eq!(board.mines().len(), 10);
        assert_eq!(board.iter().filter(|(_, _, t)| t.is_mine()).count(), 10);
        for &mine in board.mines() {
            assert!(board.at(mine).unwrap().is_mine());
        }
    }

    #[test]
    fn generate_is_reproducible_from_seed() {
        let config = GameConfig::new_unchecked((8, 12), 20);

        let a = Board::generate(config, 42).unwrap();
        let b = Board::generate(config, 42).unwrap();

        assert_eq!(a.mines(), b.mines());
    }

    #[test]
    fn generate_fills_all_but_one_cell() {
        let board = Board::generate(GameConfig::new_unchecked((3, 3), 8), 1).unwrap();

        assert_eq!(board.mine_count(), 8);
        assert_eq!(board.hidden().filter(|&c| !board.at(c).unwrap().is_mine()).count(), 1);
    }

    #[test]
    fn generate_rejects_full_board() {
        let err = Board::generate(GameConfig::new_unchecked((3, 3), 9), 1).unwrap_err();

        assert_eq!(err, GameError::TooManyMines { requested: 9, cells: 9 });
    }

    #[test]
    fn generate_rejects_empty_dimension() {
        let err = Board::generate(GameConfig::new_unchecked((0, 4), 1), 1).unwrap_err();

        assert_eq!(err, GameError::InvalidSize);
    }

    #[test]
    fn from_mine_coords_rejects_out_of_bounds() {
        let err = Board::from_mine_coords((2, 2), &[Coordinate::new(2, 0)]).unwrap_err();

        assert_eq!(err, GameError::InvalidCoords);
    }

    #[test]
    fn adjacency_counts_surrounding_mines() {
        // M . .
        // . . M
        // . . .
        let board = board((3, 3), &[(0, 0), (1, 2)]);

        assert_eq!(tile(&board, 0, 1).adjacent_mines(), 2);
        assert_eq!(tile(&board, 1, 1).adjacent_mines(), 2);
        assert_eq!(tile(&board, 1, 0).adjacent_mines(), 1);
        assert_eq!(tile(&board, 2, 2).adjacent_mines(), 1);
        assert_eq!(tile(&board, 2, 0).adjacent_mines(), 0);
    }

    #[test]
    fn reveal_flood_fills_zero_region_and_border() {
        let mut board = board((3, 3), &[(2, 2)]);

        let revealed = board.reveal(Coordinate::new(0, 0));

        assert_eq!(revealed.len(), 8);
        assert!(!revealed.contains(&Coordinate::new(2, 2)));
        assert!(tile(&board, 1, 1).is_revealed());
        assert!(!tile(&board, 2, 2).is_revealed());
        assert!(board.is_cleared());
    }

    #[test]
    fn reveal_numbered_tile_opens_only_itself() {
        let mut board = board((3, 3), &[(2, 2)]);

        let revealed = board.reveal(Coordinate::new(1, 1));

        assert_eq!(revealed.len(), 1);
        assert!(revealed.contains(&Coordinate::new(1, 1)));
        assert!(!tile(&board, 0, 0).is_revealed());
    }

    #[test]
    fn reveal_stops_at_flags_and_mines() {
        // . . . .
        // . . . .
        // F . . M
        let mut board = board((3, 4), &[(2, 3)]);
        board.at_mut(Coordinate::new(2, 0)).unwrap().toggle_flag();

        let revealed = board.reveal(Coordinate::new(0, 0));

        assert!(!revealed.contains(&Coordinate::new(2, 0)));
        assert!(!revealed.contains(&Coordinate::new(2, 3)));
        assert!(!tile(&board, 2, 0).is_revealed());
        assert_eq!(revealed.len(), 10);
    }

    #[test]
    fn reveal_on_mine_or_outside_does_nothing() {
        let mut board = board((2, 2), &[(0, 0)]);

        assert!(board.reveal(Coordinate::new(0, 0)).is_empty());
        assert!(board.reveal(Coordinate::new(5, 5)).is_empty());
        assert_eq!(board.hidden().count(), 4);
    }

    #[test]
    fn reveal_twice_returns_nothing_new() {
        let mut board = board((4, 4), &[(3, 3)]);

        let first = board.reveal(Coordinate::new(0, 0));
        let second = board.reveal(Coordinate::new(0, 0));

        assert_eq!(first.len(), 15);
        assert!(second.is_empty());
    }

    #[test]
    fn reveal_all_is_idempotent() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.at_mut(Coordinate::new(0, 0)).unwrap().toggle_flag();

        board.reveal_all();
        let once = board.clone();
        board.reveal_all();

        assert_eq!(board, once);
        assert!(board.iter().all(|(_, _, t)| t.is_revealed()));
        assert!(tile(&board, 0, 0).is_flagged());
    }

    #[test]
    fn at_outside_board_is_none() {
        let board = board((2, 3), &[]);

        assert!(board.at(Coordinate::new(1, 2)).is_some());
        assert!(board.at(Coordinate::new(2, 0)).is_none());
        assert!(board.at(Coordinate::new(0, 3)).is_none());
    }

    #[test]
    fn iter_is_row_major_and_restartable() {
        let board = board((2, 3), &[]);

        let cells: Vec<_> = board.iter().map(|(r, c, _)| (r, c)).collect();
        let again: Vec<_> = board.iter().map(|(r, c, _)| (r, c)).collect();

        assert_eq!(cells, [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert_eq!(cells, again);
    }

    #[test]
    fn cleared_ignores_flags() {
        let mut board = board((1, 3), &[(0, 0)]);
        board.at_mut(Coordinate::new(0, 0)).unwrap().toggle_flag();
        assert!(!board.is_cleared());

        board.reveal(Coordinate::new(0, 1));
        board.reveal(Coordinate::new(0, 2));
        assert!(board.is_cleared());

        board.at_mut(Coordinate::new(0, 0)).unwrap().toggle_flag();
        assert!(board.is_cleared());
    }
}
