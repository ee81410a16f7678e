use alloc::collections::{BTreeSet, VecDeque};
use ndarray::Array2;
use rand::Rng;

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BoardState {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl BoardState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// The playing field of a single game: mines, adjacency counts and what the player uncovered.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    config: BoardConfig,
    cells: Array2<Cell>,
    mines_placed: bool,
    revealed_safe_count: CellCount,
    flag_count: CellCount,
    state: BoardState,
}

impl Board {
    /// Builds an empty board: no mines, nothing revealed.
    pub fn new(config: BoardConfig) -> Result<Self> {
        let config = config.validate()?;
        Ok(Self {
            config,
            cells: Array2::default(config.size().to_nd_index()),
            mines_placed: false,
            revealed_safe_count: 0,
            flag_count: 0,
            state: BoardState::default(),
        })
    }

    /// Builds a board with mines at exactly the given coordinates.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mines = CellCount::try_from(mine_coords.len()).map_err(|_| GameError::TooManyMines)?;
        let mut board = Self::new(BoardConfig::new(size.0, size.1, mines))?;
        for &coords in mine_coords {
            let coords = board.validate_coords(coords)?;
            if board.cells[coords.to_nd_index()].is_mine {
                return Err(GameError::InvalidCoords);
            }
            board.arm(coords);
        }
        board.mines_placed = true;
        Ok(board)
    }

    /// Picks `mines` distinct cells uniformly at random and arms them.
    ///
    /// Must run once, before the first reveal.
    pub fn place_mines<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.mines_placed || self.revealed_safe_count > 0 {
            return Err(GameError::MinesAlreadyPlaced);
        }

        let width = usize::from(self.config.width);
        let picks = rand::seq::index::sample(
            rng,
            usize::from(self.config.total_cells()),
            usize::from(self.config.mines),
        );
        for index in picks {
            // index < width * height, so both halves fit a Coord
            let coords = ((index % width) as Coord, (index / width) as Coord);
            self.arm(coords);
        }
        self.mines_placed = true;
        log::debug!(
            "placed {} mines on a {}x{} board",
            self.config.mines,
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    fn arm(&mut self, coords: Coord2) {
        self.cells[coords.to_nd_index()].is_mine = true;
        for pos in self.iter_neighbors(coords) {
            self.cells[pos.to_nd_index()].adjacent += 1;
        }
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.config.safe_cells()
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flag_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    /// Cells in row-major order, paired with their coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((y, x), &cell)| ((x as Coord, y as Coord), cell))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// Whether a reveal at `coords` would change anything.
    pub fn can_reveal(&self, coords: Coord2) -> bool {
        !self.is_finished()
            && self
                .cell_at(coords)
                .is_ok_and(|cell| !cell.revealed && !cell.flagged)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(FlagOutcome::NoChange);
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        Ok(match (cell.revealed, cell.flagged) {
            (true, _) => FlagOutcome::NoChange,
            (false, false) => {
                cell.flagged = true;
                self.flag_count += 1;
                FlagOutcome::Flagged
            }
            (false, true) => {
                cell.flagged = false;
                self.flag_count -= 1;
                FlagOutcome::Unflagged
            }
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        if !self.can_reveal(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        if self.cells[coords.to_nd_index()].is_mine {
            log::debug!("mine hit at {:?}", coords);
            self.state = BoardState::Lost;
            self.reveal_all_on_loss();
            return Ok(RevealOutcome::Lost);
        }

        self.flood_reveal(coords);

        if self.revealed_safe_count == self.safe_cell_count() {
            log::debug!("all {} safe cells revealed", self.revealed_safe_count);
            self.state = BoardState::Won;
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Continue)
        }
    }

    /// Opens a safe cell and, through zero cells, everything reachable up to the first numbered ring.
    fn flood_reveal(&mut self, start: Coord2) {
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            let cell = &mut self.cells[coords.to_nd_index()];
            if cell.revealed || cell.flagged || cell.is_mine {
                continue;
            }

            cell.revealed = true;
            self.revealed_safe_count += 1;
            let adjacent = cell.adjacent;
            log::trace!("revealed {:?}, adjacent mines: {}", coords, adjacent);

            if adjacent == 0 {
                for pos in self.iter_neighbors(coords) {
                    if visited.insert(pos) {
                        to_visit.push_back(pos);
                    }
                }
            }
        }
    }

    /// Uncovers the whole board for the end-of-game view.
    fn reveal_all_on_loss(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.revealed = true;
        }
    }
}
