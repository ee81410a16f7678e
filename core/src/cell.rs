/// One grid position. Holds no reference to how it is drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub(crate) is_mine: bool,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    pub(crate) adjacent: u8,
}

impl Cell {
    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    pub const fn is_revealed(self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(self) -> bool {
        self.flagged
    }

    /// Number of mines in the Moore neighborhood, `0..=8`.
    pub const fn adjacent_mines(self) -> u8 {
        self.adjacent
    }

    pub const fn view(self) -> CellView {
        match (self.revealed, self.is_mine, self.flagged) {
            (true, true, _) => CellView::Mine,
            (true, false, _) => CellView::Open(self.adjacent),
            (false, _, true) => CellView::Flagged,
            (false, _, false) => CellView::Hidden,
        }
    }
}

/// What the player is allowed to see of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Open(u8),
    Mine,
}
