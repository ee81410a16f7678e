use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines, there must be fewer mines than cells")]
    TooManyMines,
    #[error("Board must be at least one cell wide and tall")]
    EmptyBoard,
    #[error("Board too large, width and height must be at most 255")]
    BoardTooLarge,
    #[error("Board size and mine count must be whole numbers")]
    NotANumber,
    #[error("Mines were already placed on this board")]
    MinesAlreadyPlaced,
}

pub type Result<T> = core::result::Result<T, GameError>;
