use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Cell at {0:?} is both revealed and flagged")]
    RevealedAndFlagged(crate::Coord2),
    #[error("Unknown board symbol {0:?}")]
    UnknownSymbol(char),
    #[error("Pattern token must be a single symbol, got {0} characters")]
    TokenLength(usize),
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
