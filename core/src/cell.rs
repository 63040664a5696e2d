use serde::{Deserialize, Serialize};

/// Canonical player-visible state stored by the gameplay engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum EngineCell {
    #[default]
    Hidden,
    Revealed(u8),
    Flagged,
}

/// One cell of a [`BoardSnapshot`](crate::BoardSnapshot), as the host reports it.
///
/// `is_mine` is only meaningful once the cell is revealed, and `adjacent_mines`
/// only for revealed non-mine cells. A cell is never both revealed and flagged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub adjacent_mines: u8,
    pub is_revealed: bool,
    pub is_flagged: bool,
}

impl Cell {
    pub const HIDDEN: Self = Self {
        is_mine: false,
        adjacent_mines: 0,
        is_revealed: false,
        is_flagged: false,
    };

    pub const FLAGGED: Self = Self {
        is_flagged: true,
        ..Self::HIDDEN
    };

    pub const MINE: Self = Self {
        is_mine: true,
        is_revealed: true,
        ..Self::HIDDEN
    };

    pub const fn revealed(adjacent_mines: u8) -> Self {
        Self {
            adjacent_mines,
            is_revealed: true,
            ..Self::HIDDEN
        }
    }

    /// Neither revealed nor flagged, so still a candidate move.
    pub const fn is_open(self) -> bool {
        !self.is_revealed && !self.is_flagged
    }

    /// Revealed and not a mine, so its number constrains its neighbors.
    pub const fn is_clue(self) -> bool {
        self.is_revealed && !self.is_mine
    }
}

impl From<EngineCell> for Cell {
    fn from(cell: EngineCell) -> Self {
        match cell {
            EngineCell::Hidden => Self::HIDDEN,
            EngineCell::Revealed(count) => Self::revealed(count),
            EngineCell::Flagged => Self::FLAGGED,
        }
    }
}
