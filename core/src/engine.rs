use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Host-side game: owns the mine layout and the player-visible board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    mine_layout: MineLayout,
    board: Array2<EngineCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            mine_layout,
            board: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            state: EngineState::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn mines_left(&self) -> isize {
        (self.mine_layout.mine_count() as isize) - (self.flagged_count as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Flags a hidden cell or clears an existing flag. Revealed cells are left alone.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let cell = &mut self.board[coords.to_nd_index()];
        Ok(match *cell {
            EngineCell::Hidden => {
                *cell = EngineCell::Flagged;
                self.flagged_count += 1;
                MarkOutcome::Changed
            }
            EngineCell::Flagged => {
                *cell = EngineCell::Hidden;
                self.flagged_count -= 1;
                MarkOutcome::Changed
            }
            EngineCell::Revealed(_) => MarkOutcome::NoChange,
        })
    }

    /// Opens a hidden cell. Zero cells open their whole zero region.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        if self.cell_at(coords) != EngineCell::Hidden {
            return Ok(RevealOutcome::NoChange);
        }
        self.check_not_finished()?;

        if self.mine_layout[coords] {
            self.triggered_mine = Some(coords);
            self.state = EngineState::Lost;
            log::debug!("mine hit at {coords:?}");
            return Ok(RevealOutcome::HitMine);
        }

        self.flood_open(coords);

        if self.revealed_count == self.mine_layout.safe_cell_count() {
            self.state = EngineState::Won;
            Ok(RevealOutcome::Won)
        } else {
            self.state = EngineState::Active;
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Reveals every neighbor of a satisfied number, like a double click.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let EngineCell::Revealed(count) = self.cell_at(coords) else {
            return self.reveal(coords);
        };
        let flagged = self
            .mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| self.cell_at(pos) == EngineCell::Flagged)
            .count();
        if usize::from(count) != flagged {
            return Ok(RevealOutcome::NoChange);
        }

        let mut outcome = RevealOutcome::NoChange;
        for pos in self.mine_layout.iter_neighbors(coords) {
            if self.is_finished() {
                break;
            }
            outcome = outcome | self.reveal(pos)?;
        }
        Ok(outcome)
    }

    /// Work-list flood fill, so large empty regions do not grow the call stack.
    fn flood_open(&mut self, start: Coord2) {
        let mut pending = Vec::from([start]);

        while let Some(coords) = pending.pop() {
            if self.cell_at(coords) != EngineCell::Hidden {
                continue;
            }

            let adjacent_mines = self.mine_layout.adjacent_mine_count(coords);
            self.board[coords.to_nd_index()] = EngineCell::Revealed(adjacent_mines);
            self.revealed_count += 1;

            if adjacent_mines == 0 {
                pending.extend(
                    self.mine_layout
                        .iter_neighbors(coords)
                        .filter(|&pos| self.cell_at(pos) == EngineCell::Hidden),
                );
            }
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
