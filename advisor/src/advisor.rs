use std::cmp::Reverse;
use std::fmt;

use minehint_core::{
    BoardSnapshot, Coord2, GameError, Stats, apply_offset, assess_risk, extract, find_certain_mine,
    find_safe_near_numbers,
};
use rand::prelude::*;

use crate::{AdvisorError, ExperienceStorage, ExperienceStore};

/// Which tier of the advisor produced a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// A learned pattern matched an open cell.
    Experience,
    /// A satisfied number proved the cell safe.
    Deduction,
    /// Lowest locally estimated mine density.
    Risk,
    /// Uniform pick among open cells nothing else could rank.
    Random,
    /// No open cell left; the origin is returned as a placeholder.
    Fallback,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Experience => "experience",
            Self::Deduction => "deduction",
            Self::Risk => "risk",
            Self::Random => "random",
            Self::Fallback => "fallback",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Recommendation {
    pub coords: Coord2,
    pub strategy: Strategy,
}

/// Proposes the next reveal or flag for a board supplied by the host, and
/// learns from the outcomes the host reports back.
///
/// Tiers are tried in order: learned patterns, a satisfied-number deduction,
/// lowest local risk, then a random open cell.
#[derive(Debug)]
pub struct MoveAdvisor<S, R> {
    store: ExperienceStore<S>,
    rng: R,
    board: Option<BoardSnapshot>,
    persist: bool,
}

impl<S: ExperienceStorage, R: Rng> MoveAdvisor<S, R> {
    pub fn new(store: ExperienceStore<S>, rng: R) -> Self {
        Self {
            store,
            rng,
            board: None,
            persist: true,
        }
    }

    /// Disables saving after each reported outcome; learning still happens in memory.
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn store(&self) -> &ExperienceStore<S> {
        &self.store
    }

    /// Replaces the board used by the next queries.
    pub fn set_board(&mut self, board: BoardSnapshot) {
        self.board = Some(board);
    }

    pub fn board(&self) -> Result<&BoardSnapshot, AdvisorError> {
        self.board.as_ref().ok_or(AdvisorError::NoBoard)
    }

    pub fn recommend_move(&mut self) -> Result<Coord2, AdvisorError> {
        self.recommend().map(|recommendation| recommendation.coords)
    }

    pub fn recommend(&mut self) -> Result<Recommendation, AdvisorError> {
        let board = self.board.as_ref().ok_or(AdvisorError::NoBoard)?;

        let (coords, strategy) = if let Some(coords) = recall(&self.store, board) {
            (coords, Strategy::Experience)
        } else if let Some(coords) = find_safe_near_numbers(board) {
            (coords, Strategy::Deduction)
        } else if let Some(coords) =
            assess_risk(board).and_then(|best| best.choose(&mut self.rng))
        {
            (coords, Strategy::Risk)
        } else {
            let open: Vec<Coord2> = board.open_cells().collect();
            match open.choose(&mut self.rng) {
                Some(&coords) => (coords, Strategy::Random),
                None => ((0, 0), Strategy::Fallback),
            }
        };

        log::debug!("recommending {coords:?} from {strategy}");
        Ok(Recommendation { coords, strategy })
    }

    /// A cell that must hold a mine, if any single number proves one.
    pub fn recommend_flag(&self) -> Result<Option<Coord2>, AdvisorError> {
        Ok(find_certain_mine(self.board()?))
    }

    /// Records the result of a move at `coords`, learning from the
    /// neighborhood centered on that same cell.
    pub fn report_outcome(&mut self, coords: Coord2, success: bool) -> Result<(), AdvisorError> {
        self.report_outcome_from(coords, coords, success)
    }

    /// Records the result of a move at `target` suggested by the pattern around
    /// `center`. Must be called with the board as it was before the move.
    pub fn report_outcome_from(
        &mut self,
        center: Coord2,
        target: Coord2,
        success: bool,
    ) -> Result<(), AdvisorError> {
        let board = self.board.as_ref().ok_or(AdvisorError::NoBoard)?;
        if !board.contains(center) || !board.contains(target) {
            return Err(GameError::InvalidCoords.into());
        }

        if success {
            let (pattern, neighborhood) = extract(board, center);
            let offset = neighborhood.offset_of(target);
            log::debug!("learned {offset:?} for pattern {pattern}");
            self.store.record(pattern, offset);
            self.store.note_success();
        } else {
            self.store.note_failure();
        }

        // a failed save is already logged by the store; the outcome stays in memory
        if self.persist && !self.store.persist() {
            log::debug!("outcome at {target:?} kept in memory only");
        }
        Ok(())
    }

    pub fn stats(&self) -> Stats {
        self.store.stats()
    }

    /// Human-readable success summary, or `No data` before any report.
    pub fn get_stats(&self) -> String {
        self.stats().to_string()
    }
}

/// Scans open cells in row-major order for a learned pattern and returns the
/// best-scoring move that still lands on an open cell. Equal counts go to the
/// smallest offset.
fn recall<S: ExperienceStorage>(
    store: &ExperienceStore<S>,
    board: &BoardSnapshot,
) -> Option<Coord2> {
    board.open_cells().find_map(|center| {
        let (pattern, _) = extract(board, center);
        let moves = store.lookup(&pattern)?;
        moves
            .iter()
            .filter(|&(_, &count)| count > 0)
            .filter_map(|(&offset, &count)| {
                let target = apply_offset(center, offset, board.size())?;
                board.cell(target).is_open().then_some((target, count))
            })
            .min_by_key(|&(_, count)| Reverse(count))
            .map(|(target, _)| target)
    })
}
