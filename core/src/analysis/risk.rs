use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// Open cells sharing the lowest risk score found on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskAssessment {
    pub risk: f64,
    pub cells: Vec<Coord2>,
}

impl RiskAssessment {
    /// Uniform pick among the tied cells.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord2> {
        self.cells.choose(rng).copied()
    }
}

/// Per-clue mine density, `remaining / open`, for clues that still hide mines.
fn clue_ratios(board: &BoardSnapshot) -> Array2<Option<f64>> {
    let mut ratios = Array2::from_elem(board.size().to_nd_index(), None);
    for clue in board.clues() {
        let remaining = clue.remaining_mines();
        if remaining > 0 && !clue.open.is_empty() {
            let ratio = f64::from(remaining) / clue.open.len() as f64;
            ratios[clue.coords.to_nd_index()] = Some(ratio);
        }
    }
    ratios
}

fn average_ratio(
    board: &BoardSnapshot,
    ratios: &Array2<Option<f64>>,
    coords: Coord2,
) -> Option<f64> {
    let (sum, count) = board
        .iter_neighbors(coords)
        .filter_map(|pos| ratios[pos.to_nd_index()])
        .fold((0.0, 0u32), |(sum, count), ratio| (sum + ratio, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Risk score of one open cell: the mean density of the neighboring clues
/// that still hide mines. `None` when no such clue touches the cell.
pub fn risk_of(board: &BoardSnapshot, coords: Coord2) -> Option<f64> {
    if !board.cell(coords).is_open() {
        return None;
    }
    average_ratio(board, &clue_ratios(board), coords)
}

/// Scores every open cell and keeps the ones at the minimum, in row-major
/// order. Ties use exact float equality.
pub fn assess_risk(board: &BoardSnapshot) -> Option<RiskAssessment> {
    let ratios = clue_ratios(board);
    let mut best: Option<RiskAssessment> = None;

    for coords in board.open_cells() {
        let Some(risk) = average_ratio(board, &ratios, coords) else {
            continue;
        };

        if let Some(current) = best.as_mut() {
            if risk == current.risk {
                current.cells.push(coords);
                continue;
            }
            if risk > current.risk {
                continue;
            }
        }
        best = Some(RiskAssessment {
            risk,
            cells: Vec::from([coords]),
        });
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn board(text: &str) -> BoardSnapshot {
        text.parse().unwrap()
    }

    #[test]
    fn risk_averages_neighbor_ratios() {
        // neighbor densities: (0,0) 1/2, (0,2) 1/1, (1,1) 2/5, (1,2) 2/3
        let board = board("1.1\n.22\n...");
        let expected = (0.5 + 1.0 + 2.0 / 5.0 + 2.0 / 3.0) / 4.0;

        assert_eq!(risk_of(&board, (0, 1)), Some(expected));
    }

    #[test]
    fn cells_without_active_clues_are_excluded() {
        let board = board("F1.\n11.\n...");

        assert_eq!(risk_of(&board, (2, 2)), None);
        assert_eq!(assess_risk(&board), None);
    }

    #[test]
    fn lower_ratio_is_preferred() {
        // left number: 1 mine in 5 cells, right number: 2 mines in 5 cells
        let board = board("...\n1.2\n...\n...");
        let left = risk_of(&board, (0, 0)).unwrap();
        let right = risk_of(&board, (0, 2)).unwrap();
        assert!(left < right);

        let best = assess_risk(&board).unwrap();
        assert!(best.cells.contains(&(0, 0)));
        assert!(!best.cells.contains(&(0, 2)));
    }

    #[test]
    fn ties_are_collected_and_picked_among() {
        let board = board("...\n.1.\n...");
        let best = assess_risk(&board).unwrap();

        assert_eq!(best.cells.len(), 8);
        assert_eq!(best.risk, 1.0 / 8.0);

        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..16 {
            let pick = best.choose(&mut rng).unwrap();
            assert!(best.cells.contains(&pick));
        }
    }

    #[test]
    fn flagged_and_revealed_cells_are_not_scored() {
        let board = board("F1\n..");

        assert_eq!(risk_of(&board, (0, 0)), None);
        assert_eq!(risk_of(&board, (0, 1)), None);
    }
}
