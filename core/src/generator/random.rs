use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Generation strategy that can optionally try to make the starting tile zero or at least safe, but other than that is
/// purely random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
    start_tile: StartTile,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }

    /// Downgrades the start policy until enough free cells remain for the mines.
    fn effective_start_tile(&self, config: GameConfig) -> StartTile {
        let total_cells = config.total_cells();
        match self.start_tile {
            StartTile::AlwaysZero if config.mines + 9 > total_cells => {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
                StartTile::SimpleSafe.downgrade_if(config.mines + 1 > total_cells)
            }
            StartTile::SimpleSafe => {
                StartTile::SimpleSafe.downgrade_if(config.mines + 1 > total_cells)
            }
            other => other,
        }
    }
}

impl StartTile {
    fn downgrade_if(self, too_full: bool) -> Self {
        if too_full {
            log::warn!("Cannot make start tile safe, fallback to random");
            StartTile::Random
        } else {
            self
        }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let (rows, cols) = config.size;
        let start_tile = self.effective_start_tile(config);

        let mut protected: Array2<bool> = Array2::default(config.size.to_nd_index());
        if self.start.0 < rows && self.start.1 < cols {
            match start_tile {
                StartTile::Random => {}
                StartTile::SimpleSafe => protected[self.start.to_nd_index()] = true,
                StartTile::AlwaysZero => {
                    protected[self.start.to_nd_index()] = true;
                    for pos in protected.iter_neighbors(self.start) {
                        protected[pos.to_nd_index()] = true;
                    }
                }
            }
        }

        let mut candidates: Vec<Coord2> = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|&coords| !protected[coords.to_nd_index()])
            .collect();

        let wanted = usize::from(config.mines);
        if wanted > candidates.len() {
            log::warn!(
                "Minefield already full, requested {} mines but only {} cells are free",
                wanted,
                candidates.len()
            );
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (chosen, _) = candidates.partial_shuffle(&mut rng, wanted);

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        for &coords in chosen.iter() {
            mine_mask[coords.to_nd_index()] = true;
        }
        MineLayout::from_mine_mask(mine_mask)
    }
}
