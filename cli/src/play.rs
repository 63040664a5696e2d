use std::fmt;

use minehint_advisor::{ExperienceStorage, MoveAdvisor};
use minehint_core::*;
use rand::Rng;

/// How one self-played game went.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub won: bool,
    pub reveals: u32,
    pub flags: u32,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = if self.won { "won" } else { "lost" };
        write!(
            f,
            "{result} after {} reveals and {} flags",
            self.reveals, self.flags
        )
    }
}

/// Plays one game to the end, feeding every reveal back to the advisor.
///
/// Mines are laid out only after the first reveal so the opening click is
/// always a zero.
pub fn play_game<S, R>(
    advisor: &mut MoveAdvisor<S, R>,
    config: GameConfig,
    seed: u64,
) -> anyhow::Result<GameSummary>
where
    S: ExperienceStorage,
    R: Rng,
{
    let mut engine: Option<PlayEngine> = None;
    let mut summary = GameSummary {
        won: false,
        reveals: 0,
        flags: 0,
    };
    // Each turn either flags or reveals a fresh cell.
    let max_turns = 2 * usize::from(config.total_cells());

    for _ in 0..max_turns {
        let board = match &engine {
            Some(engine) => BoardSnapshot::from_engine(engine),
            None => BoardSnapshot::hidden(config.size),
        };
        advisor.set_board(board);

        if let Some(engine) = engine.as_mut()
            && let Some(coords) = advisor.recommend_flag()?
        {
            engine.toggle_flag(coords)?;
            summary.flags += 1;
            continue;
        }

        let recommendation = advisor.recommend()?;
        let coords = recommendation.coords;
        log::debug!("reveal {coords:?} by {}", recommendation.strategy);

        let engine = engine.get_or_insert_with(|| {
            PlayEngine::new(
                RandomMinefieldGenerator::new(seed, coords, StartTile::AlwaysZero).generate(config),
            )
        });
        let outcome = engine.reveal(coords)?;
        summary.reveals += 1;
        advisor.report_outcome(coords, outcome.is_safe())?;

        match outcome {
            RevealOutcome::Revealed => {}
            RevealOutcome::Won => {
                summary.won = true;
                return Ok(summary);
            }
            RevealOutcome::HitMine => return Ok(summary),
            RevealOutcome::NoChange => {
                anyhow::bail!("advisor picked {coords:?}, which was already open")
            }
        }
    }

    anyhow::bail!("game did not finish within {max_turns} turns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use minehint_advisor::{ExperienceStore, MemoryStorage};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn advisor() -> MoveAdvisor<MemoryStorage, SmallRng> {
        MoveAdvisor::new(
            ExperienceStore::empty(MemoryStorage::new()),
            SmallRng::seed_from_u64(3),
        )
    }

    #[test]
    fn games_finish_and_feed_stats() {
        let mut advisor = advisor();

        for seed in 0..5 {
            let summary = play_game(&mut advisor, Difficulty::Easy.config(), seed).unwrap();
            assert!(summary.reveals > 0);
        }

        assert!(advisor.stats().total() >= 5);
    }

    #[test]
    fn board_with_one_mine_is_always_won() {
        let mut advisor = advisor();
        let summary = play_game(&mut advisor, GameConfig::new((4, 4), 1), 11).unwrap();

        assert!(summary.won);
        assert_eq!(advisor.stats().failure_count, 0);
    }
}
