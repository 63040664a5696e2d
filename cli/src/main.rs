use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use minehint_advisor::AdvisorConfig;
use minehint_core::{BoardSnapshot, Difficulty};
use rand::Rng;

mod play;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML file with advisor settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Experience file to learn from and save into
    #[arg(short, long, global = true)]
    experience: Option<PathBuf>,

    /// Force a seed instead of random
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let the advisor play full games on generated boards
    Play {
        #[arg(short, long, value_enum, default_value_t = Level::Easy)]
        difficulty: Level,

        /// Number of games to play
        #[arg(short, long, default_value_t = 1)]
        games: u32,

        /// Learn in memory only, leave the experience file untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// Suggest a flag and a move for a board read from a text file
    Hint {
        /// One row per line: `.` hidden, `F` flag, `*` mine, `0`-`8` number
        board: PathBuf,
    },
    /// Print the learned statistics
    Stats,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Difficulty::Easy,
            Level::Medium => Difficulty::Medium,
            Level::Hard => Difficulty::Hard,
        }
    }
}

impl Args {
    /// Defaults, then the config file, then `MINEHINT_*` variables, then flags.
    fn advisor_config(&self) -> anyhow::Result<AdvisorConfig> {
        let mut config = match &self.config {
            Some(path) => AdvisorConfig::from_file(path)
                .with_context(|| format!("Could not load config from {}", path.display()))?,
            None => AdvisorConfig::default(),
        };
        config.apply_env().context("Bad environment override")?;
        if let Some(path) = &self.experience {
            config.experience_path = path.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut config = args.advisor_config()?;
    log::debug!("config: {config:?}");

    match args.command {
        Command::Play {
            difficulty,
            games,
            dry_run,
        } => {
            config.persist &= !dry_run;
            let game_config = Difficulty::from(difficulty).config();
            let mut seeds = config.rng();
            let mut advisor = minehint_advisor::open(&config);

            let mut wins = 0;
            for game in 1..=games {
                let summary = play::play_game(&mut advisor, game_config, seeds.random())
                    .with_context(|| format!("Game {game} failed"))?;
                wins += u32::from(summary.won);
                println!("Game {game}: {summary}");
            }
            println!("Won {wins} of {games}");
            println!("{}", advisor.get_stats());
        }
        Command::Hint { board } => {
            let text = std::fs::read_to_string(&board)
                .with_context(|| format!("Could not read {}", board.display()))?;
            let snapshot: BoardSnapshot = text
                .parse()
                .with_context(|| format!("Could not parse board in {}", board.display()))?;

            config.persist = false;
            let mut advisor = minehint_advisor::open(&config);
            advisor.set_board(snapshot);

            match advisor.recommend_flag()? {
                Some((row, col)) => println!("Flag: ({row}, {col})"),
                None => println!("Flag: none"),
            }
            let recommendation = advisor.recommend()?;
            let (row, col) = recommendation.coords;
            println!("Reveal: ({row}, {col}) by {}", recommendation.strategy);
        }
        Command::Stats => {
            let store = config.open_store();
            println!("Patterns: {}", store.experience().pattern_count());
            println!("{}", store.stats());
        }
    }

    Ok(())
}
