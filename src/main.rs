use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use club_tournament::calculate::{aggregate_careers, rank, tournament_winners};
use club_tournament::config::AppConfig;
use club_tournament::models::{Advance, MatchRef, Outcome, PlayerId, PlayerRef, Tournament};
use club_tournament::storage::{StorageConfig, TournamentStore};
use club_tournament::tournament_name;

#[derive(Parser)]
#[command(name = "club-tournament")]
#[command(about = "Chess club tournament tracker with Swiss-style pairings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tournament
    New {
        /// Where the tournament is played
        #[arg(long)]
        location: String,

        /// Number of rounds (default from config)
        #[arg(long)]
        rounds: Option<u32>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List stored tournaments
    List,

    /// Register a player before launch
    AddPlayer {
        /// Tournament id or name
        tournament: String,

        /// Club member id
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,
    },

    /// Start the tournament and pair round 1
    Launch {
        tournament: String,

        /// Seed for the pairing shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the current round
    Show { tournament: String },

    /// Record a result in the current round
    Record {
        tournament: String,

        /// Board number, starting at 1
        #[arg(long)]
        board: usize,

        /// Result for the first player listed: win, loss or draw
        #[arg(long)]
        result: Outcome,
    },

    /// Confirm the current round and pair the next one
    Advance {
        tournament: String,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print standings
    Standings { tournament: String },

    /// Set or clear the description
    Describe {
        tournament: String,

        #[arg(long, conflicts_with = "clear")]
        text: Option<String>,

        #[arg(long)]
        clear: bool,
    },

    /// Career statistics across all tournaments
    Stats,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn player_name<'a>(tournament: &'a Tournament, id: &'a PlayerId) -> &'a str {
    tournament
        .player(id)
        .map_or(id.as_str(), |p| p.name.as_str())
}

fn print_round(tournament: &Tournament) {
    let Some(round) = tournament.current_round() else {
        println!("No round in progress ({}).", tournament.status());
        return;
    };

    println!("=== {} of {} ===", round.name(), tournament.planned_rounds());
    for (i, game) in round.matches().iter().enumerate() {
        let white = player_name(tournament, game.player_a());
        match game.player_b() {
            None => println!("  {:>2}. {:<24} bye", i + 1, white),
            Some(black) => {
                let result = match (game.result_a(), game.result_b()) {
                    (Some(a), Some(b)) => format!("{} / {}", a, b),
                    _ => "pending".to_string(),
                };
                println!(
                    "  {:>2}. {:<24} vs {:<24} {}",
                    i + 1,
                    white,
                    player_name(tournament, black),
                    result
                );
            }
        }
    }
    println!("Pending: {}", round.pending());
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(log_level, cli.json_logs);

    tracing::debug!("Starting club-tournament v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let store = TournamentStore::new(StorageConfig::new(data_dir));

    match cli.command {
        Commands::New {
            location,
            rounds,
            description,
        } => {
            let names = store.names()?;
            let name = tournament_name(&location, &names, Utc::now().date_naive());
            let rounds = rounds.unwrap_or(config.tournament.default_rounds);

            let mut tournament = Tournament::new(name, location, rounds)?;
            if let Some(text) = description {
                tournament = tournament.with_description(&text);
            }
            store.save(&tournament)?;

            println!("Created {} ({} rounds)", tournament.name(), rounds);
            println!("ID: {}", tournament.id());
        }

        Commands::List => {
            let tournaments = store.load_all()?;
            if tournaments.is_empty() {
                println!("No tournaments yet.");
            }
            for t in &tournaments {
                println!(
                    "{:<40} {:<12} {:>3} players  {:>5.1}%  {}",
                    t.name(),
                    t.status().to_string(),
                    t.roster().len(),
                    t.progress_percent(),
                    t.id()
                );
            }
        }

        Commands::AddPlayer {
            tournament,
            id,
            name,
        } => {
            let mut t = store.find(&tournament)?;
            t.add_player(PlayerRef::new(id, name))
                .with_context(|| format!("Cannot add player to {}", t.name()))?;
            store.save(&t)?;
            println!("{} players registered.", t.roster().len());
        }

        Commands::Launch { tournament, seed } => {
            let mut t = store.find(&tournament)?;
            let name = t.name().to_string();
            let mut rng = make_rng(seed.or(config.tournament.seed));
            t.launch(&mut rng)
                .with_context(|| format!("Cannot launch {}", name))?;
            store.save(&t)?;
            print_round(&t);
        }

        Commands::Show { tournament } => {
            let t = store.find(&tournament)?;
            println!("{} ({})", t.name(), t.status());
            if !t.description().is_empty() {
                println!("{}", t.description());
            }
            print_round(&t);
        }

        Commands::Record {
            tournament,
            board,
            result,
        } => {
            let mut t = store.find(&tournament)?;
            let index = board.checked_sub(1).context("Board numbers start at 1")?;
            let round = t
                .current_round()
                .map_or(t.rounds().len() as u32, |r| r.number);
            t.record_result(MatchRef::new(round, index), result)
                .with_context(|| format!("Cannot record board {} of round {}", board, round))?;
            store.save(&t)?;
            print_round(&t);
        }

        Commands::Advance { tournament, seed } => {
            let mut t = store.find(&tournament)?;
            let mut rng = make_rng(seed.or(config.tournament.seed));
            let advance = t
                .advance_round(&mut rng)
                .with_context(|| format!("Cannot advance {}", t.name()))?;
            store.save(&t)?;

            match advance {
                Advance::NextRound(_) => print_round(&t),
                Advance::Finished => {
                    let winners: Vec<String> = tournament_winners(&t)
                        .into_iter()
                        .map(|p| p.name)
                        .collect();
                    println!("{} finished. Winner(s): {}", t.name(), winners.join(", "));
                }
            }
        }

        Commands::Standings { tournament } => {
            let t = store.find(&tournament)?;
            println!(
                "=== {} ({}, {}/{} rounds) ===",
                t.name(),
                t.status(),
                t.completed_rounds(),
                t.planned_rounds()
            );
            for standing in rank(&t) {
                println!(
                    "{:>3}. {:<24} {:>4.1}  {}",
                    standing.rank, standing.player.name, standing.points, standing.record
                );
            }
        }

        Commands::Describe {
            tournament,
            text,
            clear,
        } => {
            let mut t = store.find(&tournament)?;
            match (text, clear) {
                (Some(text), _) => t.set_description(&text),
                (None, true) => t.set_description(""),
                (None, false) => {
                    println!("{}", t.description());
                    return Ok(());
                }
            }
            store.save(&t)?;
            println!("Description updated.");
        }

        Commands::Stats => {
            let tournaments = store.load_all()?;
            let careers = aggregate_careers(&tournaments);
            if careers.is_empty() {
                println!("No players yet.");
                return Ok(());
            }
            println!(
                "{:<24} {:>8} {:>6} {:>8} {:>7}",
                "Player", "Events", "Titles", "Matches", "Points"
            );
            for career in careers {
                println!(
                    "{:<24} {:>8} {:>6} {:>8} {:>7.1}",
                    career.name,
                    career.participations,
                    career.titles,
                    career.matches_played,
                    career.points
                );
            }
        }
    }

    Ok(())
}
