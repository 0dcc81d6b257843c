//! Season CLI
//!
//! Drives season_core from the command line and prints JSON.

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

use season_core::models::{
    CompetitionKind, MatchRecord, Position, RosterEntry, SideSetup, SwissTeam, TeamId, Tie,
};
use season_core::{
    matchday_count, KnockoutResolver, LeagueResult, MatchEngine, RoundRobinScheduler, SimConfig, StandingsTable,
    SwissDraw,
};

const LINEUP: [&str; 11] = ["GK", "LB", "CB", "CB", "RB", "DM", "CM", "AM", "LW", "RW", "ST"];
const COUNTRIES: [&str; 12] = ["ENG", "ESP", "GER", "ITA", "FRA", "POR", "NED", "BEL", "SCO", "AUT", "SUI", "CZE"];

#[derive(Parser)]
#[command(name = "season")]
#[command(about = "Schedule, simulate and rank a football season", long_about = None)]
struct Cli {
    /// RNG seed (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Simulation config (.yaml, .yml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a double round-robin fixture list
    RoundRobin {
        /// Number of teams (even, at least 4)
        #[arg(long, default_value = "20")]
        teams: usize,

        /// Date of the first matchday
        #[arg(long, default_value = "2025-08-16")]
        start: NaiveDate,

        /// Days between matchdays
        #[arg(long, default_value = "7")]
        interval_days: i64,
    },

    /// Draw a synthetic 36-team Swiss league phase
    Swiss {
        /// Date of round 1
        #[arg(long, default_value = "2025-09-16")]
        start: NaiveDate,

        /// Days between rounds
        #[arg(long, default_value = "14")]
        interval_days: i64,
    },

    /// Play a full double round-robin season and print the final table
    League {
        /// Number of teams (even, at least 4)
        #[arg(long, default_value = "10")]
        teams: usize,

        /// Include every match result in the output
        #[arg(long, default_value = "false")]
        results: bool,
    },

    /// Play and resolve a two-legged tie
    Tie {
        /// Strength of the side hosting the first leg
        #[arg(long, default_value = "60")]
        home_strength: f64,

        /// Strength of the side hosting the second leg
        #[arg(long, default_value = "60")]
        away_strength: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };
    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let output = match cli.command {
        Commands::RoundRobin { teams, start, interval_days } => {
            let ids: Vec<TeamId> = (1..=teams as TeamId).collect();
            let dates = calendar(start, interval_days, matchday_count(teams))?;
            let fixtures = RoundRobinScheduler::new().generate(&ids, &dates, &mut rng)?;
            log::info!("{} fixtures over {} matchdays", fixtures.len(), dates.len());
            serde_json::to_string_pretty(&fixtures)?
        }

        Commands::Swiss { start, interval_days } => {
            let teams: Vec<SwissTeam> = (0..36u32)
                .map(|i| SwissTeam::new(i + 1, (i / 9) as u8 + 1, COUNTRIES[(i as usize * 7) % COUNTRIES.len()]))
                .collect();
            let draw = SwissDraw::new(config.swiss.clone());
            let fixtures = draw
                .generate(&teams, start, Duration::days(interval_days), &mut rng)
                .context("Swiss draw failed")?;
            serde_json::to_string_pretty(&fixtures)?
        }

        Commands::League { teams, results } => {
            let (table, records) = play_league(&config, teams, &mut rng)?;
            if results {
                let played: Vec<LeagueResult> = records.iter().map(LeagueResult::from_match).collect();
                serde_json::to_string_pretty(&serde_json::json!({ "table": table, "results": played }))?
            } else {
                serde_json::to_string_pretty(&table)?
            }
        }

        Commands::Tie { home_strength, away_strength } => {
            let engine = MatchEngine::new(&config);
            let resolver = KnockoutResolver::new(engine.clone());
            let mut tie = Tie::two_legged(1, 1, 1, 2, 1, 2);
            let mut legs = [
                MatchRecord::new(1, CompetitionKind::Cup(1), 1, side(1, home_strength)?, side(2, away_strength)?),
                MatchRecord::new(2, CompetitionKind::Cup(1), 1, side(2, away_strength)?, side(1, home_strength)?),
            ];
            for leg in legs.iter_mut() {
                let result = engine.simulate(&leg.home.sheet(), &leg.away.sheet(), &mut rng);
                leg.record_result(result.home_goals, result.away_goals, result.events);
            }
            resolver.resolve(&mut tie, &legs[0], Some(&legs[1]), &mut rng)?;
            serde_json::to_string_pretty(&serde_json::json!({ "legs": legs, "tie": tie }))?
        }
    };

    println!("{output}");
    Ok(())
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => SimConfig::from_json_str(&text),
        Some("yaml") | Some("yml") => SimConfig::from_yaml_str(&text),
        _ => bail!("unsupported config extension: {}", path.display()),
    };
    config.with_context(|| format!("loading config {}", path.display()))
}

fn calendar(start: NaiveDate, interval_days: i64, count: usize) -> Result<Vec<NaiveDate>> {
    (0..count as i64)
        .map(|i| {
            start
                .checked_add_signed(Duration::days(interval_days * i))
                .with_context(|| format!("matchday {} out of date range", i + 1))
        })
        .collect()
}

fn side(team: TeamId, strength: f64) -> Result<SideSetup> {
    let lineup = LINEUP
        .iter()
        .enumerate()
        .map(|(i, label)| -> Result<RosterEntry> {
            Ok(RosterEntry::new(team * 100 + i as u32, label.parse::<Position>()?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SideSetup::new(team, strength, lineup))
}

fn play_league(config: &SimConfig, teams: usize, rng: &mut ChaCha8Rng) -> Result<(StandingsTable, Vec<MatchRecord>)> {
    let ids: Vec<TeamId> = (1..=teams as TeamId).collect();
    let start = NaiveDate::from_ymd_opt(2025, 8, 16).context("season start date")?;
    let dates = calendar(start, 7, matchday_count(teams))?;
    let fixtures = RoundRobinScheduler::new().generate(&ids, &dates, rng)?;

    let engine = MatchEngine::new(config);
    let mut table = StandingsTable::new(1, &ids)?;
    let mut records = Vec::with_capacity(fixtures.len());
    for (i, fixture) in fixtures.iter().enumerate() {
        // Lower ids are stronger
        let strength = |team: TeamId| 80.0 - 3.0 * f64::from(team);
        let mut record = MatchRecord::from_fixture(
            i as u32 + 1,
            CompetitionKind::League(1),
            fixture,
            side(fixture.home_team_id, strength(fixture.home_team_id))?,
            side(fixture.away_team_id, strength(fixture.away_team_id))?,
        );
        let result = engine.simulate(&record.home.sheet(), &record.away.sheet(), rng);
        record.record_result(result.home_goals, result.away_goals, result.events);
        table.apply(&LeagueResult::from_match(&record))?;
        records.push(record);
    }
    log::info!("{} matches played", records.len());
    Ok((table, records))
}
