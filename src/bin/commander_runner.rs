//! Headless Commander Runner
//!
//! Pits two commander profiles against each other on the sandbox skirmish
//! map and prints a JSON (or text) summary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use war_commander::bdi::{BdiCommander, CommanderStats, DesireKind};
use war_commander::core::config::{load_config, CommanderConfig};
use war_commander::core::error::Result;
use war_commander::core::types::TeamId;
use war_commander::sandbox::{skirmish, Battlefield, BLUE, RED};
use war_commander::team::TeamAi;

/// Headless Commander Runner - BDI vs BDI skirmishes
#[derive(Parser, Debug)]
#[command(name = "commander_runner")]
#[command(about = "Run two BDI commanders against each other on the sandbox map")]
struct Args {
    /// Blue commander profile (loaded from data/commanders/)
    #[arg(long, default_value = "default")]
    blue: String,

    /// Red commander profile (loaded from data/commanders/)
    #[arg(long, default_value = "default")]
    red: String,

    /// Ticks to simulate
    #[arg(long, default_value_t = 2400)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.25)]
    delta: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Also write the JSON summary to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log every intention change and plan status
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct SideResult {
    profile: String,
    survivors: usize,
    camps_held: usize,
    stats: CommanderStats,
    final_desire: Option<DesireKind>,
}

#[derive(Serialize)]
struct RunResult {
    outcome: String,
    ticks: u64,
    seconds: f32,
    seed: u64,
    blue: SideResult,
    red: SideResult,
}

fn load_or_default(name: &str) -> CommanderConfig {
    load_config(name).unwrap_or_else(|e| {
        tracing::warn!("Failed to load commander profile '{}': {}", name, e);
        tracing::warn!("Using default profile");
        CommanderConfig::default()
    })
}

fn side_result(field: &Battlefield, team: TeamId, commander: &BdiCommander) -> SideResult {
    SideResult {
        profile: commander.name().to_string(),
        survivors: field.units_of(team).count(),
        camps_held: field.camps_owned_by(team),
        stats: commander.stats().clone(),
        final_desire: commander.current_desire(),
    }
}

fn outcome(field: &Battlefield) -> String {
    let blue = field.units_of(BLUE).count();
    let red = field.units_of(RED).count();
    match (blue, red) {
        (0, 0) => "Draw".to_string(),
        (_, 0) => "BlueVictory".to_string(),
        (0, _) => "RedVictory".to_string(),
        _ => "Undecided".to_string(),
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);

    let blue_config = load_or_default(&args.blue);
    let red_config = load_or_default(&args.red);

    let mut field = skirmish(blue_config.map.clone(), seed);
    let mut blue = BdiCommander::with_seed(blue_config, seed);
    let mut red = BdiCommander::with_seed(red_config, seed.wrapping_add(1));

    let mut ticks = 0;
    while ticks < args.ticks {
        for (team, commander) in [(BLUE, &mut blue), (RED, &mut red)] {
            let sightings = field.sightings(team);
            let orders = commander.process_tick(&field.view(team), sightings, args.delta);
            field.apply_orders(team, &orders);
        }
        field.step(args.delta);
        ticks += 1;

        if field.units_of(BLUE).next().is_none() || field.units_of(RED).next().is_none() {
            break;
        }
    }

    let result = RunResult {
        outcome: outcome(&field),
        ticks,
        seconds: field.clock(),
        seed,
        blue: side_result(&field, BLUE, &blue),
        red: side_result(&field, RED, &red),
    };

    match args.format.as_str() {
        "text" => print_text(&result),
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            match to_json(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("{}", e),
            }
        }
    }

    if let Some(path) = &args.output {
        match write_json(&result, path) {
            Ok(()) => tracing::info!("Summary written to {}", path.display()),
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = to_json(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn print_text(result: &RunResult) {
    println!("Skirmish Result");
    println!("===============");
    println!("Outcome: {}", result.outcome);
    println!("Ticks: {} ({:.1}s)", result.ticks, result.seconds);
    for (label, side) in [("Blue", &result.blue), ("Red", &result.red)] {
        println!();
        println!("{} ({})", label, side.profile);
        println!("  Survivors: {}", side.survivors);
        println!("  Camps held: {}", side.camps_held);
        println!("  Deliberations: {}", side.stats.deliberations);
        println!("  Orders issued: {}", side.stats.orders_issued);
        println!(
            "  Intentions timed out / invalidated: {} / {}",
            side.stats.timed_out, side.stats.invalidated
        );
        let adoptions: BTreeMap<&str, u64> = side
            .stats
            .adoptions
            .iter()
            .map(|(desire, count)| (desire.name(), *count))
            .collect();
        println!("  Adoptions: {:?}", adoptions);
    }
    println!();
    println!("Seed: {}", result.seed);
}
