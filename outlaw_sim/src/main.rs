//! Concurrent shootout simulator.
//!
//! Spawns a batch of matches through the MatchManager and plays each one
//! with bots, one tokio task per match, then prints a JSON report.

mod bot;
mod config;
mod driver;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Error;
use config::{Overrides, SimConfig};
use ctrlc::set_handler;
use driver::{Drive, MatchReport};
use log::info;
use outlaw::{PlayerId, Seat, table::MatchManager};
use pico_args::Arguments;
use serde::Serialize;

const HELP: &str = "\
Simulate concurrent shootout matches with bot players

USAGE:
  outlaw_sim [OPTIONS]

OPTIONS:
  --matches       N     Matches to run in parallel   [default: env OUTLAW_MATCHES or 4]
  --players       N     Players per match, 4 to 7     [default: env OUTLAW_PLAYERS or 5]
  --seed          N     Base seed for reproducible runs [default: env OUTLAW_SEED or random]
  --max-commands  N     Commands before a match is reported unfinished [default: env OUTLAW_MAX_COMMANDS or 5000]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  RUST_LOG                       Log filter (default: info)
  OUTLAW_INBOX_CAPACITY          Match inbox size
  OUTLAW_NOTIFICATION_CAPACITY   Subscriber channel size
";

#[derive(Serialize)]
struct Summary {
    matches: usize,
    finished: usize,
    reports: Vec<MatchReport>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let config = SimConfig::from_env(Overrides {
        matches: pargs.opt_value_from_str("--matches")?,
        players: pargs.opt_value_from_str("--players")?,
        seed: pargs.opt_value_from_str("--seed")?,
        max_commands: pargs.opt_value_from_str("--max-commands")?,
    });
    config.validate()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    // A first Ctrl-C lets running matches stop at their next command.
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    set_handler(move || {
        if flag.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
    })?;

    info!(
        "Simulating {} match(es) of {} players",
        config.matches, config.players
    );

    let manager = MatchManager::new();
    let mut tasks = Vec::with_capacity(config.matches);
    for i in 0..config.matches {
        let roster: Vec<Seat> = (0..config.players)
            .map(|seat| Seat::new(&format!("m{i}-p{seat}"), &format!("Bot {seat}")))
            .collect();
        let players: Vec<PlayerId> = roster.iter().map(|s| s.id.clone()).collect();
        let match_config = config.match_config(i);
        let seed = match_config.seed;

        let (match_id, _) = manager.create_match(roster, match_config).await?;
        let drive = Drive {
            match_id,
            players,
            seed,
            max_commands: config.max_commands,
            shutdown: shutdown.clone(),
        };
        tasks.push(tokio::spawn(driver::drive(manager.clone(), drive)));
    }

    let mut reports = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await? {
            Ok(report) => {
                match (&report.team, &report.winner) {
                    (Some(team), Some(winner)) => {
                        info!("Match {}: {winner} wins alone as {team}", report.match_id)
                    }
                    (Some(team), None) => info!("Match {}: {team} win", report.match_id),
                    _ => info!("Match {}: unfinished", report.match_id),
                }
                reports.push(report);
            }
            Err(e) => log::error!("Simulation failed: {e:#}"),
        }
    }

    let swept = manager.remove_finished().await;
    if swept > 0 {
        info!("Closed {swept} match(es) still registered");
    }

    let summary = Summary {
        matches: config.matches,
        finished: reports.iter().filter(|r| r.finished).count(),
        reports,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
