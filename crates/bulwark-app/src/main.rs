//! bulwark: headless driver for the BULWARK simulation.
//!
//! Usage:
//!   bulwark run  [--config game.json] [--seed N] [--units N] [--max-ticks N] [--json]
//!   bulwark live [--config game.json] [--seed N] [--secs N]

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use bulwark_app::control;
use bulwark_app::session::{self, SessionOptions};
use bulwark_app::state::AppState;
use bulwark_core::commands::PlayerCommand;
use bulwark_core::config::GameConfig;
use bulwark_sim::engine::SimConfig;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "live" => cmd_live(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "bulwark: BULWARK tower-defense simulation driver\n\
         \n\
         Commands:\n\
         \n\
         run   Play one scripted round as fast as possible and print a summary\n\
         \n\
           --config <path>   JSON game config (optional, defaults built in)\n\
           --seed <N>        RNG seed (default: 42)\n\
           --units <N>       Player units to buy before the round (default: 4)\n\
           --max-ticks <N>   Tick cap for the round (default: 9000)\n\
           --json            Print the summary as JSON\n\
         \n\
         live  Run the threaded 30Hz game loop for a few seconds\n\
         \n\
           --config <path>   JSON game config\n\
           --seed <N>        RNG seed\n\
           --secs <N>        Wall-clock seconds to run (default: 5)\n\
         \n\
         Examples:\n\
         \n\
           bulwark run --seed 7 --units 6\n\
           RUST_LOG=info bulwark live --config game.json --secs 10\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Error: {flag} expects a number, got `{raw}`");
                process::exit(1);
            }
        },
    }
}

fn load_config(args: &[String]) -> SimConfig {
    let game = match flag_value(args, "--config").map(PathBuf::from) {
        Some(path) => match GameConfig::load(&path) {
            Ok(game) => game,
            Err(e) => {
                eprintln!("Error: failed to load {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    SimConfig {
        seed: parse_number(args, "--seed", 42u64),
        game,
        ..Default::default()
    }
}

fn cmd_run(args: &[String]) {
    let config = load_config(args);
    let defaults = SessionOptions::default();
    let options = SessionOptions {
        units: parse_number(args, "--units", defaults.units),
        max_ticks: parse_number(args, "--max-ticks", defaults.max_ticks),
    };

    let summary = session::run_scripted(config, options);

    if args.iter().any(|a| a == "--json") {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: failed to encode summary: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!("Session finished after {} ticks ({:.1}s)", summary.ticks, summary.elapsed_secs);
    println!("  Round state:      {:?}", summary.round_state);
    println!("  Rounds completed: {}", summary.rounds_completed);
    println!("  Money:            {}", summary.money);
    println!("  Units spawned:    {}", summary.units_spawned);
    println!("  Units lost:       {}", summary.players_lost);
    println!(
        "  Enemies:          {} spawned, {} removed",
        summary.enemies_spawned, summary.enemies_removed
    );
    println!("  Attacks:          {}", summary.attacks);
    if summary.firedoor_destroyed {
        println!("  The firedoor fell.");
    }
}

fn cmd_live(args: &[String]) {
    let config = load_config(args);
    let secs: u64 = parse_number(args, "--secs", 5);
    let clicks = config.game.thresholds.required_clicks_to_start;
    let state = AppState::new();

    if let Err(e) = control::start_simulation(&state, config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let script = std::iter::repeat(PlayerCommand::Mine)
        .take(20)
        .chain(std::iter::repeat(PlayerCommand::SpawnUnit { code: None }).take(3))
        .chain(std::iter::repeat(PlayerCommand::Click).take(clicks as usize));
    for command in script {
        if let Err(e) = control::send_command(&state, command) {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }

    for _ in 0..secs {
        std::thread::sleep(Duration::from_secs(1));
        match control::get_snapshot(&state) {
            Ok(Some(snap)) => println!(
                "t={:>6.1}s  round={:?}  money={}  players={}  enemies={}",
                snap.time.elapsed_secs,
                snap.round.state,
                snap.round.money,
                snap.round.players_alive,
                snap.round.enemies_alive
            ),
            Ok(None) => println!("waiting for first tick"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }

    if let Err(e) = control::stop_simulation(&state) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
