// Standalone replay tool for analyzing Halite debug logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all turns
//   --turns <turn1,turn2>  Replay specific turns (comma-separated)
//   --validate             Check logged moves against expectations
//   --verbose              Show detailed output for each turn
//   --config <path>        Path to Overkill.toml (default: Overkill.toml)

use std::env;
use std::process;

// Import from the main crate
use overkill_bot::config::Config;
use overkill_bot::replay::ReplayEngine;
use overkill_bot::types::{Coord, Direction};

fn print_usage() {
    eprintln!("Halite Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all turns in the log");
    eprintln!("  --turns <T1,T2,...>     Replay specific turns (comma-separated)");
    eprintln!("  --validate <SPEC>       Validate logged moves (format: turn@x,y:move;...)");
    eprintln!("  --verbose               Show detailed output for each turn");
    eprintln!("  --config <path>         Path to Overkill.toml (default: Overkill.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all turns");
    eprintln!("  replay overkill_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Replay specific turns");
    eprintln!("  replay overkill_debug.jsonl --turns 5,10,15");
    eprintln!();
    eprintln!("  # Validate expected moves (alternatives separated by '|')");
    eprintln!("  replay overkill_debug.jsonl --validate '5@3,4:north|east;10@0,0:stay'");
}

fn parse_turns(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

/// Parses "turn@x,y:move|move;..." into (turn, cell, acceptable moves)
fn parse_expected_moves(s: &str) -> Result<Vec<(u32, Coord, Vec<Direction>)>, String> {
    s.split(';')
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            let (turn_part, rest) = item
                .trim()
                .split_once('@')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn@x,y:move'", item))?;
            let (cell_part, moves_part) = rest
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn@x,y:move'", item))?;
            let (x, y) = cell_part
                .split_once(',')
                .ok_or_else(|| format!("Invalid cell '{}'. Expected 'x,y'", cell_part))?;

            let turn = turn_part
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn_part, e))?;
            let x = x
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid x '{}': {}", x, e))?;
            let y = y
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid y '{}': {}", y, e))?;

            let moves: Result<Vec<Direction>, String> = moves_part
                .split('|')
                .map(ReplayEngine::parse_direction)
                .collect();

            Ok((turn, Coord::new(x, y), moves?))
        })
        .collect()
}

/// Value following a flag, or exit with a usage error
fn flag_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(v) => v.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

enum Mode {
    All,
    Turns(String),
    Validate(String),
}

fn main() {
    // Initialize logger
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut config_path = "Overkill.toml".to_string();
    let mut verbose = false;
    let mut mode = None;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--turns" => {
                mode = Some(Mode::Turns(flag_value(&args, i, "--turns")));
                i += 1;
            }
            "--validate" => {
                mode = Some(Mode::Validate(flag_value(&args, i, "--validate")));
                i += 1;
            }
            "--config" => {
                config_path = flag_value(&args, i, "--config");
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = match mode {
        Some(m) => m,
        None => {
            eprintln!("Error: Must specify --all, --turns, or --validate");
            print_usage();
            process::exit(1);
        }
    };

    // Load configuration
    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    // Create replay engine
    let engine = ReplayEngine::new(config, verbose);

    // Load log file
    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    // Execute based on mode
    match mode {
        Mode::All => {
            println!("Replaying all {} turns...\n", entries.len());
            match engine.replay_all(&entries) {
                Ok(results) => engine.print_report(&results),
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Turns(turn_arg) => {
            let turns = match parse_turns(&turn_arg) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Error parsing turns: {}", e);
                    process::exit(1);
                }
            };

            println!("Replaying {} specific turn(s)...\n", turns.len());
            match engine.replay_turns(&entries, &turns) {
                Ok(results) => engine.print_report(&results),
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Validate(validate_arg) => {
            let expected_moves = match parse_expected_moves(&validate_arg) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error parsing expected moves: {}", e);
                    process::exit(1);
                }
            };

            println!("Validating {} expected move(s)...\n", expected_moves.len());
            match engine.validate_expected_moves(&entries, &expected_moves) {
                Ok(()) => {
                    println!("✓ All expected moves validated successfully!");
                }
                Err(e) => {
                    eprintln!("✗ Validation failed: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
