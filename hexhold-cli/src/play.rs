//! Interactive terminal play
//!
//! Reads one command per line from stdin and maps each onto a session
//! trigger. State persists under the data directory via the file store, so
//! quitting and re-running picks up where the match left off.

use anyhow::{Context, Result};
use hexhold_core::{GameSession, GameState, Hex, LevelData, MatchOutcome, PlayerId, UnitId};
use hexhold_store::FileStore;
use std::io::{self, BufRead};
use std::path::Path;

pub async fn run(level_path: &Path, data_dir: &Path, seed: u64) -> Result<()> {
    let level = LevelData::load(level_path)?;
    let level_name = level_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "level".to_string());

    let store = FileStore::new(data_dir);
    // Setup failures surface here as a diagnostic instead of a silent crash
    let mut session = GameSession::start(level, store, &level_name, seed)
        .await
        .with_context(|| format!("could not start session for {level_name:?}"))?;

    println!("HEXHOLD - {level_name}");
    print_help();
    print_status(session.state());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["help"] => print_help(),
            ["status"] => print_status(session.state()),
            ["board"] => print_board(session.state()),
            ["end"] => {
                let report = session.end_turn().await;
                println!(
                    "round {} begins (+{} gold, {} total)",
                    report.round,
                    report.income,
                    session.state().turn().gold
                );
                if report.outcome != MatchOutcome::Ongoing {
                    println!("match over: {:?}", report.outcome);
                }
            }
            ["select", id] => match parse_id(id) {
                Some(id) => match session.select_unit(id) {
                    Ok(hexes) => {
                        let spots: Vec<String> = hexes.iter().map(|h| h.to_string()).collect();
                        println!("unit {id} can reach: {}", spots.join(" "));
                    }
                    Err(err) => println!("cannot select: {err}"),
                },
                None => println!("usage: select <unit-id>"),
            },
            ["move", id, q, r] => match (parse_id(id), parse_hex(q, r)) {
                (Some(id), Some(to)) => match session.move_unit(id, to) {
                    Ok(()) => println!("unit {id} now holds {to}"),
                    Err(err) => println!("cannot move: {err}"),
                },
                _ => println!("usage: move <unit-id> <q> <r>"),
            },
            ["attack", attacker, victim] => match (parse_id(attacker), parse_id(victim)) {
                (Some(a), Some(v)) => match session.attack(a, v) {
                    Ok(outcome) => println!("attack: {outcome:?}"),
                    Err(err) => println!("cannot attack: {err}"),
                },
                _ => println!("usage: attack <attacker-id> <victim-id>"),
            },
            ["recruit", kind, q, r] => match parse_hex(q, r) {
                Some(pos) => match session.recruit(kind, pos) {
                    Ok(id) => println!("recruited {kind} {id} at {pos}"),
                    Err(err) => println!("cannot recruit: {err}"),
                },
                None => println!("usage: recruit <kind> <q> <r>"),
            },
            ["save"] => {
                session.save().await;
                println!("checkpoint saved");
            }
            ["load"] => {
                session.load().await;
                println!("checkpoint loaded");
                print_status(session.state());
            }
            ["reset"] => {
                session.reset().await;
                println!("match reset");
                print_status(session.state());
            }
            ["quit"] | ["exit"] => break,
            _ => println!("unrecognized command, try 'help'"),
        }
    }

    Ok(())
}

fn parse_id(s: &str) -> Option<UnitId> {
    s.parse().ok()
}

fn parse_hex(q: &str, r: &str) -> Option<Hex> {
    Some(Hex::new(q.parse().ok()?, r.parse().ok()?))
}

fn print_help() {
    println!("commands:");
    println!("  status                     round, gold, holdings");
    println!("  board                      every tile and its occupant");
    println!("  select <unit>              show a unit's movement range");
    println!("  move <unit> <q> <r>        move and claim the tile");
    println!("  attack <unit> <victim>     attack a unit in range");
    println!("  recruit <kind> <q> <r>     buy a unit onto an owned tile");
    println!("  end                        end your turn, let the AIs act");
    println!("  save / load / reset        checkpoint control");
    println!("  quit");
}

fn print_status(state: &GameState) {
    let turn = state.turn();
    println!(
        "round {} | gold {} | tiles: you {} vs AIs {} | units {}",
        turn.round,
        turn.gold,
        state.grid().owned_count(PlayerId::Human),
        state.grid().ai_owned_count(),
        state.units().len()
    );
}

fn print_board(state: &GameState) {
    for (hex, tile) in state.grid().tiles() {
        let pos = hex.to_string();
        let owner = tile
            .owner
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        match state.units().unit_at(hex) {
            Some(unit) => println!(
                "{pos:10} {owner:10} unit {} ({} hp, {} moves, {})",
                unit.id, unit.health, unit.moves_left, unit.owner
            ),
            None => println!("{pos:10} {owner:10}"),
        }
    }
}
