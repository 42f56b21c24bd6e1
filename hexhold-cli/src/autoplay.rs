//! Headless autoplay
//!
//! The human sits idle while rounds run, which is a quick way to watch AIs
//! fight over a level and to smoke-test level files.

use anyhow::Result;
use hexhold_core::{GameSession, LevelData, MatchOutcome, MemoryStore, PlayerId};
use std::path::Path;

pub async fn run(level_path: &Path, rounds: u32, seed: u64) -> Result<()> {
    let level = LevelData::load(level_path)?;
    let mut session = GameSession::start(level, MemoryStore::default(), "autoplay", seed).await?;

    tracing::info!("autoplay: {} rounds, seed {}", rounds, seed);

    let mut outcome = MatchOutcome::Ongoing;
    for _ in 0..rounds {
        let report = session.end_turn().await;
        tracing::info!(
            "round {}: +{} gold, you {} vs AIs {} tiles",
            report.round,
            report.income,
            session.state().grid().owned_count(PlayerId::Human),
            session.state().grid().ai_owned_count()
        );
        outcome = report.outcome;
        if outcome != MatchOutcome::Ongoing {
            break;
        }
    }

    let state = session.state();
    println!(
        "finished at round {}: {:?} | gold {} | tiles: you {} vs AIs {} | units {}",
        state.turn().round,
        outcome,
        state.turn().gold,
        state.grid().owned_count(PlayerId::Human),
        state.grid().ai_owned_count(),
        state.units().len()
    );

    Ok(())
}
