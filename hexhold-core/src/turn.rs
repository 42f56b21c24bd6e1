//! Round/turn state machine

use crate::ai::AiOpponent;
use crate::game::{GameState, MatchOutcome};
use crate::persist::{PersistenceGateway, StateStore};
use crate::player::PlayerId;
use crate::units::UnitId;

/// Gold at the start of a match
pub const STARTING_GOLD: i64 = 100;

/// Gold earned per human-owned tile each round
pub const INCOME_PER_TILE: i64 = 5;

/// Round, turn slot, and gold counters.
///
/// Round and turn index only advance forward except on explicit reset or
/// load; mutation happens exclusively in [`TurnEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnState {
    /// Round number, starting at 1
    pub round: u32,
    /// Index into the ordered turn roster; 0 is the human
    pub turn_index: usize,
    /// The human player's resource counter
    pub gold: i64,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            round: 1,
            turn_index: 0,
            gold: STARTING_GOLD,
        }
    }
}

impl TurnState {
    pub fn phase(&self) -> TurnPhase {
        if self.turn_index == 0 {
            TurnPhase::HumanTurn
        } else {
            TurnPhase::AiTurn(self.turn_index - 1)
        }
    }
}

/// Whose action window is open
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    HumanTurn,
    /// AI slot by registration index (0-based)
    AiTurn(usize),
}

/// Collaborator notified once per round, after the round counter advances.
/// The tier/progression UI hangs off this.
pub trait Progression: Send {
    fn round_started(&mut self, round: u32);
}

/// Summary of one `advance_turn` call
#[derive(Clone, Copy, Debug)]
pub struct TurnReport {
    /// False when the call was a stale trigger outside the human turn
    pub advanced: bool,
    pub income: i64,
    pub round: u32,
    pub outcome: MatchOutcome,
}

/// Drives rounds: human refresh, territory income, AI turns in registration
/// order, then the durable snapshot.
///
/// The whole sequence runs to completion inside one call; a second trigger
/// cannot interleave because the engine is borrowed mutably for the duration.
pub struct TurnEngine {
    ais: Vec<Box<dyn AiOpponent>>,
    progression: Option<Box<dyn Progression>>,
}

impl TurnEngine {
    pub fn new(ais: Vec<Box<dyn AiOpponent>>) -> Self {
        Self {
            ais,
            progression: None,
        }
    }

    pub fn with_progression(mut self, hook: Box<dyn Progression>) -> Self {
        self.progression = Some(hook);
        self
    }

    pub fn ai_count(&self) -> usize {
        self.ais.len()
    }

    /// Run one full round from the human's "end turn" trigger.
    ///
    /// Outside the human turn this refreshes nothing, pays nothing, and
    /// advances nothing; it only re-evaluates the outcome and re-persists.
    pub async fn advance_turn<S: StateStore>(
        &mut self,
        state: &mut GameState,
        gateway: &PersistenceGateway<S>,
    ) -> TurnReport {
        if state.turn.phase() != TurnPhase::HumanTurn {
            let outcome = state.evaluate_outcome();
            gateway.save_snapshot(state).await;
            return TurnReport {
                advanced: false,
                income: 0,
                round: state.turn.round,
                outcome,
            };
        }

        state.clear_selection();

        // 1. refresh the human's units; AI units are refreshed by their own
        // policies inside their turns
        let ids: Vec<UnitId> = state
            .units
            .owned_by(PlayerId::Human)
            .map(|u| u.id)
            .collect();
        for id in ids {
            state.units.refresh_moves(id);
        }

        // 2. income scales with held territory
        let income = INCOME_PER_TILE * state.grid.owned_count(PlayerId::Human) as i64;
        state.turn.gold += income;

        // 3. each AI acts in registration order; one failing AI never blocks
        // the ones after it
        for (i, ai) in self.ais.iter_mut().enumerate() {
            state.turn.turn_index = i + 1;
            ai.new_turn();
            if let Err(err) = ai.take_turn(state) {
                tracing::warn!("{} turn failed: {err}", ai.id());
            }
        }

        // 4. back to the human
        state.turn.round += 1;
        state.turn.turn_index = 0;

        // 5. unlock evaluation, exactly once per round, after the increment
        if let Some(hook) = self.progression.as_mut() {
            hook.round_started(state.turn.round);
        }

        // 6. win/lose from tile ownership
        let outcome = state.evaluate_outcome();

        // 7. durable snapshot; failures are logged inside, never propagated
        gateway.save_snapshot(state).await;

        TurnReport {
            advanced: true,
            income,
            round: state.turn.round,
            outcome,
        }
    }
}
