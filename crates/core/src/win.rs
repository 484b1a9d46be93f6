//! Terminal-state evaluation, pure over [`GameState`].

use crate::config::TimeLimitPolicy;
use crate::state::{GameState, Outcome};

/// Attacker victory check, run after every resolved action. The goal ends
/// the run immediately, mid-phase.
pub(crate) fn goal(state: &GameState, win_exfil: u32) -> Option<Outcome> {
    (state.attacker.exfil_value >= win_exfil).then_some(Outcome::AttackerGoal)
}

/// Outcome at the turn boundary once the turn limit is exhausted. The
/// boundary is explicit: the run ends instead of opening a new attacker
/// phase past the limit.
pub(crate) fn time_limit(state: &GameState, policy: TimeLimitPolicy) -> Outcome {
    match policy {
        TimeLimitPolicy::DefenderHolds => Outcome::DefenderHolds,
        TimeLimitPolicy::DamageThreshold(threshold) => {
            if state.attacker.exfil_value >= threshold {
                Outcome::AttackerDamage
            } else {
                Outcome::DefenderHolds
            }
        }
    }
}
