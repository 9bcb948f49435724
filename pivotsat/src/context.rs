//! Central engine data structure.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::config::DecisionConfig;
use crate::decision::queue::DecideQueue;
use crate::decision::scores::ScoreHeap;
use crate::oracle::OracleSlot;
use crate::phases::Phases;
use crate::prop::{Assignment, Trail};
use crate::state::SearchState;
use crate::stats::Stats;
use crate::variables::Variables;

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub ConfigP: DecisionConfig);
    part!(pub OracleP: OracleSlot);
    part!(pub PhasesP: Phases);
    part!(pub QueueP: DecideQueue);
    part!(pub ScoresP: ScoreHeap);
    part!(pub SearchStateP: SearchState);
    part!(pub StatsP: Stats);
    part!(pub TrailP: Trail);
    part!(pub VariablesP: Variables);
}

pub use parts::*;

/// Central engine data structure.
///
/// This struct contains all data kept by the decision engine. Most functions
/// operating on multiple fields of the context use partial references
/// provided by the `partial_ref` crate. This documents the data dependencies
/// and makes the borrow checker happy without the overhead of passing
/// individual references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part = "AssignmentP"]
    assignment: Assignment,
    #[part = "ConfigP"]
    config: DecisionConfig,
    #[part = "OracleP"]
    oracle: OracleSlot,
    #[part = "PhasesP"]
    phases: Phases,
    #[part = "QueueP"]
    queue: DecideQueue,
    #[part = "ScoresP"]
    scores: ScoreHeap,
    #[part = "SearchStateP"]
    search_state: SearchState,
    #[part = "StatsP"]
    stats: Stats,
    #[part = "TrailP"]
    trail: Trail,
    #[part = "VariablesP"]
    variables: Variables,
}

impl Context {
    /// Access the engine configuration.
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Mutable access to the engine configuration.
    pub fn config_mut(&mut self) -> &mut DecisionConfig {
        &mut self.config
    }
}

/// Update structures for a new variable count.
///
/// New variables enter both decision orders unassigned.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut PhasesP,
        mut QueueP,
        mut ScoresP,
    ),
    count: usize,
) {
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(PhasesP).set_var_count(count);
    ctx.part_mut(QueueP).set_var_count(count);
    ctx.part_mut(ScoresP).set_var_count(count);
}

/// Increases the variable count to at least the given value.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut PhasesP,
        mut QueueP,
        mut ScoresP,
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).var_count() {
        set_var_count(ctx.borrow(), count)
    }
}
