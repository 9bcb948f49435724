//! Decision statistics.

/// Counters for decisions and the phase sources that produced them.
///
/// These are observability only; no decision depends on them.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    /// Heuristic decisions made.
    pub decisions: u64,
    /// Decisions made while in stable mode.
    pub stable_decisions: u64,
    /// Decisions made while in focused mode.
    pub focused_decisions: u64,
    /// Decisions whose variable came from the external oracle.
    pub oracle_decisions: u64,
    /// Oracle suggestions that named an already assigned variable.
    pub oracle_misuse: u64,
    /// Decisions that used the target phase.
    pub target_decisions: u64,
    /// Decisions that used the saved phase.
    pub saved_decisions: u64,
    /// Decisions that fell back to the initial phase.
    pub initial_decisions: u64,
}
