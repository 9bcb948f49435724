//! Pivotsat is the branching-decision core of a [CDCL][cdcl] based SAT
//! solver. Given a partial assignment it selects the next unassigned variable
//! to branch on, chooses the phase to try first and opens a new decision
//! level, so that conflict analysis can later backtrack to that point.
//!
//! Two variable orders are maintained side by side: a recency ordered queue
//! used in focused search and an activity ordered max-heap used in stable
//! search. The decision phase is taken from the first applicable of oracle
//! advice, target phase, saved phase and the configured initial phase. An
//! external decision oracle can be installed to override variable selection,
//! with translation between external and internal variable names.
//!
//! Constraint propagation, conflict analysis and restart scheduling are the
//! job of the surrounding solver, which drives this engine through
//! [`DecisionEngine`].
//!
//! [cdcl]: https://en.wikipedia.org/wiki/Conflict-Driven_Clause_Learning

pub mod config;
pub mod engine;

mod context;
mod decision;
mod oracle;
mod phases;
mod prop;
mod state;
mod stats;
mod variables;

pub use pivotsat_formula::{lit, Lit, Var};

pub use crate::engine::DecisionEngine;
pub use crate::oracle::{DecisionOracle, OracleView};
pub use crate::prop::{Assignment, Frame, Trail};
pub use crate::state::SearchMode;
pub use crate::stats::Stats;
pub use crate::variables::{ExtQueryError, Variables};
