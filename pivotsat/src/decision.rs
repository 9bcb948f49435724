//! Decision heuristics and decision-level bookkeeping.
//!
//! This is the engine's entry point: [`make_decision`] performs one complete
//! branching step, [`assume`] injects a caller-chosen literal instead, and
//! [`next_decision_variable`] exposes the variable selection on its own.
use log::trace;
use partial_ref::{partial, PartialRef};

use pivotsat_formula::{Lit, Var};

use crate::context::{parts::*, Context};
use crate::oracle::oracle_suggestion;
use crate::phases::decide_phase;
use crate::prop::{assign_decision, Trail};
use crate::state::SearchMode;

pub mod queue;
pub mod scores;

use queue::next_via_queue;
use scores::next_via_heap;

/// Make one heuristic decision: select a variable and phase, open a new
/// decision level and assign the decision literal.
///
/// At least one variable must be unassigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut OracleP,
        mut QueueP,
        mut ScoresP,
        mut StatsP,
        mut TrailP,
        ConfigP,
        PhasesP,
        SearchStateP,
        VariablesP,
    ),
) {
    assert!(
        ctx.part(AssignmentP).unassigned() > 0,
        "cannot decide with every variable assigned"
    );
    assert!(
        ctx.part(TrailP).current_level() < Trail::MAX_LEVEL,
        "decision level limit exceeded"
    );

    let mode = ctx.part(SearchStateP).mode;
    let stats = ctx.part_mut(StatsP);
    stats.decisions += 1;
    match mode {
        SearchMode::Stable => stats.stable_decisions += 1,
        SearchMode::Focused => stats.focused_decisions += 1,
    }

    let (var, advice) = select_decision_variable(ctx.borrow());
    let phase = decide_phase(ctx.borrow(), var, advice);
    let lit = var.lit(phase);

    trace!("decide literal {:?}", lit);
    assign_decision(ctx.borrow(), lit);
}

/// Assume a caller-supplied literal, bypassing variable and phase selection.
///
/// Opens a new decision level anchored by exactly this literal. Unlike a
/// heuristic decision this does not count towards the decision statistics.
/// The literal must be unassigned.
pub fn assume(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), lit: Lit) {
    assert!(
        ctx.part(AssignmentP).unassigned() > 0,
        "cannot assume with every variable assigned"
    );
    assert!(
        ctx.part(AssignmentP).lit_value(lit).is_none(),
        "assumed literal is already assigned"
    );
    assert!(
        ctx.part(TrailP).current_level() < Trail::MAX_LEVEL,
        "decision level limit exceeded"
    );

    trace!("assuming literal {:?}", lit);
    assign_decision(ctx.borrow(), lit);
}

/// Select the next decision variable without committing a decision.
pub fn next_decision_variable(
    ctx: partial!(
        Context,
        mut OracleP,
        mut QueueP,
        mut ScoresP,
        mut StatsP,
        AssignmentP,
        SearchStateP,
        TrailP,
        VariablesP,
    ),
) -> Var {
    select_decision_variable(ctx).0
}

/// Select the next decision variable together with any oracle phase advice.
///
/// An installed oracle runs first; when it defers or its suggestion is
/// unusable, the current search mode picks the heuristic order.
fn select_decision_variable(
    mut ctx: partial!(
        Context,
        mut OracleP,
        mut QueueP,
        mut ScoresP,
        mut StatsP,
        AssignmentP,
        SearchStateP,
        TrailP,
        VariablesP,
    ),
) -> (Var, Option<bool>) {
    if let Some((var, phase)) = oracle_suggestion(ctx.borrow()) {
        trace!("next decision {:?} by oracle", var);
        return (var, Some(phase));
    }

    let var = match ctx.part(SearchStateP).mode {
        SearchMode::Stable => next_via_heap(ctx.borrow()),
        SearchMode::Focused => next_via_queue(ctx.borrow()),
    };
    trace!("next decision {:?}", var);
    (var, None)
}

/// Remove a variable from both decision orders.
///
/// Used when preprocessing eliminates the variable.
pub fn remove_var(mut ctx: partial!(Context, mut QueueP, mut ScoresP), var: Var) {
    ctx.part_mut(QueueP).dequeue(var);
    ctx.part_mut(ScoresP).remove(var);
}
