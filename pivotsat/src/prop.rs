//! Assignment state and the decision trail.
use log::trace;
use partial_ref::{partial, PartialRef};

use pivotsat_formula::{lit::LitIdx, Lit, Var};

use crate::context::{parts::*, Context};

/// Current partial assignment.
///
/// Tracks a tri-state value per variable and the number of active variables
/// that are still unassigned, which gates the decide precondition.
#[derive(Default)]
pub struct Assignment {
    values: Vec<Option<bool>>,
    unassigned: usize,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.values.len();
        debug_assert!(count >= old_count);
        self.values.resize(count, None);
        self.unassigned += count - old_count;
    }

    /// Number of allocated variables.
    pub fn var_count(&self) -> usize {
        self.values.len()
    }

    /// Number of active variables without a value.
    pub fn unassigned(&self) -> usize {
        self.unassigned
    }

    /// Value of a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.values[var.index()]
    }

    /// Value of a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.index()].map(|value| value ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(true)
    }

    pub(crate) fn assign_lit(&mut self, lit: Lit) {
        debug_assert!(self.lit_value(lit).is_none());
        self.values[lit.index()] = Some(lit.is_positive());
        self.unassigned -= 1;
    }

    fn unassign(&mut self, var: Var) {
        debug_assert!(self.values[var.index()].is_some());
        self.values[var.index()] = None;
        self.unassigned += 1;
    }

    /// Take an eliminated variable out of the unassigned pool.
    pub(crate) fn deactivate(&mut self, var: Var) {
        debug_assert!(self.values[var.index()].is_none());
        self.unassigned -= 1;
    }
}

/// One open decision level, anchored by its decision literal.
#[derive(Copy, Clone, Debug)]
pub struct Frame {
    decision: Lit,
    trail_start: LitIdx,
}

impl Frame {
    /// The literal decided or assumed at this level.
    pub fn decision(&self) -> Lit {
        self.decision
    }
}

/// Decision history.
///
/// The decision level is the length of the frame stack; level 0 is the
/// pre-decision root and has no frame.
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    frames: Vec<Frame>,
}

impl Trail {
    /// Largest representable decision level.
    pub const MAX_LEVEL: usize = (LitIdx::max_value() - 1) as usize;

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.frames.len()
    }

    /// The frame anchoring the given decision level.
    ///
    /// Level 0 has no frame.
    pub fn frame(&self, level: usize) -> &Frame {
        &self.frames[level - 1]
    }

    fn new_decision_level(&mut self, decision: Lit) {
        debug_assert!(self.frames.len() < Self::MAX_LEVEL);
        self.frames.push(Frame {
            decision,
            trail_start: self.trail.len() as LitIdx,
        });
    }
}

/// Assign `lit` as a decision, opening a new decision level anchored by it.
///
/// The literal has to be unassigned when calling this. Propagation-class
/// assignments are the surrounding solver's business and never go through
/// here.
pub fn assign_decision(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), lit: Lit) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    trail.new_decision_level(lit);

    ctx.part_mut(AssignmentP).assign_lit(lit);
    trail.trail.push(lit);
}

/// Undo all assignments in decision levels deeper than the given level.
///
/// This is the unassignment path: each undone variable has its phase saved,
/// re-enters the score heap and may become the decision queue's new search
/// cursor.
pub fn backtrack(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut PhasesP,
        mut QueueP,
        mut ScoresP,
        mut TrailP,
    ),
    level: usize,
) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    if level == trail.current_level() {
        return;
    }
    debug_assert!(level < trail.current_level());

    let new_trail_len = trail.frames[level].trail_start as usize;
    trail.frames.truncate(level);

    for &lit in &trail.trail[new_trail_len..] {
        let var = lit.var();
        ctx.part_mut(AssignmentP).unassign(var);
        ctx.part_mut(PhasesP).save(var, lit.is_positive());

        let scores = ctx.part_mut(ScoresP);
        if !scores.contains(var) {
            scores.push(var);
        }

        let queue = ctx.part_mut(QueueP);
        if queue.stamp(var) > queue.search_stamp() {
            queue.update_search(var);
        }
    }
    trail.trail.truncate(new_trail_len);

    trace!("backtracked to level {}", level);
}
