//! Phase memory and the decision phase policy.
use log::trace;
use partial_ref::{partial, PartialRef};

use pivotsat_formula::Var;

use crate::context::{parts::*, Context};
use crate::state::SearchMode;

/// Per-variable phase memory.
///
/// The target phase is the polarity a variable held in the best assignment
/// found so far; the saved phase is the polarity it held when it was last
/// assigned. Target phases are maintained by the surrounding solver, saved
/// phases by the backtracking path.
#[derive(Default)]
pub struct Phases {
    target: Vec<Option<bool>>,
    saved: Vec<Option<bool>>,
}

impl Phases {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.target.resize(count, None);
        self.saved.resize(count, None);
    }

    pub fn target(&self, var: Var) -> Option<bool> {
        self.target[var.index()]
    }

    pub fn set_target(&mut self, var: Var, phase: Option<bool>) {
        self.target[var.index()] = phase;
    }

    pub fn saved(&self, var: Var) -> Option<bool> {
        self.saved[var.index()]
    }

    pub fn save(&mut self, var: Var, phase: bool) {
        self.saved[var.index()] = Some(phase);
    }
}

/// Select the phase to assign when deciding on `var`.
///
/// Exactly one source produces the phase, in strict precedence order: oracle
/// advice for this call, then (unless forced to the initial phase) the target
/// phase where enabled for the current mode, then the saved phase, then the
/// configured initial phase.
pub fn decide_phase(
    mut ctx: partial!(Context, mut StatsP, ConfigP, PhasesP, SearchStateP),
    var: Var,
    advice: Option<bool>,
) -> bool {
    if let Some(phase) = advice {
        trace!("{:?} uses oracle decision phase {}", var, phase);
        return phase;
    }

    let (config, mut ctx) = ctx.split_part(ConfigP);
    let stable = ctx.part(SearchStateP).mode == SearchMode::Stable;

    let target = if config.force_phase {
        None
    } else if config.target_phase == 0 {
        None
    } else if stable || config.target_phase > 1 {
        ctx.part(PhasesP).target(var)
    } else {
        None
    };

    if let Some(phase) = target {
        trace!("{:?} uses target decision phase {}", var, phase);
        ctx.part_mut(StatsP).target_decisions += 1;
        return phase;
    }

    let saved = if !config.force_phase && config.phase_saving {
        ctx.part(PhasesP).saved(var)
    } else {
        None
    };

    if let Some(phase) = saved {
        trace!("{:?} uses saved decision phase {}", var, phase);
        ctx.part_mut(StatsP).saved_decisions += 1;
        return phase;
    }

    let phase = config.initial_phase;
    trace!("{:?} uses initial decision phase {}", var, phase);
    ctx.part_mut(StatsP).initial_decisions += 1;
    phase
}
