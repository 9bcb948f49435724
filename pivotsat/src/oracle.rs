//! External decision oracle.
//!
//! An oracle is an externally supplied strategy that may override the
//! engine's own variable selection. It speaks in external variable names: a
//! suggestion is a signed external id whose sign encodes the suggested
//! phase. The engine owns the installed oracle; there is no global hook.
use log::{debug, error};
use partial_ref::{partial, PartialRef};

use pivotsat_formula::Var;

use crate::context::{parts::*, Context};
use crate::prop::{Assignment, Trail};
use crate::variables::Variables;

/// Read-only engine state handed to a decision oracle.
pub struct OracleView<'a> {
    pub assignment: &'a Assignment,
    pub trail: &'a Trail,
    pub variables: &'a Variables,
}

/// An external strategy that may override the built-in variable selection.
pub trait DecisionOracle {
    /// Suggest the next decision as a signed external variable id, or `None`
    /// to defer to the engine's own heuristics.
    ///
    /// The oracle is responsible for tracking assignment state; suggesting an
    /// already assigned variable is engine misuse and is reported rather than
    /// silently corrected.
    fn suggest(&mut self, view: OracleView) -> Option<i32>;
}

/// Slot holding the installed oracle, if any.
#[derive(Default)]
pub struct OracleSlot {
    oracle: Option<Box<dyn DecisionOracle>>,
}

impl OracleSlot {
    /// Install or replace the oracle; `None` disables it.
    pub fn install(&mut self, oracle: Option<Box<dyn DecisionOracle>>) {
        self.oracle = oracle;
    }
}

/// Ask the installed oracle for a decision variable and phase advice.
///
/// Returns `None` when no oracle is installed, when the oracle defers, or
/// when its suggestion does not translate to a usable unassigned variable —
/// the caller then falls back to the built-in heuristics.
pub fn oracle_suggestion(
    mut ctx: partial!(
        Context,
        mut OracleP,
        mut StatsP,
        AssignmentP,
        TrailP,
        VariablesP,
    ),
) -> Option<(Var, bool)> {
    let (slot, mut ctx) = ctx.split_part_mut(OracleP);
    let (assignment, mut ctx) = ctx.split_part(AssignmentP);
    let (trail, mut ctx) = ctx.split_part(TrailP);
    let (variables, mut ctx) = ctx.split_part(VariablesP);

    let oracle = slot.oracle.as_mut()?;
    let suggestion = oracle.suggest(OracleView {
        assignment,
        trail,
        variables,
    })?;

    let external = suggestion.checked_abs().unwrap_or(0);
    match variables.lit_from_external(external) {
        Ok(lit) => {
            let var = lit.var();
            if assignment.var_value(var).is_some() {
                error!(
                    "oracle suggested already assigned variable {:?} (external {})",
                    var, external
                );
                ctx.part_mut(StatsP).oracle_misuse += 1;
                None
            } else {
                ctx.part_mut(StatsP).oracle_decisions += 1;
                Some((var, suggestion > 0))
            }
        }
        Err(err) => {
            debug!("oracle suggestion {} not taken: {}", suggestion, err);
            None
        }
    }
}
