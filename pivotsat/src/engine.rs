//! The decision engine facade.
use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use pivotsat_formula::{Lit, Var};

use crate::config::DecisionConfig;
use crate::context::{ensure_var_count, parts::*, Context};
use crate::decision;
use crate::oracle::DecisionOracle;
use crate::prop::backtrack;
use crate::state::SearchMode;
use crate::stats::Stats;
use crate::variables::{self, ExtQueryError};

/// The branching-decision engine of a CDCL solver.
///
/// The engine owns all branching state: assignment values, the decision
/// trail, both variable orders, phase memory, the import table and the
/// optional decision oracle. The surrounding solver drives it one decision
/// at a time, backtracks it after conflict analysis and keeps the activity
/// scores current.
#[derive(Default)]
pub struct DecisionEngine {
    ctx: Box<Context>,
}

impl DecisionEngine {
    /// Create a new decision engine.
    pub fn new() -> DecisionEngine {
        DecisionEngine::default()
    }

    /// Create a new decision engine with the given configuration.
    pub fn with_config(config: DecisionConfig) -> DecisionEngine {
        let mut engine = DecisionEngine::default();
        {
            let mut ctx = engine.ctx.into_partial_ref_mut();
            ctx.part_mut(ScoresP).set_decay(config.score_decay);
            *ctx.part_mut(ConfigP) = config;
        }
        engine
    }

    /// Access the configuration.
    pub fn config(&self) -> &DecisionConfig {
        self.ctx.config()
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut DecisionConfig {
        self.ctx.config_mut()
    }

    /// Add `count` fresh internal variables.
    ///
    /// New variables are unassigned and enter both decision orders.
    pub fn add_vars(&mut self, count: usize) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        let var_count = ctx.part(AssignmentP).var_count();
        ensure_var_count(ctx.borrow(), var_count + count);
    }

    /// Import an external variable, allocating an internal variable if it was
    /// not imported before.
    pub fn import_var(&mut self, external: i32) -> Var {
        let mut ctx = self.ctx.into_partial_ref_mut();
        variables::import_var(ctx.borrow(), external)
    }

    /// Mark an imported external variable as eliminated by preprocessing.
    pub fn eliminate_external(&mut self, external: i32) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        variables::eliminate(ctx.borrow(), external);
    }

    /// Make one heuristic decision.
    ///
    /// Panics when every variable is already assigned.
    pub fn decide(&mut self) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        decision::make_decision(ctx.borrow());
    }

    /// Assume a literal, opening a new decision level without consulting the
    /// decision heuristics.
    ///
    /// Panics when the literal is already assigned.
    pub fn assume(&mut self, lit: Lit) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        decision::assume(ctx.borrow(), lit);
    }

    /// Select the next decision variable without committing a decision.
    pub fn next_decision_variable(&mut self) -> Var {
        let mut ctx = self.ctx.into_partial_ref_mut();
        decision::next_decision_variable(ctx.borrow())
    }

    /// Undo all decision levels deeper than `level`.
    pub fn backtrack(&mut self, level: usize) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        backtrack(ctx.borrow(), level);
    }

    /// Install or replace the external decision oracle; `None` disables it.
    pub fn set_external_decision_function(&mut self, oracle: Option<Box<dyn DecisionOracle>>) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(OracleP).install(oracle);
    }

    /// Switch between stable and focused search.
    pub fn set_mode(&mut self, mode: SearchMode) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(SearchStateP).mode = mode;
    }

    /// The active search mode.
    pub fn mode(&self) -> SearchMode {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(SearchStateP).mode
    }

    /// Increase a variable's activity score.
    pub fn bump_activity(&mut self, var: Var) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(ScoresP).bump(var);
    }

    /// Decay all variable activity scores.
    pub fn decay_activities(&mut self) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(ScoresP).decay();
    }

    /// Record the phase a variable holds in the best assignment seen so far.
    pub fn set_target_phase(&mut self, var: Var, phase: Option<bool>) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(PhasesP).set_target(var, phase);
    }

    /// Value of a literal under the current assignment.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(AssignmentP).lit_value(lit)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(TrailP).current_level()
    }

    /// The literal decided or assumed at the given level.
    ///
    /// Level 0 has no decision.
    pub fn decision(&self, level: usize) -> Lit {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(TrailP).frame(level).decision()
    }

    /// Truth value of an external variable.
    pub fn truth_of_external_variable(&self, external: i32) -> Result<Option<bool>, ExtQueryError> {
        let mut ctx = self.ctx.into_partial_ref();
        variables::truth_of_external(ctx.borrow(), external)
    }

    /// Internal literal an external variable is mapped to.
    pub fn internal_literal_of_external_variable(
        &self,
        external: i32,
    ) -> Result<Lit, ExtQueryError> {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(VariablesP).lit_from_external(external)
    }

    /// Decision statistics.
    pub fn stats(&self) -> Stats {
        let mut ctx = self.ctx.into_partial_ref();
        *ctx.part(StatsP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::{collection, prelude::*};

    use crate::oracle::OracleView;

    /// Oracle that replays a fixed list of suggestions.
    struct ScriptedOracle {
        script: Vec<Option<i32>>,
        at: usize,
    }

    impl ScriptedOracle {
        fn new(script: Vec<Option<i32>>) -> ScriptedOracle {
            ScriptedOracle { script, at: 0 }
        }
    }

    impl DecisionOracle for ScriptedOracle {
        fn suggest(&mut self, _view: OracleView) -> Option<i32> {
            let next = self.script.get(self.at).copied().flatten();
            self.at += 1;
            next
        }
    }

    fn decide_all(engine: &mut DecisionEngine, var_count: usize) -> Vec<Lit> {
        (1..=var_count)
            .map(|level| {
                engine.decide();
                engine.decision(level)
            })
            .collect()
    }

    #[test]
    fn deferring_oracle_matches_builtin_choices() {
        let _ = env_logger::builder().is_test(true).try_init();

        let run = |oracle: Option<Box<dyn DecisionOracle>>| -> Vec<Lit> {
            let mut engine = DecisionEngine::new();
            for external in 1..=6 {
                engine.import_var(external);
            }
            engine.set_mode(SearchMode::Stable);
            for external in &[4, 4, 2] {
                let var = engine.import_var(*external);
                engine.bump_activity(var);
            }
            engine.set_external_decision_function(oracle);
            decide_all(&mut engine, 6)
        };

        let builtin = run(None);
        let deferred = run(Some(Box::new(ScriptedOracle::new(vec![None; 6]))));
        assert_eq!(builtin, deferred);
    }

    #[test]
    fn oracle_suggestions_override_heuristics() {
        let mut engine = DecisionEngine::new();
        for external in 1..=4 {
            engine.import_var(external);
        }
        engine.set_external_decision_function(Some(Box::new(ScriptedOracle::new(vec![
            Some(-3),
            Some(3),
            Some(99),
            None,
        ]))));

        // a valid suggestion decides its variable with the suggested phase
        engine.decide();
        let suggested = engine.internal_literal_of_external_variable(3).unwrap();
        assert_eq!(engine.decision(1), !suggested);
        assert_eq!(engine.truth_of_external_variable(3), Ok(Some(false)));
        assert_eq!(engine.stats().oracle_decisions, 1);

        // re-suggesting the assigned variable is misuse; the engine reports
        // it and falls back to its own heuristic
        engine.decide();
        assert_eq!(engine.stats().oracle_misuse, 1);
        assert_ne!(engine.decision(2).var(), suggested.var());

        // unknown ids and deferrals fall back as well
        engine.decide();
        engine.decide();
        assert_eq!(engine.current_level(), 4);
        assert_eq!(engine.stats().decisions, 4);
        assert_eq!(engine.stats().oracle_decisions, 1);
    }

    #[test]
    fn backtracking_saves_phases_for_reuse() {
        let mut engine = DecisionEngine::new();
        engine.add_vars(3);

        engine.config_mut().initial_phase = false;
        for _ in 0..3 {
            engine.decide();
        }
        engine.backtrack(0);
        assert_eq!(engine.stats().initial_decisions, 3);

        // saved phases win over a changed initial phase
        engine.config_mut().initial_phase = true;
        engine.decide();
        assert!(engine.decision(1).is_negative());
        assert_eq!(engine.stats().saved_decisions, 1);

        // forcing the initial phase ignores phase memory
        engine.config_mut().force_phase = true;
        engine.decide();
        assert!(engine.decision(2).is_positive());
    }

    #[test]
    fn target_phases_apply_in_stable_mode() {
        let mut engine = DecisionEngine::new();
        engine.add_vars(2);

        let var = Var::from_index(1);
        engine.config_mut().phase_saving = false;
        engine.set_target_phase(var, Some(false));
        engine.bump_activity(var);
        engine.set_mode(SearchMode::Stable);

        engine.decide();
        assert_eq!(engine.decision(1), var.negative());
        assert_eq!(engine.stats().target_decisions, 1);

        // the same memory is ignored in focused mode at the default target
        // phase level
        engine.backtrack(0);
        engine.set_mode(SearchMode::Focused);
        engine.decide();
        assert!(engine.decision(1).is_positive());
    }

    #[test]
    fn next_decision_variable_commits_nothing() {
        let mut engine = DecisionEngine::new();
        engine.add_vars(4);

        let var = engine.next_decision_variable();
        assert_eq!(engine.current_level(), 0);
        assert_eq!(engine.value(var.positive()), None);

        engine.decide();
        assert_eq!(engine.decision(1).var(), var);
    }

    #[test]
    fn eliminated_variables_are_not_decided() {
        let mut engine = DecisionEngine::new();
        for external in 1..=3 {
            engine.import_var(external);
        }
        engine.eliminate_external(3);
        engine.eliminate_external(1);

        let survivor = engine.internal_literal_of_external_variable(2).unwrap();
        engine.decide();
        assert_eq!(engine.decision(1).var(), survivor.var());
        assert_eq!(
            engine.truth_of_external_variable(3),
            Err(ExtQueryError::Eliminated)
        );
    }

    proptest! {
        #[test]
        fn decide_opens_levels_monotonically(
            var_count in 1..30usize,
            bumps in collection::vec(0..30usize, 0..60),
            stable in proptest::bool::ANY,
        ) {
            let mut engine = DecisionEngine::new();
            engine.add_vars(var_count);
            engine.set_mode(if stable {
                SearchMode::Stable
            } else {
                SearchMode::Focused
            });

            for &bump in &bumps {
                if bump < var_count {
                    engine.bump_activity(Var::from_index(bump));
                }
                engine.decay_activities();
            }

            for step in 1..=var_count {
                engine.decide();
                prop_assert_eq!(engine.current_level(), step);
                let decision = engine.decision(step);
                prop_assert_eq!(engine.value(decision), Some(true));
            }

            engine.backtrack(0);
            prop_assert_eq!(engine.current_level(), 0);
            for index in 0..var_count {
                prop_assert_eq!(engine.value(Var::from_index(index).positive()), None);
            }

            // a full re-run still assigns every variable exactly once
            for step in 1..=var_count {
                engine.decide();
                prop_assert_eq!(engine.current_level(), step);
            }
            prop_assert_eq!(engine.stats().decisions, 2 * var_count as u64);
        }
    }
}
