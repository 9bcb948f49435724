//! Engine configuration.
use pivotsat_internal_macros::DocDefault;

/// Configurable parameters of the decision engine.
#[derive(DocDefault)]
pub struct DecisionConfig {
    /// Static initial decision phase, used when no other phase source applies. (Default: true)
    pub initial_phase: bool,

    /// Always decide using the initial phase, ignoring phase memory. (Default: false)
    pub force_phase: bool,

    /// Reuse the phase a variable held when it was last assigned. (Default: true)
    pub phase_saving: bool,

    /// Target phase usage: 0 disables it, 1 uses it in stable mode, 2 uses it in every mode. (Default: 1)
    pub target_phase: u32,

    /// Multiplicative decay for variable activity scores. (Default: 0.95)
    pub score_decay: f64,
}
