//! External variable import and translation.
//!
//! Callers outside the solver name variables by positive integers, as in the
//! DIMACS CNF encoding. The import table maps each external id to an internal
//! literal and remembers whether preprocessing eliminated the variable, which
//! is a distinct outcome from an id that was never imported.
use log::trace;
use partial_ref::{partial, PartialRef};
use thiserror::Error;

use pivotsat_formula::{Lit, Var};

use crate::context::{ensure_var_count, parts::*, Context};
use crate::decision;

/// Failed external variable lookups.
///
/// These are expected, recoverable outcomes returned to the caller, not
/// engine failures.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ExtQueryError {
    /// The id is not positive, out of table range or never imported.
    #[error("invalid external variable id")]
    Invalid,
    /// The variable was removed by preprocessing and can no longer be decided
    /// or queried.
    #[error("external variable was eliminated")]
    Eliminated,
}

/// Import table entry for one external variable id.
#[derive(Copy, Clone)]
struct Import {
    imported: bool,
    eliminated: bool,
    lit: Lit,
}

impl Default for Import {
    fn default() -> Import {
        Import {
            imported: false,
            eliminated: false,
            lit: Lit::from_index(0, true),
        }
    }
}

/// The external to internal variable mapping.
#[derive(Default)]
pub struct Variables {
    import: Vec<Import>,
}

impl Variables {
    /// Translate an external variable id to its internal literal.
    pub fn lit_from_external(&self, external: i32) -> Result<Lit, ExtQueryError> {
        if external <= 0 {
            return Err(ExtQueryError::Invalid);
        }
        let entry = self
            .import
            .get(external as usize)
            .ok_or(ExtQueryError::Invalid)?;
        if !entry.imported {
            Err(ExtQueryError::Invalid)
        } else if entry.eliminated {
            Err(ExtQueryError::Eliminated)
        } else {
            Ok(entry.lit)
        }
    }

    /// Bind an external variable id to an internal literal.
    pub fn bind_external(&mut self, external: i32, lit: Lit) {
        debug_assert!(external > 0);
        let index = external as usize;
        if self.import.len() <= index {
            self.import.resize(index + 1, Import::default());
        }
        let entry = &mut self.import[index];
        debug_assert!(!entry.imported);
        *entry = Import {
            imported: true,
            eliminated: false,
            lit,
        };
    }

    fn mark_eliminated(&mut self, external: i32) {
        let entry = &mut self.import[external as usize];
        debug_assert!(entry.imported && !entry.eliminated);
        entry.eliminated = true;
    }
}

/// Import an external variable, allocating a fresh internal variable if it
/// was not imported before.
pub fn import_var(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut PhasesP,
        mut QueueP,
        mut ScoresP,
        mut VariablesP,
    ),
    external: i32,
) -> Var {
    assert!(external > 0, "external variable ids are positive");
    match ctx.part(VariablesP).lit_from_external(external) {
        Ok(lit) => lit.var(),
        Err(ExtQueryError::Eliminated) => {
            panic!("cannot re-import eliminated external variable {}", external)
        }
        Err(ExtQueryError::Invalid) => {
            let var = Var::from_index(ctx.part(AssignmentP).var_count());
            ensure_var_count(ctx.borrow(), var.index() + 1);
            ctx.part_mut(VariablesP).bind_external(external, var.positive());
            trace!("imported external variable {} as {:?}", external, var);
            var
        }
    }
}

/// Mark an external variable as eliminated by preprocessing.
///
/// The internal variable leaves both decision orders and the unassigned pool.
pub fn eliminate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut QueueP,
        mut ScoresP,
        mut VariablesP,
    ),
    external: i32,
) {
    let lit = ctx
        .part(VariablesP)
        .lit_from_external(external)
        .expect("cannot eliminate an unimported external variable");
    debug_assert!(ctx.part(AssignmentP).lit_value(lit).is_none());

    ctx.part_mut(VariablesP).mark_eliminated(external);
    ctx.part_mut(AssignmentP).deactivate(lit.var());
    decision::remove_var(ctx.borrow(), lit.var());

    trace!("eliminated external variable {}", external);
}

/// Truth value of an external variable under the current assignment.
///
/// `Ok(None)` means the variable is unassigned; eliminated variables are
/// reported as [`ExtQueryError::Eliminated`], never as a truth value.
pub fn truth_of_external(
    mut ctx: partial!(Context, AssignmentP, VariablesP),
    external: i32,
) -> Result<Option<bool>, ExtQueryError> {
    let lit = ctx.part(VariablesP).lit_from_external(external)?;
    Ok(ctx.part(AssignmentP).lit_value(lit))
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::decision::assume;

    #[test]
    fn translation_outcomes() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let var = import_var(ctx.borrow(), 5);
        assert_eq!(import_var(ctx.borrow(), 5), var);
        assert_eq!(
            ctx.part(VariablesP).lit_from_external(5),
            Ok(var.positive())
        );

        assert_eq!(
            ctx.part(VariablesP).lit_from_external(0),
            Err(ExtQueryError::Invalid)
        );
        assert_eq!(
            ctx.part(VariablesP).lit_from_external(-5),
            Err(ExtQueryError::Invalid)
        );
        assert_eq!(
            ctx.part(VariablesP).lit_from_external(4),
            Err(ExtQueryError::Invalid)
        );
        assert_eq!(
            ctx.part(VariablesP).lit_from_external(100),
            Err(ExtQueryError::Invalid)
        );

        eliminate(ctx.borrow(), 5);
        assert_eq!(
            ctx.part(VariablesP).lit_from_external(5),
            Err(ExtQueryError::Eliminated)
        );
    }

    #[test]
    fn external_truth_values() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let a = import_var(ctx.borrow(), 1);
        let b = import_var(ctx.borrow(), 2);
        import_var(ctx.borrow(), 3);

        assert_eq!(truth_of_external(ctx.borrow(), 1), Ok(None));

        assume(ctx.borrow(), a.positive());
        assume(ctx.borrow(), b.negative());

        assert_eq!(truth_of_external(ctx.borrow(), 1), Ok(Some(true)));
        assert_eq!(truth_of_external(ctx.borrow(), 2), Ok(Some(false)));
        assert_eq!(truth_of_external(ctx.borrow(), 3), Ok(None));

        eliminate(ctx.borrow(), 3);
        assert_eq!(
            truth_of_external(ctx.borrow(), 3),
            Err(ExtQueryError::Eliminated)
        );
        assert_eq!(
            truth_of_external(ctx.borrow(), 7),
            Err(ExtQueryError::Invalid)
        );
    }
}
