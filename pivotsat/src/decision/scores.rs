//! The activity ordered score heap.
//!
//! Stable search branches on the unassigned variable with the highest
//! activity score. Scores are bumped and decayed by the surrounding solver;
//! selection only reads the maximum and drains entries that turn out to be
//! assigned already. Instead of decaying every score on each conflict, the
//! bump value is divided by the decay factor, and all values are scaled down
//! before they can overflow — only the order of scores matters.
use log::trace;
use ordered_float::OrderedFloat;
use partial_ref::{partial, PartialRef};

use pivotsat_formula::Var;

use crate::config::DecisionConfig;
use crate::context::{parts::*, Context};

/// Binary max-heap over all active variables, keyed by activity score.
pub struct ScoreHeap {
    /// The activity score of each variable.
    score: Vec<OrderedFloat<f64>>,
    /// A binary heap of the variables.
    heap: Vec<Var>,
    /// The position in the binary heap for each variable.
    position: Vec<Option<usize>>,
    /// The value to add on bumping.
    bump: f64,
    /// The inverse of the decay factor.
    inv_decay: f64,
}

impl Default for ScoreHeap {
    fn default() -> ScoreHeap {
        ScoreHeap {
            score: vec![],
            heap: vec![],
            position: vec![],
            bump: 1.0,
            inv_decay: 1.0 / DecisionConfig::default().score_decay,
        }
    }
}

impl ScoreHeap {
    /// Update structures for a new variable count.
    ///
    /// New variables enter the heap with a zero score.
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.score.len();
        debug_assert!(!self.heap.iter().any(|&v| v.index() >= count));
        self.score.resize(count, OrderedFloat(0.0));
        self.position.resize(count, None);

        for index in old_count..count {
            self.push(Var::from_index(index));
        }
    }

    /// Rescale scores if any value exceeds this value.
    fn rescale_limit() -> f64 {
        std::f64::MAX / 16.0
    }

    /// Change the decay factor.
    pub fn set_decay(&mut self, decay: f64) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    /// Activity score of a variable.
    pub fn score(&self, var: Var) -> f64 {
        self.score[var.index()].0
    }

    /// Whether a variable is currently in the heap.
    pub fn contains(&self, var: Var) -> bool {
        self.position[var.index()].is_some()
    }

    /// Bump a variable by increasing its activity.
    pub fn bump(&mut self, var: Var) {
        let rescale = {
            let value = &mut self.score[var.index()];
            value.0 += self.bump;
            value.0 >= Self::rescale_limit()
        };
        if rescale {
            self.rescale();
        }
        if let Some(pos) = self.position[var.index()] {
            self.sift_up(pos);
        }
    }

    /// Decay all variable activities.
    pub fn decay(&mut self) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale();
        }
    }

    /// Rescale all values to avoid an overflow.
    fn rescale(&mut self) {
        let rescale_factor = 1.0 / Self::rescale_limit();
        for score in &mut self.score {
            score.0 *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }

    /// Insert a variable into the heap if not already present.
    pub fn push(&mut self, var: Var) {
        if self.position[var.index()].is_none() {
            let position = self.heap.len();
            self.position[var.index()] = Some(position);
            self.heap.push(var);
            self.sift_up(position);
        }
    }

    /// Remove a variable from the heap if present.
    pub fn remove(&mut self, var: Var) {
        if let Some(pos) = self.position[var.index()] {
            self.position[var.index()] = None;
            let last = self.heap.pop().expect("heap position out of sync");
            if last != var {
                self.heap[pos] = last;
                self.position[last.index()] = Some(pos);
                self.sift_up(pos);
                self.sift_down(pos);
            }
        }
    }

    /// The heap variable with the highest score, if any.
    pub fn peek_max(&self) -> Option<Var> {
        self.heap.first().copied()
    }

    /// Remove and return the heap variable with the highest score.
    pub fn pop_max(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            None
        } else {
            let var = self.heap.swap_remove(0);
            if !self.heap.is_empty() {
                let top_var = self.heap[0];
                self.position[top_var.index()] = Some(0);
                self.sift_down(0);
            }
            self.position[var.index()] = None;
            Some(var)
        }
    }

    /// Move a variable closer to the root until the heap property is
    /// satisfied.
    fn sift_up(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            if pos == 0 {
                return;
            }
            let parent_pos = (pos - 1) / 2;
            let parent_var = self.heap[parent_pos];
            if self.score[parent_var.index()] >= self.score[var.index()] {
                return;
            }
            self.position[var.index()] = Some(parent_pos);
            self.heap[parent_pos] = var;
            self.position[parent_var.index()] = Some(pos);
            self.heap[pos] = parent_var;
            pos = parent_pos;
        }
    }

    /// Move a variable away from the root until the heap property is
    /// satisfied.
    fn sift_down(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            let mut largest_pos = pos;
            let mut largest_var = var;

            let left_pos = pos * 2 + 1;
            if left_pos < self.heap.len() {
                let left_var = self.heap[left_pos];

                if self.score[largest_var.index()] < self.score[left_var.index()] {
                    largest_pos = left_pos;
                    largest_var = left_var;
                }
            }

            let right_pos = pos * 2 + 2;
            if right_pos < self.heap.len() {
                let right_var = self.heap[right_pos];

                if self.score[largest_var.index()] < self.score[right_var.index()] {
                    largest_pos = right_pos;
                    largest_var = right_var;
                }
            }

            if largest_pos == pos {
                return;
            }

            self.position[var.index()] = Some(largest_pos);
            self.heap[largest_pos] = var;
            self.position[largest_var.index()] = Some(pos);
            self.heap[pos] = largest_var;
            pos = largest_pos;
        }
    }
}

/// Find the unassigned variable with the globally highest activity score.
///
/// Assigned variables at the top of the heap are popped for good; the
/// backtracking path re-inserts them when they become unassigned again. The
/// caller guarantees that an unassigned variable remains in the heap.
pub fn next_via_heap(mut ctx: partial!(Context, mut ScoresP, AssignmentP)) -> Var {
    let (scores, mut ctx) = ctx.split_part_mut(ScoresP);
    let (assignment, _) = ctx.split_part(AssignmentP);

    let mut var = scores.peek_max().expect("score heap is empty");
    while assignment.var_value(var).is_some() {
        scores.pop_max();
        var = scores
            .peek_max()
            .expect("no unassigned variable left in the score heap");
    }

    trace!("largest score unassigned {:?} score {}", var, scores.score(var));
    var
}
