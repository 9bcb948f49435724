//! The recency ordered decision queue.
//!
//! Focused search branches on the variable that entered the queue most
//! recently among those still unassigned. The queue is a doubly linked list
//! kept in a dense arena indexed by variable, with a monotonically increasing
//! enqueue stamp per entry and a cached search cursor that avoids rescanning
//! from the tail on every selection.
use log::trace;
use partial_ref::{partial, PartialRef};

use pivotsat_formula::{lit::LitIdx, Var};

use crate::context::{parts::*, Context};

/// Sentinel marking an absent link or cursor.
const DISCONNECTED: LitIdx = LitIdx::max_value();

/// Doubly linked queue node.
#[derive(Copy, Clone)]
struct QueueLink {
    prev: LitIdx,
    next: LitIdx,
    stamp: u64,
}

impl Default for QueueLink {
    fn default() -> QueueLink {
        QueueLink {
            prev: DISCONNECTED,
            next: DISCONNECTED,
            stamp: 0,
        }
    }
}

/// Linked list over all active variables in enqueue order.
pub struct DecideQueue {
    links: Vec<QueueLink>,
    first: LitIdx,
    last: LitIdx,
    next_stamp: u64,
    search: LitIdx,
    search_stamp: u64,
}

impl Default for DecideQueue {
    fn default() -> DecideQueue {
        DecideQueue {
            links: vec![],
            first: DISCONNECTED,
            last: DISCONNECTED,
            next_stamp: 1,
            search: DISCONNECTED,
            search_stamp: 0,
        }
    }
}

impl DecideQueue {
    /// Update structures for a new variable count.
    ///
    /// New variables are enqueued immediately.
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.links.len();
        self.links.resize(count, QueueLink::default());
        for index in old_count..count {
            self.enqueue(Var::from_index(index));
        }
    }

    fn linked(&self, index: LitIdx) -> bool {
        self.first == index
            || self.links[index as usize].prev != DISCONNECTED
            || self.links[index as usize].next != DISCONNECTED
    }

    /// Enqueue stamp of a variable.
    pub fn stamp(&self, var: Var) -> u64 {
        self.links[var.index()].stamp
    }

    /// Stamp of the variable at the search cursor.
    pub fn search_stamp(&self) -> u64 {
        self.search_stamp
    }

    /// Variable at the search cursor.
    pub fn search(&self) -> Option<Var> {
        if self.search == DISCONNECTED {
            None
        } else {
            Some(Var::from_index(self.search as usize))
        }
    }

    /// Move the search cursor to a queued variable.
    pub fn update_search(&mut self, var: Var) {
        debug_assert!(self.linked(var.index() as LitIdx));
        self.search = var.index() as LitIdx;
        self.search_stamp = self.stamp(var);
    }

    /// Link a variable at the tail with a fresh stamp.
    ///
    /// The tail is the most recent entry, so it also becomes the cursor.
    pub fn enqueue(&mut self, var: Var) {
        let index = var.index() as LitIdx;
        debug_assert!(!self.linked(index));

        let stamp = self.next_stamp;
        self.next_stamp += 1;

        self.links[var.index()] = QueueLink {
            prev: self.last,
            next: DISCONNECTED,
            stamp,
        };
        if self.last == DISCONNECTED {
            self.first = index;
        } else {
            self.links[self.last as usize].next = index;
        }
        self.last = index;

        self.search = index;
        self.search_stamp = stamp;
    }

    /// Unlink a variable.
    ///
    /// A cursor pointing at the unlinked variable moves to its predecessor,
    /// keeping the rest of the queue reachable by `prev` walks.
    pub fn dequeue(&mut self, var: Var) {
        let index = var.index() as LitIdx;
        debug_assert!(self.linked(index));

        let QueueLink { prev, next, .. } = self.links[var.index()];

        if self.search == index {
            let moved = if prev != DISCONNECTED { prev } else { next };
            self.search = moved;
            self.search_stamp = if moved == DISCONNECTED {
                0
            } else {
                self.links[moved as usize].stamp
            };
        }

        if prev == DISCONNECTED {
            self.first = next;
        } else {
            self.links[prev as usize].next = next;
        }
        if next == DISCONNECTED {
            self.last = prev;
        } else {
            self.links[next as usize].prev = prev;
        }

        self.links[var.index()] = QueueLink::default();
    }
}

/// Find the most recently enqueued variable that is still unassigned.
///
/// Starts at the cached cursor and walks `prev` links toward older entries,
/// memoizing the found variable as the new cursor. The caller guarantees
/// that an unassigned variable exists; running off the head of the queue is
/// a contract violation.
pub fn next_via_queue(mut ctx: partial!(Context, mut QueueP, AssignmentP)) -> Var {
    let (queue, mut ctx) = ctx.split_part_mut(QueueP);
    let (assignment, _) = ctx.split_part(AssignmentP);

    debug_assert!(queue.search().is_some());
    let mut index = queue.search;
    if assignment
        .var_value(Var::from_index(index as usize))
        .is_some()
    {
        loop {
            index = queue.links[index as usize].prev;
            assert!(
                index != DISCONNECTED,
                "walked past the head of the decision queue"
            );
            if assignment
                .var_value(Var::from_index(index as usize))
                .is_none()
            {
                break;
            }
        }
        queue.update_search(Var::from_index(index as usize));
    }

    let var = Var::from_index(index as usize);
    trace!("last enqueued unassigned {:?} stamp {}", var, queue.stamp(var));
    var
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use pivotsat_formula::{lit, var};

    use crate::context::set_var_count;
    use crate::decision::assume;

    #[test]
    fn cursor_stays_on_unassigned() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        // enqueue order 1, 2, 3; cursor ends up on 3
        set_var_count(ctx.borrow(), 3);
        assume(ctx.borrow(), lit!(2));

        assert_eq!(next_via_queue(ctx.borrow()), var!(3));
        assert_eq!(ctx.part(QueueP).search(), Some(var!(3)));
    }

    #[test]
    fn cursor_walks_over_assigned() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);
        assume(ctx.borrow(), lit!(2));
        ctx.part_mut(QueueP).update_search(var!(2));

        // 2 is assigned, so the walk skips to 1 even though 3 is unassigned
        assert_eq!(next_via_queue(ctx.borrow()), var!(1));
        assert_eq!(ctx.part(QueueP).search(), Some(var!(1)));

        // the memoized cursor is reused as is
        assert_eq!(next_via_queue(ctx.borrow()), var!(1));
    }

    #[test]
    fn dequeue_relinks_and_moves_cursor() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        let queue = ctx.part_mut(QueueP);
        queue.dequeue(var!(4));
        assert_eq!(queue.search(), Some(var!(3)));

        queue.dequeue(var!(2));
        assume(ctx.borrow(), lit!(3));

        assert_eq!(next_via_queue(ctx.borrow()), var!(1));
    }

    #[test]
    fn finds_highest_stamp_unassigned() {
        use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let count = rng.gen_range(1, 20);
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();
            set_var_count(ctx.borrow(), count);

            let mut vars: Vec<usize> = (0..count).collect();
            vars.shuffle(&mut rng);
            let assigned = rng.gen_range(0, count);
            for &index in &vars[..assigned] {
                assume(ctx.borrow(), Var::from_index(index).positive());
            }

            let mut expected = None;
            for index in 0..count {
                let var = Var::from_index(index);
                if ctx.part(AssignmentP).var_value(var).is_some() {
                    continue;
                }
                let stamp = ctx.part(QueueP).stamp(var);
                if expected.map_or(true, |(best, _)| stamp > best) {
                    expected = Some((stamp, index));
                }
            }
            let (_, expected) = expected.unwrap();

            let found = next_via_queue(ctx.borrow());
            assert_eq!(found.index(), expected);
            assert_eq!(ctx.part(QueueP).search(), Some(found));
        }
    }
}
