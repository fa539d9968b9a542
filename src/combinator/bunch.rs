//! # Summary
//!
//! This module extends slot-replication so that, within one inbox
//! delivery, outputs touching several slots (an external trigger
//! addressing multiple slot instances at once) are collected as a single
//! batch before any post-processing runs. The batch preserves per-slot
//! order and tracks, per slot, the auxiliary metadata the stoppable
//! combinator needs: the latest `Phase2A` payload and ballot proposed at
//! that slot, and whether the slot has proposed at all.

use hashbrown::HashMap as Map;

use crate::message::{Address, Ballot, Msg, Slot};
use crate::role::{Role, Value};

use super::slot::SlotReplicated;

/// Snapshot of a slot instance's most recent Phase 2 proposal, as seen by
/// the stoppable combinator.
#[derive(Clone, Debug)]
pub struct SlotMeta<T> {
    /// Ballot and value of the latest `Phase2A` this slot has emitted.
    pub val2a: Option<(Ballot, T)>,
    /// Whether this slot has emitted a `Phase2A` at all.
    pub has_proposed: bool,
}

impl<T> Default for SlotMeta<T> {
    fn default() -> Self {
        SlotMeta {
            val2a: None,
            has_proposed: false,
        }
    }
}

/// Applied to each slot's outputs after a batch has been collected.
/// Implemented by the stoppable combinator; the identity post-processor
/// (the default) passes every message through unchanged.
pub trait PostProcess<T> {
    fn apply(&self, slot: Slot, meta: &Map<Slot, SlotMeta<T>>, msg: Msg<T>) -> Msg<T>;
}

/// Identity post-processor: passes every message through unchanged.
pub struct Identity;

impl<T> PostProcess<T> for Identity {
    fn apply(&self, _slot: Slot, _meta: &Map<Slot, SlotMeta<T>>, msg: Msg<T>) -> Msg<T> {
        msg
    }
}

/// Slot-replication plus per-slot metadata tracking and a post-processing
/// hook, applied to every output before it leaves the batch.
pub struct Bunch<T: Value, R: Role<T>, F: Fn(Slot) -> R, P: PostProcess<T>> {
    slots: SlotReplicated<T, R, F>,
    meta: Map<Slot, SlotMeta<T>>,
    post_process: P,
    /// When true, `meta` is updated as each input in a batch is
    /// processed, so a later input in the same batch observes earlier
    /// inputs' effects. When false (the default), every input in a batch
    /// observes the same pre-batch snapshot -- this can let a slot's own
    /// proposal veto another slot's proposal in the same batch when
    /// sequencing them would not have. Both behaviors preserve safety;
    /// only availability differs.
    sequentialize: bool,
}

impl<T: Value, R: Role<T>, F: Fn(Slot) -> R, P: PostProcess<T>> Bunch<T, R, F, P> {
    pub fn new(factory: F, post_process: P) -> Self {
        Bunch {
            slots: SlotReplicated::new(factory),
            meta: Map::new(),
            post_process,
            sequentialize: false,
        }
    }

    pub fn sequentialize(mut self, sequentialize: bool) -> Self {
        self.sequentialize = sequentialize;
        self
    }

    pub fn meta(&self) -> &Map<Slot, SlotMeta<T>> {
        &self.meta
    }

    fn record(&mut self, slot: Slot, msg: &Msg<T>) {
        if let Msg::Phase2A { ballot, value, .. } = msg {
            let entry = self.meta.entry(slot).or_default();
            entry.val2a = Some((*ballot, value.clone()));
            entry.has_proposed = true;
        }
    }

    /// Deliver one input to one slot. Use `step_batch` when a single
    /// trigger fans out to several slots and their outputs must all be
    /// post-processed against the same snapshot.
    pub fn step(&mut self, slot: Slot, inner: Msg<T>) -> Vec<(Slot, Address, Msg<T>)> {
        self.step_batch(vec![(slot, inner)])
    }

    /// Deliver every `(slot, inner)` pair in order, collecting all
    /// outputs into one batch and post-processing each before it is
    /// returned. Per-slot order is preserved.
    pub fn step_batch(&mut self, inputs: Vec<(Slot, Msg<T>)>) -> Vec<(Slot, Address, Msg<T>)> {
        let snapshot = if self.sequentialize { None } else { Some(self.meta.clone()) };
        let mut out = Vec::new();

        for (slot, inner) in inputs {
            for (slot, addr, msg) in self.slots.step(slot, inner) {
                self.record(slot, &msg);
                let view = snapshot.as_ref().unwrap_or(&self.meta);
                let processed = self.post_process.apply(slot, view, msg);
                out.push((slot, addr, processed));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Ballot;
    use crate::proposer::Proposer;

    fn p1b(promise: bool, from: Address, accepted: Option<(Ballot, &'static str)>) -> Msg<&'static str> {
        Msg::Phase1B { promise, from, accepted }
    }

    #[test]
    fn batch_preserves_per_slot_order_and_records_meta() {
        let ballot = Ballot::new(1, 0);
        let mut bunch = Bunch::new(
            move |_slot| Proposer::<&str>::new(0, ballot, vec![1, 2, 3]),
            Identity,
        );

        bunch.step_batch(vec![
            (1, Msg::ProposeValue("A")),
            (2, Msg::ProposeValue("B")),
        ]);
        bunch.step_batch(vec![(1, p1b(true, 1, None)), (2, p1b(true, 1, None))]);
        let out = bunch.step_batch(vec![(1, p1b(true, 2, None)), (2, p1b(true, 2, None))]);

        // Slot 1's Phase2A entries precede slot 2's, matching input order.
        let slots: Vec<Slot> = out.iter().map(|(s, _, _)| *s).collect();
        assert_eq!(slots, vec![1, 1, 1, 2, 2, 2]);

        assert!(bunch.meta()[&1].has_proposed);
        assert!(bunch.meta()[&2].has_proposed);
        assert_eq!(bunch.meta()[&1].val2a, Some((ballot, "A")));
        assert_eq!(bunch.meta()[&2].val2a, Some((ballot, "B")));
    }
}
