//! # Summary
//!
//! This module defines the slot-replicating combinator: it demultiplexes
//! slot-tagged messages to a per-slot family of role instances, reusing
//! the leaf role's `step` unchanged. The per-slot map is a plain
//! `HashMap` owned exclusively by the combinator -- no `Arc`/lock, since
//! role state reached only from within one actor's single-threaded step
//! needs no synchronization. That's reserved for the runtime layer,
//! where multiple OS threads may reach a mailbox.

use hashbrown::HashMap as Map;

use crate::message::{Address, Msg, Slot};
use crate::role::{Role, Value};

/// Wraps a family of `R` role instances, one per slot, created lazily on
/// first message for that slot and never destroyed for the lifetime of
/// the combinator.
pub struct SlotReplicated<T: Value, R: Role<T>, F: Fn(Slot) -> R> {
    instances: Map<Slot, R>,
    factory: F,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Value, R: Role<T>, F: Fn(Slot) -> R> SlotReplicated<T, R, F> {
    /// `factory` builds a fresh role instance for a given slot index --
    /// e.g. a `Proposer` at this replica's ballot and acceptor set, or an
    /// `Acceptor` with this replica's id.
    pub fn new(factory: F) -> Self {
        SlotReplicated {
            instances: Map::new(),
            factory,
            _marker: std::marker::PhantomData,
        }
    }

    /// Number of slot instances created so far.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.instances.contains_key(&slot)
    }

    fn instance(&mut self, slot: Slot) -> &mut R {
        self.instances.entry(slot).or_insert_with(|| (self.factory)(slot))
    }

    /// Route `inner` to slot `slot`'s role instance, lazily creating it if
    /// this is the first message that slot has seen. Every outgoing
    /// message is re-tagged with `slot` so it continues to address the
    /// correct per-slot instance at its destination. A message for slot
    /// `s` never perturbs the state of any slot `s' != s`.
    pub fn step(&mut self, slot: Slot, inner: Msg<T>) -> Vec<(Slot, Address, Msg<T>)> {
        self.instance(slot)
            .step(inner)
            .into_iter()
            .map(|(addr, msg)| (slot, addr, msg))
            .collect()
    }
}

/// A slot-scoped façade: rewrites an inner payload addressed by a client
/// into `(slot, payload)` outbound, and unwraps `(slot, payload)` inbound
/// back to a plain payload -- so a client of one particular slot never
/// has to think about the wrapping at all.
#[derive(Copy, Clone, Debug)]
pub struct SlotProxy {
    slot: Slot,
}

impl SlotProxy {
    pub fn new(slot: Slot) -> Self {
        SlotProxy { slot }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn wrap<T>(&self, payload: Msg<T>) -> (Slot, Msg<T>) {
        (self.slot, payload)
    }

    pub fn unwrap<T>(&self, tagged: (Slot, Msg<T>)) -> Option<Msg<T>> {
        let (slot, payload) = tagged;
        if slot == self.slot {
            Some(payload)
        } else {
            None
        }
    }
}
