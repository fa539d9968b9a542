//! # Summary
//!
//! This module defines the one collaborator the core consumes from its
//! environment: a mailbox primitive providing a stable identity per
//! actor, serialized delivery to that actor's `step` function, and a
//! `send` primitive. It mirrors "Paxos Made Moderately Complex"'s
//! `internal::Tx`/`Rx` channel pair, but without `tokio` or any async
//! runtime underneath it, because the core itself performs no I/O and
//! has no internal suspension points.
//!
//! `LocalRuntime` is the one implementation the crate ships: a
//! synchronous, in-process dispatcher sufficient for the test suite and
//! for embedders who only need in-process consensus. `SharedRuntime`
//! wraps it behind `Arc<RwLock<_>>` for embedders that reach the same
//! mailbox from multiple OS threads. A networked embedder (a
//! `chatroom`/`harness`-style client/server pair built atop `tokio`)
//! supplies its own `Runtime` backed by real sockets; that transport is
//! out of scope for the core.

use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::HashMap as Map;
use parking_lot::RwLock;

use crate::message::{Address, Msg};
use crate::role::{Role, Value};

/// A mailbox primitive: stable per-actor identity, serialized delivery,
/// and a send primitive. The core depends on nothing else from its
/// environment.
pub trait Runtime<T: Value> {
    /// Register a role instance at `address`; it will receive every
    /// message sent there until explicitly replaced.
    fn register(&mut self, address: Address, role: Box<dyn Role<T>>);

    /// Enqueue a message addressed to `to`. Delivery is not assumed to
    /// be FIFO between distinct senders; the protocol's safety never
    /// relies on it.
    fn send(&mut self, to: Address, msg: Msg<T>);

    /// Drain and return every message addressed to an identity with no
    /// registered role -- i.e. messages meant for an external observer
    /// (a client awaiting `LearnedAgreedValue`, or a reply address used
    /// only to collect results).
    fn drain_unrouted(&mut self) -> Vec<(Address, Msg<T>)>;
}

/// Synchronous, in-process `Runtime`. `send` enqueues; `run` drains the
/// queue, delivering each message to its registered role and
/// re-enqueueing every message that role emits, until the queue is
/// empty. Since the core performs no I/O, this terminates whenever the
/// protocol itself would reach quiescence (every role either decided,
/// idle, or waiting on a peer that never replies).
pub struct LocalRuntime<T: Value> {
    roles: Map<Address, Box<dyn Role<T>>>,
    queue: VecDeque<(Address, Msg<T>)>,
    unrouted: Vec<(Address, Msg<T>)>,
}

impl<T: Value> Default for LocalRuntime<T> {
    fn default() -> Self {
        LocalRuntime {
            roles: Map::new(),
            queue: VecDeque::new(),
            unrouted: Vec::new(),
        }
    }
}

impl<T: Value> LocalRuntime<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver every queued message, collecting any addressed to an
    /// identity with no registered role into `unrouted`, until the
    /// queue is empty.
    pub fn run(&mut self) {
        while let Some((to, msg)) = self.queue.pop_front() {
            log::trace!("runtime: delivering {:?} to {}", msg, to);
            match self.roles.get_mut(&to) {
                Some(role) => {
                    for (dest, out) in role.step(msg) {
                        self.queue.push_back((dest, out));
                    }
                }
                None => self.unrouted.push((to, msg)),
            }
        }
    }
}

impl<T: Value> Runtime<T> for LocalRuntime<T> {
    fn register(&mut self, address: Address, role: Box<dyn Role<T>>) {
        self.roles.insert(address, role);
    }

    fn send(&mut self, to: Address, msg: Msg<T>) {
        self.queue.push_back((to, msg));
    }

    fn drain_unrouted(&mut self) -> Vec<(Address, Msg<T>)> {
        std::mem::take(&mut self.unrouted)
    }
}

/// Thread-safe handle onto a `LocalRuntime`, for embedders that reach a
/// shared mailbox from more than one OS thread -- the role instances
/// themselves still run single-threaded `step` calls serialized by the
/// lock. Mirrors "Paxos Made Moderately Complex"'s `Shared<S>` hub, which
/// wraps its forwarding state in `Arc<RwLock<_>>` for exactly the same
/// reason.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct SharedRuntime<T: Value>(Arc<RwLock<LocalRuntime<T>>>);

impl<T: Value> Default for SharedRuntime<T> {
    fn default() -> Self {
        SharedRuntime(Arc::new(RwLock::new(LocalRuntime::default())))
    }
}

impl<T: Value> SharedRuntime<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver every queued message under a single write-lock acquisition.
    pub fn run(&self) {
        self.0.write().run();
    }
}

impl<T: Value> Runtime<T> for SharedRuntime<T> {
    fn register(&mut self, address: Address, role: Box<dyn Role<T>>) {
        self.0.write().register(address, role);
    }

    fn send(&mut self, to: Address, msg: Msg<T>) {
        self.0.write().send(to, msg);
    }

    fn drain_unrouted(&mut self) -> Vec<(Address, Msg<T>)> {
        self.0.write().drain_unrouted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptor::Acceptor;
    use crate::learner::Learner;
    use crate::message::Ballot;
    use crate::proposer::Proposer;

    const CLIENT: Address = 1000;

    #[test]
    fn single_decree_round_trip_through_local_runtime() {
        let mut rt = LocalRuntime::<&str>::new();
        rt.register(0, Box::new(Acceptor::new(0)));
        rt.register(1, Box::new(Acceptor::new(1)));
        rt.register(2, Box::new(Acceptor::new(2)));
        rt.register(10, Box::new(Proposer::new(10, Ballot::new(1, 10), vec![0, 1, 2])));
        rt.register(20, Box::new(Learner::new(20, vec![0, 1, 2])));

        rt.send(10, Msg::ProposeValue("X"));
        rt.run();

        rt.send(20, Msg::QueryLearner { requester: CLIENT });
        rt.run();

        let replies = rt.drain_unrouted();
        assert_eq!(
            replies,
            vec![(
                CLIENT,
                Msg::LearnedAgreedValue { value: "X", from: 20 }
            )]
        );
    }

    #[test]
    fn shared_runtime_clones_see_the_same_mailbox() {
        let mut rt = SharedRuntime::<&str>::new();
        rt.register(0, Box::new(Acceptor::new(0)));
        rt.register(10, Box::new(Proposer::new(10, Ballot::new(1, 10), vec![0])));

        // A clone shares state with the original handle -- registering
        // through one is visible to the other, the way two threads
        // holding "Paxos Made Moderately Complex"'s `Shared<S>` hub observe
        // each other's connects.
        let mut clone = rt.clone();
        clone.send(10, Msg::ProposeValue("X"));
        clone.run();

        rt.register(20, Box::new(Learner::new(20, vec![0])));
        rt.send(20, Msg::QueryLearner { requester: CLIENT });
        rt.run();

        assert_eq!(
            rt.drain_unrouted(),
            vec![(CLIENT, Msg::LearnedAgreedValue { value: "X", from: 20 })]
        );
    }
}
