//! # Summary
//!
//! This module defines the `Register` façade: a one-shot read/write
//! interface over a single Paxos instance. `Register` does not
//! re-implement consensus -- it wires a fresh `Proposer` into a
//! `LocalRuntime` already populated with the deployment's acceptors for
//! `write`, and drives an unregistered, ephemeral `Learner` through
//! exactly one query round by hand for `read`, so a majority that has no
//! value yet reports `None` instead of restarting forever.

use crate::acceptor::Acceptor;
use crate::learner::Learner;
use crate::message::{Address, Ballot, Msg};
use crate::proposer::Proposer;
use crate::role::Value;
use crate::runtime::LocalRuntime;

/// One-shot read/write façade over a single Paxos instance (one slot,
/// fixed acceptor set). Each `write` proposes at a fresh, unique ballot
/// so a register can be reused for multiple rounds without ever
/// colliding with its own earlier proposals.
pub struct Register {
    /// Identity of this register, used as the `proposer_id` half of
    /// every ballot it constructs -- this is what keeps ballots unique
    /// across registers sharing the same acceptor set.
    id: u32,
    acceptors: Vec<Address>,
    round: u64,
    /// Address range reserved for this register's ephemeral
    /// proposer/learner instances, so repeated calls don't collide with
    /// the runtime's other registrants.
    base_address: Address,
}

impl Register {
    pub fn new(id: u32, acceptors: Vec<Address>, base_address: Address) -> Self {
        Register {
            id,
            acceptors,
            round: 1,
            base_address,
        }
    }

    fn next_ballot(&mut self) -> Ballot {
        let ballot = Ballot::new(self.round, self.id);
        self.round += 1;
        ballot
    }

    /// Drive one proposer round for `value` to completion, returning the
    /// consensus-chosen value -- which may differ from `value` if a
    /// prior value was already accepted by a quorum of acceptors.
    pub fn write<T: Value>(&mut self, runtime: &mut LocalRuntime<T>, value: T) -> T {
        let ballot = self.next_ballot();
        let proposer_addr = self.base_address;
        let client_addr = self.base_address + 1;

        runtime.register(
            proposer_addr,
            Box::new(Proposer::new(proposer_addr, ballot, self.acceptors.clone())),
        );
        runtime.send(proposer_addr, Msg::ProposeValue(value));
        runtime.run();

        // The proposer's Phase2A fan-out resolves against the acceptors,
        // whose Phase2B acks return to the (now-decided) proposer and are
        // dropped there. Read back what was actually chosen through a
        // learner query rather than trusting the client's own input,
        // since a prior value may have won instead.
        self.read_at(runtime, client_addr)
            .expect("a just-completed write round always yields a value")
    }

    /// Drive one learner query to completion, returning the
    /// consensus-chosen value if a quorum of acceptors has accepted one.
    pub fn read<T: Value>(&mut self, runtime: &mut LocalRuntime<T>) -> Option<T> {
        let client_addr = self.base_address + 1;
        self.read_at(runtime, client_addr)
    }

    /// Drive exactly one learner round, by hand, against a `Learner` that
    /// is never registered in `runtime`. On a majority-of-none the
    /// learner restarts by querying itself (see `crate::learner`), and
    /// with no write in flight every restart observes the same all-None
    /// majority again -- registering the learner and draining `runtime`
    /// to quiescence would loop forever. Keeping the learner local and
    /// only feeding it the acceptor replies from this one round bounds
    /// the read to a single round: a restart request is simply left
    /// undelivered, and the call reports `None`.
    fn read_at<T: Value>(&mut self, runtime: &mut LocalRuntime<T>, client_addr: Address) -> Option<T> {
        let learner_addr = self.base_address + 2;
        let mut learner = Learner::new(learner_addr, self.acceptors.clone());

        for (to, msg) in learner.step(Msg::QueryLearner { requester: client_addr }) {
            runtime.send(to, msg);
        }
        runtime.run();

        for (to, msg) in runtime.drain_unrouted() {
            if to != learner_addr {
                continue;
            }
            let (from, value) = match msg {
                Msg::ValueAcc { from, value } => (from, value),
                _ => continue,
            };
            for (_, reply) in learner.step(Msg::ValueAcc { from, value }) {
                if let Msg::LearnedAgreedValue { value, .. } = reply {
                    return Some(value);
                }
                // Any other reply here is the learner's self-addressed
                // restart query; a fresh round is left for the next call.
            }
        }

        None
    }
}

/// Convenience constructor for the acceptor set backing a register:
/// registers `count` fresh acceptors at addresses `0..count` in
/// `runtime`.
pub fn new_acceptors<T: Value>(runtime: &mut LocalRuntime<T>, count: usize) -> Vec<Address> {
    for id in 0..count {
        runtime.register(id, Box::new(Acceptor::new(id)));
    }
    (0..count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trip() {
        let mut runtime = LocalRuntime::<&str>::new();
        let acceptors = new_acceptors(&mut runtime, 3);
        let mut register = Register::new(0, acceptors, 100);

        let chosen = register.write(&mut runtime, "X");
        assert_eq!(chosen, "X");

        let read = register.read(&mut runtime);
        assert_eq!(read, Some("X"));
    }

    #[test]
    fn read_before_any_write_returns_none() {
        let mut runtime = LocalRuntime::<&str>::new();
        let acceptors = new_acceptors(&mut runtime, 3);
        let mut register = Register::new(0, acceptors, 100);

        // No quorum has accepted anything yet, so every acceptor reports
        // `None`, and the read must report `None` too -- promptly, rather
        // than looping on the learner's majority-of-none restart.
        assert_eq!(register.read(&mut runtime), None);
    }

    #[test]
    fn write_may_return_prior_value_instead_of_argument() {
        let mut runtime = LocalRuntime::<&str>::new();
        let acceptors = new_acceptors(&mut runtime, 3);
        let mut register = Register::new(0, acceptors, 100);

        register.write(&mut runtime, "first");
        let mut other = Register::new(1, register_acceptors(&register), 200);
        let chosen = other.write(&mut runtime, "second");
        assert_eq!(chosen, "first");
    }

    fn register_acceptors(register: &Register) -> Vec<Address> {
        register.acceptors.clone()
    }
}
