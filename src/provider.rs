//! # Summary
//!
//! This module is the sole component that touches the external actor
//! runtime. It instantiates acceptors and exposes factories for
//! proposers and learners parameterized over a shared acceptor set,
//! wiring them into whichever `Runtime` the embedder supplies -- the way
//! `config::Config::run` in "Paxos Made Moderately Complex" is the one
//! place that spawns threads and opens sockets, while `thread::acceptor`
//! itself stays transport-agnostic.

use crate::acceptor::Acceptor;
use crate::config::Config;
use crate::learner::Learner;
use crate::message::{Address, Ballot};
use crate::proposer::Proposer;
use crate::role::{Role, Value};
use crate::runtime::Runtime;

/// Creates acceptor actors from a `Config` and exposes factories for
/// proposer and learner actors parameterized by the configured acceptor
/// set. Does not itself hold a `Runtime` -- every method takes one, so a
/// provider can drive multiple runtimes (e.g. one per test case) without
/// being reconstructed.
pub struct Provider {
    config: Config,
}

impl Provider {
    pub fn new(config: Config) -> Self {
        Provider { config }
    }

    /// Register one acceptor role per address in `config.acceptors()`.
    pub fn spawn_acceptors<T: Value, R: Runtime<T>>(&self, runtime: &mut R) {
        for &id in self.config.acceptors() {
            let acceptor: Acceptor<T> = Acceptor::with_discipline(id, self.config.discipline());
            runtime.register(id, Box::new(acceptor));
        }
    }

    /// Register a proposer role at `address` driving `ballot` against
    /// the configured acceptor set.
    pub fn make_proposer<T: Value, R: Runtime<T>>(&self, runtime: &mut R, address: Address, ballot: Ballot) {
        let proposer = Proposer::<T>::new(address, ballot, self.config.acceptors().to_vec());
        runtime.register(address, Box::new(proposer));
    }

    /// Register a learner role at `address` polling the configured
    /// acceptor set.
    pub fn make_learner<T: Value, R: Runtime<T>>(&self, runtime: &mut R, address: Address) {
        let learner = Learner::<T>::new(address, self.config.acceptors().to_vec());
        runtime.register(address, Box::new(learner));
    }

    /// Build a fresh proposer instance without registering it -- for
    /// combinators (e.g. the slot-replicating combinator's per-slot
    /// factory) that manage their own role lifecycle instead of handing
    /// instances to a `Runtime`.
    pub fn proposer_factory<T: Value>(&self, ballot: Ballot) -> impl Fn(Address) -> Proposer<T> + '_ {
        move |address| Proposer::new(address, ballot, self.config.acceptors().to_vec())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Msg;
    use crate::runtime::LocalRuntime;

    #[test]
    fn provider_wires_full_single_decree_round() {
        let provider = Provider::new(Config::new(vec![0, 1, 2]));
        let mut runtime = LocalRuntime::<&str>::new();
        provider.spawn_acceptors(&mut runtime);
        provider.make_proposer(&mut runtime, 10, Ballot::new(1, 10));
        provider.make_learner(&mut runtime, 20);

        runtime.send(10, Msg::ProposeValue("X"));
        runtime.run();
        runtime.send(20, Msg::QueryLearner { requester: 99 });
        runtime.run();

        assert_eq!(
            runtime.drain_unrouted(),
            vec![(99, Msg::LearnedAgreedValue { value: "X", from: 20 })]
        );
    }
}
