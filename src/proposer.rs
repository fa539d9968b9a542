//! # Summary
//!
//! This module defines the `Proposer` state machine. A proposer drives
//! exactly one ballot through Phase 1 and Phase 2 against a fixed
//! acceptor set, then stays `Decided` forever -- a caller that wants to
//! retry with a higher ballot constructs a fresh `Proposer` instance.

use hashbrown::HashMap as Map;

use crate::error::ProposerError;
use crate::message::{Address, Ballot, Msg};
use crate::role::{Role, Value};

#[derive(Debug)]
enum Phase<T> {
    Init,
    Collecting {
        /// Fallback value, used if no contacted acceptor has accepted
        /// anything yet.
        value: T,
        /// At most one `Phase1B` response per acceptor.
        responses: Map<Address, Option<(Ballot, T)>>,
    },
    Decided,
}

/// Drives one ballot to a decision (or to permanent stall, if preempted).
#[derive(Debug)]
pub struct Proposer<T: Value> {
    id: Address,
    ballot: Ballot,
    acceptors: Vec<Address>,
    phase: Phase<T>,
}

impl<T: Value> Proposer<T> {
    pub fn new(id: Address, ballot: Ballot, acceptors: Vec<Address>) -> Self {
        Proposer {
            id,
            ballot,
            acceptors,
            phase: Phase::Init,
        }
    }

    pub fn id(&self) -> Address {
        self.id
    }

    pub fn ballot(&self) -> Ballot {
        self.ballot
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.phase, Phase::Decided)
    }

    fn quorum(&self) -> usize {
        self.acceptors.len() / 2 + 1
    }

    fn respond_propose(&mut self, value: T) -> Vec<(Address, Msg<T>)> {
        if !matches!(self.phase, Phase::Init) {
            // A proposer consumes exactly one Propose; further ones are
            // silently dropped rather than restarting the round.
            return Vec::new();
        }
        self.phase = Phase::Collecting {
            value,
            responses: Map::new(),
        };
        log::debug!("proposer {}: collecting at ballot {:?}", self.id, self.ballot);
        self.acceptors
            .iter()
            .map(|&a| {
                (
                    a,
                    Msg::Phase1A {
                        ballot: self.ballot,
                        from: self.id,
                    },
                )
            })
            .collect()
    }

    fn respond_phase1b(
        &mut self,
        promise: bool,
        from: Address,
        accepted: Option<(Ballot, T)>,
    ) -> Vec<(Address, Msg<T>)> {
        if !promise {
            return Vec::new();
        }
        let quorum = self.quorum();
        let (value, responses) = match &mut self.phase {
            Phase::Collecting { value, responses } => {
                responses.entry(from).or_insert(accepted);
                (value.clone(), responses)
            }
            _ => return Vec::new(),
        };

        if responses.len() < quorum {
            return Vec::new();
        }

        let chosen = responses
            .values()
            .flatten()
            .max_by_key(|(b, _)| *b)
            .map(|(_, v)| v.clone())
            .unwrap_or(value);

        let out = responses
            .keys()
            .map(|&a| {
                (
                    a,
                    Msg::Phase2A {
                        ballot: self.ballot,
                        from: self.id,
                        value: chosen.clone(),
                    },
                )
            })
            .collect();

        self.phase = Phase::Decided;
        log::info!("proposer {}: decided at ballot {:?}", self.id, self.ballot);
        out
    }

    /// Force a decision using whatever quorum has been collected so far.
    /// Not part of normal protocol flow -- exposed for combinator authors
    /// and tests that need to assert the `NotReady` precondition
    /// directly.
    pub fn force_decide(&mut self) -> Result<Vec<(Address, Msg<T>)>, ProposerError> {
        let quorum = self.quorum();
        match &self.phase {
            Phase::Collecting { responses, .. } if responses.len() >= quorum => {}
            _ => return Err(ProposerError::NotReady),
        };
        // Replay through the normal quorum path by re-delivering the last
        // response; `respond_phase1b` is idempotent on `from` so this is
        // safe to call again once the quorum threshold is already met.
        let (from, accepted) = match &self.phase {
            Phase::Collecting { responses, .. } => {
                let (&from, accepted) = responses.iter().next().expect("quorum implies non-empty");
                (from, accepted.clone())
            }
            _ => unreachable!(),
        };
        Ok(self.respond_phase1b(true, from, accepted))
    }
}

impl<T: Value> Role<T> for Proposer<T> {
    fn step(&mut self, msg: Msg<T>) -> Vec<(Address, Msg<T>)> {
        match msg {
            Msg::ProposeValue(value) => self.respond_propose(value),
            Msg::Phase1B {
                promise,
                from,
                accepted,
            } => self.respond_phase1b(promise, from, accepted),
            _ => Vec::new(),
        }
    }
}
