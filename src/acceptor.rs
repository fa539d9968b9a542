//! # Summary
//!
//! This module defines the `Acceptor` state machine, Paxos's distributed
//! memory. An acceptor tracks the highest ballot it has seen and, per
//! ballot, the values it has accepted -- append-only, since only the
//! maximum-ballot entry is ever consulted.

use crate::config::AcceptorDiscipline;
use crate::message::{Address, Ballot, Msg};
use crate::role::{Role, Value};

/// Functions as distributed memory. Never fails: unrecognized messages
/// are dropped, and acceptors never retransmit on their own.
#[derive(Debug)]
pub struct Acceptor<T: Value> {
    /// Unique ID of this acceptor, used to address replies back to it.
    id: Address,

    /// Highest ballot seen so far. Non-decreasing across every step.
    ballot: Ballot,

    /// Every `(ballot, value)` this acceptor has ever accepted, in
    /// insertion order. Append-only; only the maximum-ballot entry is
    /// ever consulted, so a duplicate accept at the same ballot is
    /// harmless.
    accepted: Vec<(Ballot, T)>,

    /// Ballot adoption rule for `Phase1A`/`Phase2A`.
    discipline: AcceptorDiscipline,
}

impl<T: Value> Acceptor<T> {
    pub fn new(id: Address) -> Self {
        Acceptor::with_discipline(id, AcceptorDiscipline::NonStrict)
    }

    pub fn with_discipline(id: Address, discipline: AcceptorDiscipline) -> Self {
        Acceptor {
            id,
            ballot: Ballot::NONE,
            accepted: Vec::new(),
            discipline,
        }
    }

    pub fn id(&self) -> Address {
        self.id
    }

    pub fn current_ballot(&self) -> Ballot {
        self.ballot
    }

    /// The accepted entry with the highest ballot, or `None` if nothing
    /// has been accepted yet.
    pub fn max_accepted(&self) -> Option<&(Ballot, T)> {
        self.accepted.iter().max_by_key(|(b, _)| *b)
    }

    /// `(current_ballot, accepted)` snapshot for an embedder's
    /// write-ahead hook. Must be persisted before any outgoing
    /// `Phase1B`/`Phase2B` if durability across crashes is required.
    pub fn snapshot(&self) -> (Ballot, &[(Ballot, T)]) {
        (self.ballot, &self.accepted)
    }

    fn admits(&self, ballot: Ballot) -> bool {
        match self.discipline {
            AcceptorDiscipline::Strict => ballot > self.ballot,
            AcceptorDiscipline::NonStrict => ballot >= self.ballot,
        }
    }

    fn respond_phase1a(&mut self, ballot: Ballot, from: Address) -> Vec<(Address, Msg<T>)> {
        if !self.admits(ballot) {
            return Vec::new();
        }
        self.ballot = ballot;
        log::debug!("acceptor {}: adopted ballot {:?}", self.id, self.ballot);
        let accepted = self.max_accepted().cloned();
        vec![(
            from,
            Msg::Phase1B {
                promise: true,
                from: self.id,
                accepted,
            },
        )]
    }

    fn respond_phase2a(&mut self, ballot: Ballot, from: Address, value: T) -> Vec<(Address, Msg<T>)> {
        if ballot != self.ballot {
            return Vec::new();
        }
        self.accepted.push((ballot, value));
        log::trace!("acceptor {}: accepted at ballot {:?}", self.id, ballot);
        vec![(
            from,
            Msg::Phase2B {
                ballot: self.ballot,
                from: self.id,
                ack: true,
            },
        )]
    }

    fn respond_query(&self, requester: Address) -> Vec<(Address, Msg<T>)> {
        let value = self.max_accepted().map(|(_, v)| v.clone());
        vec![(
            requester,
            Msg::ValueAcc {
                from: self.id,
                value,
            },
        )]
    }
}

impl<T: Value> Role<T> for Acceptor<T> {
    fn step(&mut self, msg: Msg<T>) -> Vec<(Address, Msg<T>)> {
        match msg {
            Msg::Phase1A { ballot, from } => self.respond_phase1a(ballot, from),
            Msg::Phase2A { ballot, from, value } => self.respond_phase2a(ballot, from, value),
            Msg::QueryAcceptor { requester } => self.respond_query(requester),
            _ => Vec::new(),
        }
    }
}
