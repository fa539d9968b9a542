//! # Summary
//!
//! This module defines the vocabulary of the core: the totally ordered
//! `Ballot`, the per-slot `Slot` index, the `DataOrStop` wrapper consumed by
//! the stoppable combinator, and the closed set of message variants
//! (`Msg`) that role state machines step on. Nothing here knows about
//! acceptors, proposers, or learners individually -- it is shared
//! vocabulary, the way `message.rs` in "Paxos Made Moderately Complex" is
//! shared by `acceptor`, `scout`, and `commander`.

use serde_derive::{Deserialize, Serialize};

/// Opaque handle identifying exactly one role instance reachable through a
/// `crate::runtime::Runtime`. The core never interprets this value; it only
/// carries it to address outgoing messages.
pub type Address = usize;

/// An independent consensus instance in multi-decree operation.
pub type Slot = usize;

/// A totally ordered, per-proposer-unique ballot number.
///
/// Encoded as `(round, proposer_id)` compared lexicographically: pairing
/// a per-proposer monotonic round with the proposer's own identity
/// guarantees global uniqueness without any coordination between
/// proposers. `Ballot::NONE` is the sentinel "no ballot seen yet" value
/// and compares lower than every
/// ballot a real proposer can construct, since real rounds start at 1.
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ballot {
    /// Proposer-local, monotonically increasing round number.
    pub round: u64,
    /// Identity of the proposer that owns this ballot.
    pub proposer_id: u32,
}

impl Ballot {
    /// Sentinel value meaning "no ballot has been adopted yet".
    pub const NONE: Ballot = Ballot { round: 0, proposer_id: 0 };

    pub fn new(round: u64, proposer_id: u32) -> Self {
        Ballot { round, proposer_id }
    }
}

/// Tagged payload the stoppable combinator operates over. A slot's
/// proposer carries a plain value until the stoppable post-processor
/// decides its emission must be replaced.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub enum DataOrStop<T> {
    /// An ordinary proposed value.
    Data(T),
    /// A distinguished value terminating the slot sequence.
    Stop(String),
    /// Replaces a `Data`/`Stop` payload the stoppable rule forbids, without
    /// disturbing ballot or slot bookkeeping.
    Voided(String),
}

impl<T> DataOrStop<T> {
    pub fn is_stop(&self) -> bool {
        matches!(self, DataOrStop::Stop(_))
    }
}

/// The protocol alphabet: every message variant a role's `step` function
/// may recognize. A role that doesn't recognize a variant treats it as a
/// no-op, per the acceptor/proposer/learner step contracts.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""))]
pub enum Msg<T> {
    /// Prepare, proposer -> acceptor.
    Phase1A { ballot: Ballot, from: Address },
    /// Promise reply, acceptor -> proposer.
    Phase1B {
        promise: bool,
        from: Address,
        accepted: Option<(Ballot, T)>,
    },
    /// Accept request, proposer -> acceptor.
    Phase2A { ballot: Ballot, from: Address, value: T },
    /// Accept ack, acceptor -> proposer.
    Phase2B { ballot: Ballot, from: Address, ack: bool },
    /// Client -> proposer.
    ProposeValue(T),
    /// Read request, learner -> acceptor.
    QueryAcceptor { requester: Address },
    /// Read reply, acceptor -> learner.
    ValueAcc { from: Address, value: Option<T> },
    /// Client -> learner.
    QueryLearner { requester: Address },
    /// Learner -> client.
    LearnedAgreedValue { value: T, from: Address },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballot_none_is_lowest() {
        let b = Ballot::new(1, 0);
        assert!(Ballot::NONE < b);
    }

    #[test]
    fn ballot_order_is_lexicographic() {
        let a = Ballot::new(3, 9);
        let b = Ballot::new(3, 10);
        let c = Ballot::new(4, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn data_or_stop_equality_ignores_variant_payload_type() {
        let a: DataOrStop<&str> = DataOrStop::Data("x");
        let b: DataOrStop<&str> = DataOrStop::Data("x");
        let s: DataOrStop<&str> = DataOrStop::Stop("term".into());
        assert_eq!(a, b);
        assert_ne!(a, s);
        assert!(s.is_stop());
        assert!(!a.is_stop());
    }
}
