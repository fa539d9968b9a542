//! # Summary
//!
//! This module defines the `Learner` state machine: a quorum-read over
//! the acceptor set. A learner never mutates Paxos's agreed history --
//! it only polls acceptors and reports the value a majority agrees on,
//! restarting on its own if the majority currently has no value.

use hashbrown::HashMap as Map;

use crate::message::{Address, Msg};
use crate::role::{Role, Value};

#[derive(Debug)]
enum Phase<T> {
    Idle,
    Polling {
        /// Who asked for the query result; the eventual reply address.
        sender: Address,
        /// One reply per contacted acceptor, at most.
        responses: Map<Address, Option<T>>,
    },
}

/// Performs a quorum-read of the acceptor set and reports the agreed
/// value, or re-queries on its own if a majority has no value yet.
#[derive(Debug)]
pub struct Learner<T: Value> {
    id: Address,
    acceptors: Vec<Address>,
    phase: Phase<T>,
}

impl<T: Value> Learner<T> {
    pub fn new(id: Address, acceptors: Vec<Address>) -> Self {
        Learner {
            id,
            acceptors,
            phase: Phase::Idle,
        }
    }

    pub fn id(&self) -> Address {
        self.id
    }

    fn quorum(&self) -> usize {
        self.acceptors.len() / 2 + 1
    }

    fn respond_query(&mut self, sender: Address) -> Vec<(Address, Msg<T>)> {
        self.phase = Phase::Polling {
            sender,
            responses: Map::new(),
        };
        self.acceptors
            .iter()
            .map(|&a| (a, Msg::QueryAcceptor { requester: self.id }))
            .collect()
    }

    /// Largest equivalence group under value equality, treating `None`
    /// as its own class. Returns the representative value and its count.
    fn largest_group(responses: &Map<Address, Option<T>>) -> (Option<T>, usize) {
        let mut groups: Vec<(Option<T>, usize)> = Vec::new();
        for value in responses.values() {
            if let Some((_, count)) = groups.iter_mut().find(|(v, _)| v == value) {
                *count += 1;
            } else {
                groups.push((value.clone(), 1));
            }
        }
        groups
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .unwrap_or((None, 0))
    }

    fn respond_value_acc(&mut self, from: Address, value: Option<T>) -> Vec<(Address, Msg<T>)> {
        let quorum = self.quorum();
        let sender = match &mut self.phase {
            Phase::Polling { sender, responses } => {
                responses.entry(from).or_insert(value);
                *sender
            }
            Phase::Idle => return Vec::new(),
        };

        let responses = match &self.phase {
            Phase::Polling { responses, .. } => responses,
            Phase::Idle => unreachable!(),
        };

        let (winner, count) = Self::largest_group(responses);
        if count < quorum {
            return Vec::new();
        }

        self.phase = Phase::Idle;
        match winner {
            None => {
                // A majority has no value yet: never report "agreed on
                // None" -- restart by emitting a query to self instead of
                // reporting, so the round is driven through the same path
                // as any other QueryLearner delivery.
                log::debug!("learner {}: majority-of-none, restarting", self.id);
                vec![(self.id, Msg::QueryLearner { requester: sender })]
            }
            Some(value) => {
                log::info!("learner {}: learned value at sender {}", self.id, sender);
                vec![(
                    sender,
                    Msg::LearnedAgreedValue {
                        value,
                        from: self.id,
                    },
                )]
            }
        }
    }
}

impl<T: Value> Role<T> for Learner<T> {
    fn step(&mut self, msg: Msg<T>) -> Vec<(Address, Msg<T>)> {
        match msg {
            Msg::QueryLearner { requester } => self.respond_query(requester),
            Msg::ValueAcc { from, value } => self.respond_value_acc(from, value),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_acc(from: Address, value: Option<&'static str>) -> Msg<&'static str> {
        Msg::ValueAcc { from, value }
    }

    #[test]
    fn majority_agreement_is_reported() {
        let mut l = Learner::<&str>::new(0, vec![1, 2, 3]);
        let out = l.step(Msg::QueryLearner { requester: 99 });
        assert_eq!(out.len(), 3);

        l.step(value_acc(1, Some("X")));
        let out = l.step(value_acc(2, Some("X")));
        assert_eq!(
            out,
            vec![(99, Msg::LearnedAgreedValue { value: "X", from: 0 })]
        );
    }

    #[test]
    fn value_acc_in_idle_is_dropped() {
        let mut l = Learner::<&str>::new(0, vec![1, 2, 3]);
        assert!(l.step(value_acc(1, Some("X"))).is_empty());
    }

    #[test]
    fn restarts_on_majority_of_none() {
        let mut l = Learner::<&str>::new(0, vec![1, 2, 3]);
        l.step(Msg::QueryLearner { requester: 99 });
        l.step(value_acc(1, None));
        let out = l.step(value_acc(2, None));
        // Restart emits a single query to self rather than reporting None.
        assert_eq!(out, vec![(0, Msg::QueryLearner { requester: 99 })]);

        // Delivering that self-query starts a fresh round, broadcasting to
        // every acceptor exactly as an external QueryLearner would.
        let out = l.step(Msg::QueryLearner { requester: 99 });
        assert_eq!(out.len(), 3);
        for (_, m) in &out {
            assert_eq!(*m, Msg::QueryAcceptor { requester: 0 });
        }

        // Second round completes normally.
        l.step(value_acc(1, Some("Y")));
        let out = l.step(value_acc(2, Some("Y")));
        assert_eq!(
            out,
            vec![(99, Msg::LearnedAgreedValue { value: "Y", from: 0 })]
        );
    }
}
