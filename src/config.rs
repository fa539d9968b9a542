//! # Summary
//!
//! This module defines construction-time configuration for the core's
//! role state machines, the same way `config::Config` parameterizes a
//! replicated server in "Paxos Made Moderately Complex" -- except here there
//! is no network port or replica count to carry, only the choices left
//! open to each instantiation: ballot discipline, the acceptor set, and
//! an advisory retry timeout.

use std::time::Duration;

use crate::message::Address;

/// Ballot comparison an acceptor uses when deciding whether to adopt an
/// incoming `Phase1A`/`Phase2A` ballot.
///
/// The single-decree variant of Paxos uses strict `>` so a proposer can
/// never re-win a ballot it already lost. Multi-decree (Paxos Made
/// Moderately Complex-style) leader stickiness relies on `>=` so the
/// incumbent leader can keep driving new slots at the same ballot without
/// running Phase 1 again. Each deployment must pick one discipline per
/// acceptor instantiation; `Config` is where that choice lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AcceptorDiscipline {
    /// Adopt `b` only if `b > current_ballot`.
    Strict,
    /// Adopt `b` if `b >= current_ballot` (the combinator-stack default).
    NonStrict,
}

impl Default for AcceptorDiscipline {
    fn default() -> Self {
        AcceptorDiscipline::NonStrict
    }
}

/// Construction-time configuration for a single Paxos deployment: how
/// many acceptors form a quorum, which acceptor ids participate, and
/// (for an external driver that wants to re-propose after a timeout) how
/// long to wait before bumping the ballot and retrying.
#[derive(Clone, Debug)]
pub struct Config {
    /// Addresses of every acceptor in the deployment.
    acceptors: Vec<Address>,

    /// Ballot adoption rule used by acceptors built from this config.
    discipline: AcceptorDiscipline,

    /// How long an external driver should wait for a `Propose` round to
    /// complete before giving up and retrying with a higher ballot. The
    /// core itself never reads the clock -- it has no internal
    /// suspension points -- so this value is advisory, for an embedder's
    /// retry loop.
    retry_timeout: Duration,
}

impl Config {
    /// Create a configuration naming the acceptors in `acceptors`. The
    /// resulting quorum size is `acceptors.len() / 2 + 1`.
    pub fn new(acceptors: Vec<Address>) -> Self {
        Config {
            acceptors,
            discipline: AcceptorDiscipline::default(),
            retry_timeout: Duration::from_secs(1),
        }
    }

    /// Select the acceptor ballot-adoption discipline.
    pub fn with_discipline(mut self, discipline: AcceptorDiscipline) -> Self {
        self.discipline = discipline;
        self
    }

    /// Configure the retry timeout an external driver should honor.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.retry_timeout = timeout;
        self
    }

    pub fn acceptors(&self) -> &[Address] {
        &self.acceptors
    }

    pub fn discipline(&self) -> AcceptorDiscipline {
        self.discipline
    }

    pub fn retry_timeout(&self) -> Duration {
        self.retry_timeout
    }

    /// Size of a strict majority of `acceptors`.
    pub fn quorum(&self) -> usize {
        self.acceptors.len() / 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_is_strict_majority() {
        assert_eq!(Config::new(vec![0, 1, 2]).quorum(), 2);
        assert_eq!(Config::new(vec![0, 1, 2, 3]).quorum(), 3);
        assert_eq!(Config::new(vec![0]).quorum(), 1);
    }

    #[test]
    fn default_discipline_is_non_strict() {
        assert_eq!(Config::new(vec![0]).discipline(), AcceptorDiscipline::NonStrict);
    }
}
