//! # Summary
//!
//! This module defines the single error type the core surfaces. Every
//! other recoverable condition (stale ballots, duplicate messages,
//! majority-of-none) is absorbed locally by returning no outgoing
//! messages -- only a genuine programming-error precondition violation
//! becomes a `Result::Err`, the same way "Paxos Made Moderately Complex"
//! reserves `.expect("[INTERNAL ERROR]: ...")` for conditions that
//! indicate a wiring bug rather than a runtime event.

use std::fmt;

/// Programming-error category surfaced by the core. Combinator authors
/// should treat this as a precondition-violation assertion, not a runtime
/// condition to retry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProposerError {
    /// `force_decide` (or an equivalent internal helper) was invoked before
    /// a quorum of `Phase1B` responses had been collected, or after the
    /// proposer had already reached `Decided`.
    NotReady,
}

impl fmt::Display for ProposerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProposerError::NotReady => {
                write!(f, "proposer is not ready to decide: no quorum yet, or already decided")
            }
        }
    }
}

impl std::error::Error for ProposerError {}
