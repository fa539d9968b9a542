//! # Summary
//!
//! This module groups the three combinators that lift the leaf role
//! state machines from single-decree Paxos into multi-decree and
//! stoppable operation, without touching a single line of
//! `acceptor`/`proposer`/`learner` logic. Each combinator wraps an
//! inner `Role` (or a family of them) and exposes its own `step`.

pub mod bunch;
pub mod slot;
pub mod stoppable;

pub use bunch::Bunch;
pub use slot::SlotReplicated;
pub use stoppable::Stoppable;
