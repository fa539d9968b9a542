//! # Summary
//!
//! This module defines the `Value` bound every consensus payload must
//! satisfy, and the `Role` trait the three role state machines implement.
//! A `Role` is a pure step function: `(current state, input msg) ->
//! outgoing messages`, with state mutation permitted only because each
//! role instance is understood to be owned exclusively by its hosting
//! actor. Combinators are themselves built from `Role` -- they hold an
//! inner role plus extra bookkeeping and expose their own `step`.

use crate::message::{Address, Msg};

/// Bound every value the protocol agrees on must satisfy: an opaque,
/// equality-comparable payload. `Clone` and `Debug` let role state
/// machines carry values across steps and log them the way "Paxos Made
/// Moderately Complex" logs every `PValue`/`Command` it touches.
pub trait Value: Clone + std::fmt::Debug + PartialEq {}

impl<T> Value for T where T: Clone + std::fmt::Debug + PartialEq {}

/// A pure message-step state machine. `step` is total over the message
/// variants a role recognizes and a no-op (empty output) on anything
/// else -- never a panic, never a retransmit.
pub trait Role<T: Value> {
    /// Consume one input message, returning every outgoing message it
    /// produces, addressed to the role instance that should receive it.
    fn step(&mut self, msg: Msg<T>) -> Vec<(Address, Msg<T>)>;
}
