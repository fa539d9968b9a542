//! # paxos-core
//!
//! Role state machines and combinators for the CORE of a Paxos-family
//! consensus library: `Acceptor`, `Proposer`, and `Learner` expressed as
//! pure message-step state machines, plus the combinators that reuse
//! that leaf logic for slot-replicated multi-decree and stoppable
//! operation. Network transport, wire serialization, and process
//! bootstrapping are external collaborators; this crate only specifies
//! the interfaces it needs from them (see `runtime::Runtime`).

#[macro_use]
extern crate derivative;

pub mod acceptor;
pub mod combinator;
pub mod config;
pub mod error;
pub mod learner;
pub mod message;
pub mod proposer;
pub mod register;
pub mod provider;
pub mod role;
pub mod runtime;
pub mod storage;

pub use acceptor::Acceptor;
pub use config::{AcceptorDiscipline, Config};
pub use error::ProposerError;
pub use learner::Learner;
pub use message::{Address, Ballot, DataOrStop, Msg, Slot};
pub use provider::Provider;
pub use proposer::Proposer;
pub use register::Register;
pub use role::{Role, Value};
pub use runtime::{LocalRuntime, Runtime, SharedRuntime};
