//! # Summary
//!
//! This module implements the stoppable-Paxos cross-slot veto. It is a
//! `bunch::PostProcess` that inspects only `Phase2A` outputs and, using
//! the snapshot of every other slot's latest proposal, replaces a
//! payload with `Voided` whenever emitting it unchanged would violate
//! the rule: once a `Stop` is chosen at slot `j`, no later slot may have
//! a non-`Voided` `Data` entry at a ballot >= the `Stop`'s, and
//! symmetrically for a `Stop` emitted after a later slot's `Data`.
//!
//! Voiding at emission time is a conservative enforcement: it is
//! safety-preserving but may sacrifice availability.

use hashbrown::HashMap as Map;

use crate::message::{DataOrStop, Msg, Slot};

use super::bunch::{PostProcess, SlotMeta};

/// Post-processor enforcing the stoppable-Paxos cross-slot rule over
/// values of type `DataOrStop<V>`.
pub struct Stoppable;

impl<V: Clone + std::fmt::Debug + PartialEq> PostProcess<DataOrStop<V>> for Stoppable {
    fn apply(
        &self,
        slot: Slot,
        meta: &Map<Slot, SlotMeta<DataOrStop<V>>>,
        msg: Msg<DataOrStop<V>>,
    ) -> Msg<DataOrStop<V>> {
        let (ballot, from, value) = match msg {
            Msg::Phase2A { ballot, from, value } => (ballot, from, value),
            other => return other,
        };

        let voided_reason = match &value {
            DataOrStop::Data(_) => {
                let earlier_stop = meta.iter().any(|(&j, m)| {
                    j < slot && matches!(&m.val2a, Some((_, DataOrStop::Stop(_))))
                });
                if earlier_stop {
                    Some("Data (Earlier Stop)")
                } else {
                    None
                }
            }
            DataOrStop::Stop(_) => {
                let later_data_at_or_above = meta.iter().any(|(&j, m)| {
                    j > slot
                        && matches!(
                            &m.val2a,
                            Some((mbal, v)) if !v.is_stop() && *mbal >= ballot
                        )
                });
                if later_data_at_or_above {
                    Some("Stop (Later Data)")
                } else {
                    None
                }
            }
            DataOrStop::Voided(_) => None,
        };

        let value = match voided_reason {
            Some(reason) => DataOrStop::Voided(reason.to_string()),
            None => value,
        };

        Msg::Phase2A { ballot, from, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::bunch::Identity;
    use crate::message::Ballot;

    fn meta_with(entries: Vec<(Slot, Option<(Ballot, DataOrStop<&'static str>)>)>) -> Map<Slot, SlotMeta<DataOrStop<&'static str>>> {
        entries
            .into_iter()
            .map(|(slot, val2a)| {
                (
                    slot,
                    SlotMeta {
                        has_proposed: val2a.is_some(),
                        val2a,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn data_after_earlier_stop_is_voided() {
        let meta = meta_with(vec![(1, Some((Ballot::new(1, 0), DataOrStop::Stop("s".into()))))]);
        let msg = Msg::Phase2A {
            ballot: Ballot::new(2, 0),
            from: 9,
            value: DataOrStop::Data("d"),
        };
        let out = Stoppable.apply(2, &meta, msg);
        match out {
            Msg::Phase2A { value: DataOrStop::Voided(reason), .. } => {
                assert_eq!(reason, "Data (Earlier Stop)");
            }
            other => panic!("expected voided payload, got {:?}", other),
        }
    }

    #[test]
    fn stop_before_later_data_at_or_above_ballot_is_voided() {
        let meta = meta_with(vec![(5, Some((Ballot::new(4, 0), DataOrStop::Data("d"))))]);
        let msg = Msg::Phase2A {
            ballot: Ballot::new(4, 0),
            from: 9,
            value: DataOrStop::Stop("s".into()),
        };
        let out = Stoppable.apply(3, &meta, msg);
        match out {
            Msg::Phase2A { value: DataOrStop::Voided(reason), .. } => {
                assert_eq!(reason, "Stop (Later Data)");
            }
            other => panic!("expected voided payload, got {:?}", other),
        }
    }

    #[test]
    fn stop_survives_when_later_data_ballot_is_lower() {
        let meta = meta_with(vec![(5, Some((Ballot::new(2, 0), DataOrStop::Data("d"))))]);
        let msg = Msg::Phase2A {
            ballot: Ballot::new(4, 0),
            from: 9,
            value: DataOrStop::Stop("s".into()),
        };
        let out = Stoppable.apply(3, &meta, msg);
        assert_eq!(
            out,
            Msg::Phase2A {
                ballot: Ballot::new(4, 0),
                from: 9,
                value: DataOrStop::Stop("s".into()),
            }
        );
    }

    #[test]
    fn non_phase2a_messages_pass_through_untouched() {
        let meta: Map<Slot, SlotMeta<DataOrStop<&str>>> = Map::new();
        let msg: Msg<DataOrStop<&str>> = Msg::QueryAcceptor { requester: 1 };
        assert_eq!(Stoppable.apply(0, &meta, msg.clone()), msg);
        // `Identity` is the default for slots that don't need the veto.
        assert_eq!(Identity.apply(0, &meta, msg.clone()), msg);
    }
}
