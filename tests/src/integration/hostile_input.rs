//! # Hostile Input
//!
//! Garbage, out-of-round and inconsistent messages injected by a third
//! party. Every one of them is received, counted and discarded; the round
//! still produces the exact aggregate.
//!
//! Forged messages that pass validation are out of scope: the protocol has
//! no message authentication.

#[cfg(test)]
mod tests {
    use crate::harness::ClusterBuilder;
    use aggft_network::{Address, NetworkManager};
    use aggft_protocol::{Accumulator, Message, Mode, Phase1Payload, SmId};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn set(ids: &[SmId]) -> BTreeSet<SmId> {
        ids.iter().copied().collect()
    }

    fn encode(message: &Message) -> Vec<u8> {
        message.encode().expect("encodable")
    }

    /// Junk queued at the DC before the round starts.
    #[tokio::test(start_paused = true)]
    async fn test_dc_discards_junk() {
        let cluster = ClusterBuilder::new(Mode::Masking, 3).build();
        let intruder = cluster.net.manager(&Address::new("intruder", 1));
        let dc = cluster.meta.dc_address().clone();
        let schedule = *cluster.meta.schedule();

        let junk = vec![
            b"\x00\x01\x02".to_vec(),
            br#"{"kind":"contribution"}"#.to_vec(),
            encode(&Message::Contribution {
                round: 3,
                id: 0,
                data: Phase1Payload::Masked(1),
            }),
            encode(&Message::Contribution {
                round: 0,
                id: 9,
                data: Phase1Payload::Masked(1),
            }),
            encode(&Message::Result {
                round: 0,
                s: Accumulator::Masked(1),
                l_act: set(&[0, 1, 2]),
            }),
            encode(&Message::Activation {
                round: 0,
                s: Accumulator::Masked(1),
                l_rem: set(&[0]),
                l_act: set(&[]),
            }),
        ];
        let junk_count = junk.len() as u64;

        let deadline = schedule.round_end(0);
        let inject = tokio::spawn(async move {
            tokio::time::sleep_until(schedule.round_start(0) - Duration::from_millis(1)).await;
            for payload in junk {
                assert!(intruder.send(&dc, payload, deadline).await);
            }
        });

        let outcome = cluster.run(1).await;
        inject.await.expect("injector panicked");

        let report = outcome.dc_round(0);
        assert!(report.success);
        assert_eq!(report.phase_1_sms, vec![0, 1, 2]);
        assert_eq!(report.aggregate, Some(outcome.expected_aggregate(0, &[0, 1, 2])));
        assert_eq!(report.net.net_rcv, junk_count + 3 + 1);
    }

    /// Results that arrive after the accepted one change nothing.
    #[tokio::test(start_paused = true)]
    async fn test_late_results_ignored() {
        let cluster = ClusterBuilder::new(Mode::Masking, 3).build();
        let intruder = cluster.net.manager(&Address::new("intruder", 1));
        let dc = cluster.meta.dc_address().clone();
        let schedule = *cluster.meta.schedule();

        let late = [
            Message::Result {
                round: 0,
                s: Accumulator::Masked(0),
                l_act: set(&[0, 1, 2]),
            },
            Message::Result {
                round: 0,
                s: Accumulator::Masked(0),
                l_act: set(&[0]),
            },
        ];
        let inject = tokio::spawn(async move {
            tokio::time::sleep_until(schedule.round_start(0) + Duration::from_secs(1)).await;
            for message in &late {
                assert!(intruder.send(&dc, encode(message), schedule.round_end(0)).await);
            }
        });

        let outcome = cluster.run(1).await;
        inject.await.expect("injector panicked");

        let report = outcome.dc_round(0);
        assert!(report.success);
        assert_eq!(report.aggregate, Some(outcome.expected_aggregate(0, &[0, 1, 2])));
        assert_eq!(report.net.net_rcv, 3 + 1 + 2);
    }

    /// Invalid activations queued at an SM do not stop it from acting on
    /// the real one.
    #[tokio::test(start_paused = true)]
    async fn test_sm_discards_invalid_activations() {
        let cluster = ClusterBuilder::new(Mode::Masking, 3).build();
        let intruder = cluster.net.manager(&Address::new("intruder", 1));
        let sm1 = cluster.meta.sm_addresses()[1].clone();
        let schedule = *cluster.meta.schedule();

        let invalid = [
            // Wrong round
            Message::Activation {
                round: 5,
                s: Accumulator::Masked(1),
                l_rem: set(&[1, 2]),
                l_act: set(&[0]),
            },
            // Overlapping sets
            Message::Activation {
                round: 0,
                s: Accumulator::Masked(1),
                l_rem: set(&[1, 2]),
                l_act: set(&[0, 2]),
            },
            // Not addressed to 1
            Message::Activation {
                round: 0,
                s: Accumulator::Masked(1),
                l_rem: set(&[2]),
                l_act: set(&[0]),
            },
            // Ciphertext in masking mode
            Message::Activation {
                round: 0,
                s: Accumulator::Ciphertext(aggft_crypto::Ciphertext::from_raw(7_u32.into())),
                l_rem: set(&[1, 2]),
                l_act: set(&[0]),
            },
        ];
        let invalid_count = invalid.len() as u64;
        let inject = tokio::spawn(async move {
            tokio::time::sleep_until(schedule.round_start(0) - Duration::from_millis(1)).await;
            for message in &invalid {
                assert!(intruder.send(&sm1, encode(message), schedule.round_end(0)).await);
            }
        });

        let outcome = cluster.run(1).await;
        inject.await.expect("injector panicked");

        let sm = outcome.sm_round(1, 0);
        assert!(sm.activated);
        assert_eq!(sm.net.net_rcv, invalid_count + 1);
        assert!(outcome.dc_round(0).success);
    }

    /// A message replayed from round 0 into round 1 is stale.
    #[tokio::test(start_paused = true)]
    async fn test_replay_into_next_round() {
        let cluster = ClusterBuilder::new(Mode::Masking, 2).build();
        let intruder = cluster.net.manager(&Address::new("intruder", 1));
        let dc = cluster.meta.dc_address().clone();
        let schedule = *cluster.meta.schedule();

        let stale = Message::Contribution {
            round: 0,
            id: 0,
            data: Phase1Payload::Masked(42),
        };
        let inject = tokio::spawn(async move {
            tokio::time::sleep_until(schedule.round_start(1) - Duration::from_millis(1)).await;
            assert!(intruder.send(&dc, encode(&stale), schedule.round_end(1)).await);
        });

        let outcome = cluster.run(2).await;
        inject.await.expect("injector panicked");

        for round in 0..2 {
            let report = outcome.dc_round(round);
            assert!(report.success);
            assert_eq!(report.aggregate, Some(outcome.expected_aggregate(round, &[0, 1])));
        }
    }
}
