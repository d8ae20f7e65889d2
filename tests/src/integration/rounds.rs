//! # Multi-Round Operation
//!
//! Rounds are independent: state never leaks from one round into the next,
//! and a fault in one round does not affect the following ones.

#[cfg(test)]
mod tests {
    use crate::harness::{ClusterBuilder, ROUND_LEN};
    use aggft_protocol::Mode;
    use std::time::Duration;

    /// Three clean rounds, each with its own measurements.
    #[tokio::test(start_paused = true)]
    async fn test_consecutive_rounds_all_succeed() {
        let outcome = ClusterBuilder::new(Mode::Masking, 4)
            .n_min(3)
            .build()
            .run(3)
            .await;

        assert_eq!(outcome.dc.len(), 3);
        for round in 0..3 {
            let dc = outcome.dc_round(round);
            assert_eq!(dc.round, round);
            assert!(dc.success, "round {round} failed");
            assert_eq!(
                dc.aggregate,
                Some(outcome.expected_aggregate(round, &[0, 1, 2, 3]))
            );
            assert_eq!(dc.t_start, ROUND_LEN * round as u32);
        }
        for reports in &outcome.sms {
            assert_eq!(reports.len(), 3);
        }
    }

    /// Every round finishes no later than its scheduled end.
    #[tokio::test(start_paused = true)]
    async fn test_rounds_respect_schedule() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .link_down(0, 1)
            .link_down(0, 2)
            .build()
            .run(2)
            .await;

        for round in 0..2 {
            let dc = outcome.dc_round(round);
            let end = ROUND_LEN * (round as u32 + 1);
            assert!(dc.t_end <= end, "round {round} overran: {:?}", dc.t_end);
            assert!(!dc.success);
            for id in 0..3 {
                assert!(outcome.sm_round(id, round).t_end <= end);
            }
        }
    }

    /// Endpoint 1 is offline in round 0 and back for round 1.
    #[tokio::test(start_paused = true)]
    async fn test_recovered_endpoint_rejoins() {
        let cluster = ClusterBuilder::new(Mode::Masking, 3)
            .n_min(3)
            .node_down(1)
            .build();

        // Bring 1 back during the quiet tail of round 0
        let net = cluster.net.clone();
        let sm1 = cluster.meta.sm_addresses()[1].clone();
        let recover_at = cluster.meta.schedule().round_end(0) - Duration::from_secs(1);
        tokio::spawn(async move {
            tokio::time::sleep_until(recover_at).await;
            net.set_node(&sm1, true);
        });

        let outcome = cluster.run(2).await;

        let round_0 = outcome.dc_round(0);
        assert!(!round_0.success);
        assert_eq!(round_0.phase_1_sms, vec![0, 2]);

        let round_1 = outcome.dc_round(1);
        assert!(round_1.success);
        assert_eq!(round_1.phase_2_sms, vec![0, 1, 2]);
        assert_eq!(
            round_1.aggregate,
            Some(outcome.expected_aggregate(1, &[0, 1, 2]))
        );
        assert!(outcome.sm_round(1, 1).activated);
    }

    /// Fresh encryption randomness every round, exact sums throughout.
    #[tokio::test(start_paused = true)]
    async fn test_homomorphic_rounds() {
        let outcome = ClusterBuilder::new(Mode::Homomorphic, 3)
            .build()
            .run(2)
            .await;

        for round in 0..2 {
            let dc = outcome.dc_round(round);
            assert!(dc.success);
            assert_eq!(
                dc.aggregate,
                Some(outcome.expected_aggregate(round, &[0, 1, 2]))
            );
        }
    }
}
