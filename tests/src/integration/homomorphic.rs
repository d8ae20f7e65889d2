//! # Homomorphic Backend
//!
//! Paillier accumulator end to end. Smart Meters only hold the public key,
//! the DC decrypts the final ciphertext to the plain sum of `l_act`.

#[cfg(test)]
mod tests {
    use crate::harness::ClusterBuilder;
    use aggft_protocol::{FnMeasurement, Mode, SmId};

    /// N=2, both reachable: DC decrypts m0 + m1.
    #[tokio::test(start_paused = true)]
    async fn test_two_endpoints_sum() {
        let outcome = ClusterBuilder::new(Mode::Homomorphic, 2)
            .n_min(2)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.phase_2_sms, vec![0, 1]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[0, 1])));
        assert!(outcome.sm_round(1, 0).reported);
    }

    /// The chain order does not matter: with DC → 0 down, 1 activates
    /// first and 0 never joins, so the sum is over {1, 2}.
    #[tokio::test(start_paused = true)]
    async fn test_sum_independent_of_chain_start() {
        let outcome = ClusterBuilder::new(Mode::Homomorphic, 3)
            .kickoff_down(0)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.phase_2_sms, vec![1, 2]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[1, 2])));
    }

    /// Large readings do not wrap: Paillier sums exceed u64.
    #[tokio::test(start_paused = true)]
    async fn test_large_measurements() {
        let outcome = ClusterBuilder::new(Mode::Homomorphic, 3)
            .n_min(3)
            .measurements(FnMeasurement(|_id: SmId, _round: u64| u64::MAX))
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.aggregate, Some(3 * u128::from(u64::MAX)));
    }

    /// Homomorphic contributions carry no payload, a skipped endpoint still
    /// drops out of the sum.
    #[tokio::test(start_paused = true)]
    async fn test_skipped_endpoint_excluded() {
        let outcome = ClusterBuilder::new(Mode::Homomorphic, 4)
            .link_down(1, 2)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.phase_2_sms, vec![0, 1, 3]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[0, 1, 3])));
    }
}
