//! # Fault Tolerance
//!
//! Chain behaviour under broken links and missing endpoints, masking mode.
//!
//! ## Topologies
//!
//! 1. **Skip**: 0 → 1 down, the chain routes 0 → 2 and still reports
//! 2. **Stranded**: 0 cannot reach anyone, the chain stops at `l_act = {0}`
//! 3. **Quorum shortfall**: too few phase 1 contributions, no phase 2
//! 4. **Kickoff fallback**: the DC cannot reach 0 and starts the chain at 1

#[cfg(test)]
mod tests {
    use crate::harness::ClusterBuilder;
    use aggft_protocol::Mode;

    // =============================================================================
    // CHAIN SKIPS
    // =============================================================================

    /// 0 → 1 is down. 0 forwards to 2, which closes the chain with l_act = {0, 2}.
    #[tokio::test(start_paused = true)]
    async fn test_chain_skips_unreachable_endpoint() {
        // Setup: N=3, n_min=2, one dead SM → SM link
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .n_min(2)
            .link_down(0, 1)
            .build()
            .run(1)
            .await;

        // Assert: DC decoded m0 + m2
        let dc = outcome.dc_round(0);
        assert!(dc.terminated);
        assert!(dc.success, "chain should survive a single dead link");
        assert_eq!(dc.phase_1_sms, vec![0, 1, 2]);
        assert_eq!(dc.phase_2_sms, vec![0, 2]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[0, 2])));

        // Assert: endpoint roles
        let sm0 = outcome.sm_round(0, 0);
        assert!(sm0.activated);
        assert!(!sm0.reported);
        assert_eq!(sm0.net.net_snd_fail, 1, "0 → 1 attempt must be counted");

        let sm1 = outcome.sm_round(1, 0);
        assert!(sm1.contributed);
        assert!(!sm1.activated);

        let sm2 = outcome.sm_round(2, 0);
        assert!(sm2.activated);
        assert!(sm2.reported);
    }

    /// Same skip, but 0 already knows 1 is gone and never tries.
    #[tokio::test(start_paused = true)]
    async fn test_chain_skips_known_dead_link_without_sending() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .invalid_sm_link(0, 1)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.phase_2_sms, vec![0, 2]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[0, 2])));

        let sm0 = outcome.sm_round(0, 0);
        assert_eq!(sm0.net.net_snd_fail, 0);
        assert_eq!(sm0.net.net_snd_succ, 2, "contribution plus one forward");
    }

    /// 0 → 1 is down and 2 cannot reach the DC at all. 2 never contributes,
    /// so the chain is {0, 1} and dies at 0 with l_act = {0}.
    #[tokio::test(start_paused = true)]
    async fn test_skip_with_last_endpoint_cut_off_from_dc() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .link_down(0, 1)
            .dc_link_down(2)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert_eq!(dc.phase_1_sms, vec![0, 1]);
        assert!(!dc.success);
        assert_eq!(dc.aggregate, None);

        assert!(!outcome.sm_round(2, 0).contributed);
        assert!(outcome.sm_round(0, 0).activated);
        assert!(!outcome.sm_round(0, 0).reported);
    }

    // =============================================================================
    // STRANDED CHAIN
    // =============================================================================

    /// 0 can reach neither 1 nor 2: l_act = {0} < n_min, nobody reports.
    #[tokio::test(start_paused = true)]
    async fn test_stranded_chain_reports_nothing() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .link_down(0, 1)
            .link_down(0, 2)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.terminated);
        assert!(!dc.success);
        assert_eq!(dc.phase_1_count, 3);
        assert_eq!(dc.phase_2_count, 0);
        assert_eq!(dc.net.net_rcv, 3, "only the contributions arrive");

        let sm0 = outcome.sm_round(0, 0);
        assert!(sm0.activated);
        assert!(!sm0.reported);
        assert_eq!(sm0.net.net_snd_fail, 2);

        for id in [1, 2] {
            assert!(!outcome.sm_round(id, 0).activated);
        }
    }

    /// Quorum of three with 1 → 2 down: 1 holds l_act = {0, 1} and l_rem
    /// empty, so it is last but below quorum.
    #[tokio::test(start_paused = true)]
    async fn test_chain_below_quorum_at_end() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .n_min(3)
            .link_down(1, 2)
            .build()
            .run(1)
            .await;

        assert!(!outcome.dc_round(0).success);
        assert!(outcome.sm_round(1, 0).activated);
        assert!(!outcome.sm_round(1, 0).reported);
        assert!(!outcome.sm_round(2, 0).activated);
    }

    // =============================================================================
    // PHASE 1 FAILURES
    // =============================================================================

    /// N=3, n_min=3, endpoint 2 is offline: the DC never starts phase 2.
    #[tokio::test(start_paused = true)]
    async fn test_quorum_shortfall_skips_phase_2() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .n_min(3)
            .node_down(2)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.terminated);
        assert!(!dc.success);
        assert_eq!(dc.phase_1_count, 2);
        assert_eq!(dc.net.net_snd(), 0, "no activation may be sent");

        assert!(!outcome.sm_round(2, 0).contributed);
        for id in [0, 1] {
            let sm = outcome.sm_round(id, 0);
            assert!(sm.contributed);
            assert!(!sm.activated);
        }
    }

    /// An endpoint that cannot reach the DC is simply left out.
    #[tokio::test(start_paused = true)]
    async fn test_missing_contributor_is_left_out_of_chain() {
        let outcome = ClusterBuilder::new(Mode::Masking, 4)
            .invalid_dc_link(1)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.phase_1_sms, vec![0, 2, 3]);
        assert_eq!(dc.phase_2_sms, vec![0, 2, 3]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[0, 2, 3])));
        assert!(!outcome.sm_round(1, 0).activated);
    }

    // =============================================================================
    // KICKOFF
    // =============================================================================

    /// DC → 0 is down: the DC tries 0, then starts the chain at 1.
    #[tokio::test(start_paused = true)]
    async fn test_kickoff_falls_back_to_next_contributor() {
        let outcome = ClusterBuilder::new(Mode::Masking, 3)
            .kickoff_down(0)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(dc.success);
        assert_eq!(dc.net.net_snd_fail, 1);
        assert_eq!(dc.net.net_snd_succ, 1);
        assert_eq!(dc.phase_2_sms, vec![1, 2]);
        assert_eq!(dc.aggregate, Some(outcome.expected_aggregate(0, &[1, 2])));
        assert!(!outcome.sm_round(0, 0).activated);
    }

    /// The DC reaches nobody: the round ends unsuccessfully after every attempt.
    #[tokio::test(start_paused = true)]
    async fn test_kickoff_with_no_reachable_endpoint() {
        let outcome = ClusterBuilder::new(Mode::Masking, 2)
            .kickoff_down(0)
            .kickoff_down(1)
            .build()
            .run(1)
            .await;

        let dc = outcome.dc_round(0);
        assert!(!dc.success);
        assert_eq!(dc.phase_1_count, 2);
        assert_eq!(dc.net.net_snd_fail, 2);
    }
}
