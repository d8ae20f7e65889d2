//! # TCP Transport
//!
//! Full rounds over loopback sockets with the real clock. Rounds are kept
//! short; each test finishes in a few seconds.

#[cfg(test)]
mod tests {
    use crate::harness::{default_measurement, K};
    use aggft_crypto::generate_prf_keys;
    use aggft_network::{Address, TcpNetworkManager};
    use aggft_protocol::{
        AggregationRole, DataConcentrator, DcKeys, FnMeasurement, Metadata, MetadataBuilder,
        Mode, SmKeys, SmartMeter,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Reserve a loopback port by binding and releasing it.
    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .map(|addr| addr.port())
            .expect("no free port")
    }

    fn loopback_metadata(n: usize) -> Metadata {
        let dc = Address::new("127.0.0.1", free_port());
        let sms: Vec<Address> = (0..n)
            .map(|_| Address::new("127.0.0.1", free_port()))
            .collect();
        MetadataBuilder::new(Mode::Masking, dc, sms)
            .n_min(2)
            .t_start(Instant::now() + Duration::from_millis(300))
            .round_len(Duration::from_secs(2))
            .phase_1_len(Duration::from_secs(1))
            .build()
            .expect("valid metadata")
    }

    // =============================================================================
    // ROUNDS OVER TCP
    // =============================================================================

    /// Endpoint 1 is never started. The DC leaves it out of `l_rem` and 0
    /// forwards straight to 2.
    #[tokio::test]
    async fn test_masking_round_over_tcp_with_missing_endpoint() {
        // Setup: three endpoints, only 0 and 2 running
        let meta = loopback_metadata(3);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let keys = generate_prf_keys(&mut rng, 3);

        let mut dc = DataConcentrator::new(
            meta.clone()
                .into_dc(DcKeys::masking(K, keys.clone()).expect("modulus"))
                .expect("dc metadata"),
            Arc::new(TcpNetworkManager::new()),
        );
        let dc_reports = dc.reports();

        let mut handles = vec![tokio::spawn(async move { dc.run_once().await })];
        let mut sm_reports = Vec::new();
        for id in [0, 2] {
            let sm_meta = meta
                .clone()
                .into_sm(id, SmKeys::masking(K, keys[id].clone()).expect("modulus"))
                .expect("sm metadata");
            let mut sm = SmartMeter::new(sm_meta, Arc::new(TcpNetworkManager::new()))
                .with_measurements(Arc::new(FnMeasurement(default_measurement)));
            sm_reports.push(sm.reports());
            handles.push(tokio::spawn(async move { sm.run_once().await }));
        }

        // Act: run the round to completion
        for handle in handles {
            handle.await.expect("task panicked").expect("role failed");
        }

        // Assert: aggregate over {0, 2}
        let report = dc_reports.last().expect("dc report");
        assert!(report.success);
        assert_eq!(report.phase_1_sms, vec![0, 2]);
        assert_eq!(report.phase_2_sms, vec![0, 2]);
        let expected = u128::from(default_measurement(0, 0) + default_measurement(2, 0));
        assert_eq!(report.aggregate, Some(expected));

        let sm0 = sm_reports[0].last().expect("sm 0 report");
        assert!(sm0.activated);
        assert_eq!(sm0.net.net_snd_fail, 0, "1 is never a candidate");
        assert!(sm_reports[1].last().expect("sm 2 report").reported);
    }

    /// Two endpoints, two rounds on the same listeners.
    #[tokio::test]
    async fn test_consecutive_rounds_over_tcp() {
        let meta = loopback_metadata(2);
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let keys = generate_prf_keys(&mut rng, 2);

        let mut dc = DataConcentrator::new(
            meta.clone()
                .into_dc(DcKeys::masking(K, keys.clone()).expect("modulus"))
                .expect("dc metadata"),
            Arc::new(TcpNetworkManager::new()),
        );
        let dc_reports = dc.reports();

        let mut handles = vec![tokio::spawn(async move { dc.run_rounds(2).await })];
        for (id, key) in keys.into_iter().enumerate() {
            let sm_meta = meta
                .clone()
                .into_sm(id, SmKeys::masking(K, key).expect("modulus"))
                .expect("sm metadata");
            let mut sm = SmartMeter::new(sm_meta, Arc::new(TcpNetworkManager::new()));
            handles.push(tokio::spawn(async move { sm.run_rounds(2).await }));
        }
        for handle in handles {
            handle.await.expect("task panicked").expect("role failed");
        }

        let reports = dc_reports.snapshot();
        assert_eq!(reports.len(), 2);
        for report in reports {
            assert!(report.success, "round {} failed", report.round);
            // Default measurement source reads 1 per endpoint
            assert_eq!(report.aggregate, Some(2));
        }
    }
}
