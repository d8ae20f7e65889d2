//! Smart Meter
//!
//! ```text
//! PrepareData → Phase1Send → Aborted
//!                          ↘ WaitActivation → NotActivated
//!                                           ↘ Act → Idle
//! ```
//!
//! An activated endpoint folds its secret into the accumulator and forwards
//! it to the smallest reachable id left in `l_rem`. The last endpoint of the
//! chain reports to the DC if `l_act` reached the quorum.

use super::send_message;
use crate::adapters::ConstantMeasurement;
use crate::backend::SmBackend;
use crate::domain::{
    check_activation, check_round, Accumulator, Chain, Message, Metadata, ProtocolResult,
    Rejection, ReportLog, SmId, SmMetadata, SmReport, SmRound,
};
use crate::metrics;
use crate::ports::{AggregationRole, MeasurementSource};
use aggft_network::{Address, Inbox, NetworkManager};
use aggft_telemetry::log_round_event;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

const ROLE: &str = "sm";

/// A contributing endpoint.
pub struct SmartMeter<N: NetworkManager> {
    id: SmId,
    own_address: Address,
    meta: Metadata,
    backend: SmBackend,
    network: Arc<N>,
    measurements: Arc<dyn MeasurementSource>,
    rng: ChaCha20Rng,
    reports: ReportLog<SmReport>,
}

impl<N: NetworkManager> SmartMeter<N> {
    /// Create an endpoint that measures `1` every round.
    pub fn new(meta: SmMetadata, network: Arc<N>) -> Self {
        let own_address = meta.own_address().clone();
        let (meta, id, keys) = meta.into_parts();
        Self {
            id,
            own_address,
            meta,
            backend: SmBackend::from_keys(keys),
            network,
            measurements: Arc::new(ConstantMeasurement::default()),
            rng: ChaCha20Rng::from_entropy(),
            reports: ReportLog::default(),
        }
    }

    /// Replace the RNG (for deterministic tests).
    pub fn with_rng(mut self, rng: ChaCha20Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Replace the measurement source.
    pub fn with_measurements(mut self, source: Arc<dyn MeasurementSource>) -> Self {
        self.measurements = source;
        self
    }

    pub fn id(&self) -> SmId {
        self.id
    }

    async fn listen(&self) -> ProtocolResult<Inbox> {
        Ok(self.network.listen(&self.own_address).await?)
    }

    async fn run_single_round(&mut self, inbox: &mut Inbox, round: u64) {
        let span = info_span!("round", role = ROLE, id = self.id, round);
        async {
            let schedule = *self.meta.schedule();
            tokio::time::sleep_until(schedule.round_start(round)).await;

            let measurement = self.measurements.measurement(self.id, round);
            let (passthru, payload) = self.backend.prep_data(round, measurement, &mut self.rng);
            let state = SmRound {
                round,
                passthru,
                report: SmReport {
                    id: self.id,
                    round,
                    t_start: schedule.elapsed(Instant::now()),
                    ..SmReport::default()
                },
            };

            let contribution = Message::Contribution {
                round,
                id: self.id,
                data: payload,
            };
            let state = self.run_phase_1(state, contribution).await;
            let state = if state.report.contributed {
                self.run_phase_2(inbox, state).await
            } else {
                info!("Could not reach the DC in phase 1");
                state
            };
            self.finish(state);
        }
        .instrument(span)
        .await
    }

    async fn run_phase_1(&self, mut state: SmRound, contribution: Message) -> SmRound {
        let deadline = self.meta.schedule().phase_1_end(state.round);
        state.report.contributed = send_message(
            self.network.as_ref(),
            ROLE,
            self.meta.dc_address(),
            &contribution,
            deadline,
            &mut state.report.net,
        )
        .await;
        state
    }

    async fn run_phase_2(&mut self, inbox: &mut Inbox, mut state: SmRound) -> SmRound {
        let deadline = self.meta.schedule().round_end(state.round);

        while let Some(bytes) = inbox.recv_until(deadline).await {
            state.report.net.record_received(bytes.len());
            metrics::record_message_received(ROLE);

            match self.accept_activation(state.round, &bytes) {
                Ok((s, chain)) => return self.act(state, s, chain).await,
                Err(rejection) => debug!(%rejection, "Discarded activation"),
            }
        }
        state
    }

    fn accept_activation(
        &self,
        current: u64,
        bytes: &[u8],
    ) -> Result<(Accumulator, Chain), Rejection> {
        let message = Message::decode(bytes).map_err(|_| Rejection::Malformed)?;
        let (round, s, l_rem, l_act) = match message {
            Message::Activation {
                round,
                s,
                l_rem,
                l_act,
            } => (round, s, l_rem, l_act),
            other => return Err(Rejection::UnexpectedKind(other.kind())),
        };
        check_round(current, round)?;
        check_activation(self.id, self.meta.n(), &l_rem, &l_act)?;
        self.backend.check_activation(&s)?;
        Ok((s, Chain::new(self.meta.n_min(), l_rem, l_act)))
    }

    async fn act(&mut self, mut state: SmRound, s: Accumulator, mut chain: Chain) -> SmRound {
        let round = state.round;
        let deadline = self.meta.schedule().round_end(round);

        chain.activate(self.id);
        let s_new = match self
            .backend
            .aggregate_to_s(&s, &state.passthru, &mut self.rng)
        {
            Ok(s_new) => s_new,
            Err(e) => {
                warn!(error = %e, "Failed to fold into accumulator");
                return state;
            }
        };
        state.report.activated = true;
        debug!(l_rem = ?chain.l_rem(), l_act = ?chain.l_act(), "Activated");

        while !chain.is_last() {
            if Instant::now() >= deadline {
                return state;
            }
            let Some(next) = chain.next_candidate() else {
                break;
            };
            if let Some(address) = self.meta.sm_address(next).filter(|a| a.valid) {
                let message = Message::Activation {
                    round,
                    s: s_new.clone(),
                    l_rem: chain.l_rem().clone(),
                    l_act: chain.l_act().clone(),
                };
                if send_message(
                    self.network.as_ref(),
                    ROLE,
                    address,
                    &message,
                    deadline,
                    &mut state.report.net,
                )
                .await
                {
                    debug!(next, "Forwarded activation");
                    return state;
                }
            }
            debug!(skipped = next, "Next endpoint unreachable");
            metrics::record_chain_skip();
            chain.skip(next);
        }

        let dc = self.meta.dc_address();
        if chain.reached_quorum() && dc.valid && Instant::now() < deadline {
            let message = Message::Result {
                round,
                s: s_new,
                l_act: chain.l_act().clone(),
            };
            state.report.reported = send_message(
                self.network.as_ref(),
                ROLE,
                dc,
                &message,
                deadline,
                &mut state.report.net,
            )
            .await;
            log_round_event!(
                info,
                ROLE,
                round,
                "Reported result",
                id = self.id,
                ok = state.report.reported,
                l_act = ?chain.l_act()
            );
        } else {
            debug!(l_act = ?chain.l_act(), "Chain ended without reaching the DC");
        }
        state
    }

    fn finish(&self, mut state: SmRound) {
        state.report.t_end = self.meta.schedule().elapsed(Instant::now());
        let outcome = if state.report.activated {
            "activated"
        } else if state.report.contributed {
            "idle"
        } else {
            "aborted"
        };
        metrics::record_round(ROLE, outcome);
        self.reports.push(state.report);
    }
}

#[async_trait]
impl<N: NetworkManager> AggregationRole for SmartMeter<N> {
    type Report = SmReport;

    async fn run_once(&mut self) -> ProtocolResult<()> {
        self.run_rounds(1).await
    }

    async fn run_rounds(&mut self, count: u64) -> ProtocolResult<()> {
        let mut inbox = self.listen().await?;
        for round in 0..count {
            self.run_single_round(&mut inbox, round).await;
        }
        self.network.stop().await;
        Ok(())
    }

    async fn run_forever(&mut self) -> ProtocolResult<()> {
        let mut inbox = self.listen().await?;
        let mut round = 0;
        loop {
            self.run_single_round(&mut inbox, round).await;
            round += 1;
        }
    }

    fn reports(&self) -> ReportLog<SmReport> {
        self.reports.clone()
    }
}
