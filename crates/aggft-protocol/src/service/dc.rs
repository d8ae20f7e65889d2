//! Data Concentrator
//!
//! ```text
//! WaitingForStart → Phase1 → Terminated
//!                          ↘ Phase2 → Idle
//! ```
//!
//! Phase 1 collects contributions until every endpoint reported or the
//! phase ends. With at least `n_min` contributors the DC hands `s_initial`
//! to the first reachable one and waits for the single phase 2 result.

use super::send_message;
use crate::backend::DcBackend;
use crate::domain::{
    check_ids, check_result, check_round, Accumulator, Contribution, DcMetadata, DcReport,
    DcRound, Message, Metadata, ProtocolResult, Rejection, ReportLog, SmId,
};
use crate::metrics;
use crate::ports::AggregationRole;
use aggft_network::{Inbox, NetworkManager};
use aggft_telemetry::log_round_event;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

const ROLE: &str = "dc";

/// The aggregator role.
pub struct DataConcentrator<N: NetworkManager> {
    meta: Metadata,
    backend: DcBackend,
    network: Arc<N>,
    rng: ChaCha20Rng,
    reports: ReportLog<DcReport>,
}

impl<N: NetworkManager> DataConcentrator<N> {
    /// Create a DC with an OS-seeded RNG.
    pub fn new(meta: DcMetadata, network: Arc<N>) -> Self {
        let (meta, keys) = meta.into_parts();
        Self {
            meta,
            backend: DcBackend::from_keys(keys),
            network,
            rng: ChaCha20Rng::from_entropy(),
            reports: ReportLog::default(),
        }
    }

    /// Replace the RNG (for deterministic tests).
    pub fn with_rng(mut self, rng: ChaCha20Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    async fn listen(&self) -> ProtocolResult<Inbox> {
        Ok(self.network.listen(self.meta.dc_address()).await?)
    }

    async fn run_single_round(&mut self, inbox: &mut Inbox, round: u64) {
        let span = info_span!("round", role = ROLE, round);
        async {
            let schedule = *self.meta.schedule();
            tokio::time::sleep_until(schedule.round_start(round)).await;

            let report = DcReport {
                round,
                t_start: schedule.elapsed(Instant::now()),
                ..DcReport::default()
            };
            let state = self.run_phase_1(inbox, DcRound::new(round, report)).await;
            let state = self.run_phase_2(inbox, state).await;
            self.finish(state);
        }
        .instrument(span)
        .await
    }

    async fn run_phase_1(&self, inbox: &mut Inbox, mut state: DcRound) -> DcRound {
        let schedule = *self.meta.schedule();
        let deadline = schedule.phase_1_end(state.round);

        while state.data.len() < self.meta.n() {
            let Some(bytes) = inbox.recv_until(deadline).await else {
                break;
            };
            state.report.net.record_received(bytes.len());
            metrics::record_message_received(ROLE);

            match self.accept_contribution(&state, &bytes) {
                Ok((id, contribution)) => {
                    debug!(id, "Accepted contribution");
                    state.data.insert(id, contribution);
                }
                Err(rejection) => debug!(%rejection, "Discarded phase 1 message"),
            }
        }

        state.report.t_phase_1 = schedule.elapsed(Instant::now());
        state.report.phase_1_count = state.data.len();
        state.report.phase_1_sms = state.data.keys().copied().collect();
        state
    }

    fn accept_contribution(
        &self,
        state: &DcRound,
        bytes: &[u8],
    ) -> Result<(SmId, Contribution), Rejection> {
        let message = Message::decode(bytes).map_err(|_| Rejection::Malformed)?;
        let (round, id, data) = match message {
            Message::Contribution { round, id, data } => (round, id, data),
            other => return Err(Rejection::UnexpectedKind(other.kind())),
        };
        check_round(state.round, round)?;
        check_ids([&id], self.meta.n())?;
        if state.data.contains_key(&id) {
            return Err(Rejection::Duplicate(id));
        }
        let contribution = self.backend.parse_contribution(round, id, &data)?;
        Ok((id, contribution))
    }

    /// Kick off the chain and collect the result. Leaves the report
    /// unsuccessful on quorum shortfall or when nobody can be activated.
    async fn run_phase_2(&mut self, inbox: &mut Inbox, mut state: DcRound) -> DcRound {
        if state.data.len() < self.meta.n_min() {
            info!(
                contributors = state.data.len(),
                n_min = self.meta.n_min(),
                "Quorum not met in phase 1"
            );
            return state;
        }

        match self.backend.generate_s_initial(&mut self.rng) {
            Ok(s_initial) => state.s_initial = Some(s_initial),
            Err(e) => {
                warn!(error = %e, "Failed to generate initial accumulator");
                return state;
            }
        }

        let Some(first) = self.activate_first_sm(&mut state).await else {
            info!("No endpoint could be activated");
            return state;
        };
        info!(first, "Chain started");

        self.collect_result(inbox, state).await
    }

    /// Try contributors in ascending order until one accepts the activation.
    async fn activate_first_sm(&self, state: &mut DcRound) -> Option<SmId> {
        let s_initial = state.s_initial.clone()?;
        let deadline = self.meta.schedule().round_end(state.round);
        let mut l_rem = state.l_rem();

        for id in state.l_rem() {
            let Some(address) = self.meta.sm_address(id).filter(|a| a.valid) else {
                debug!(id, "Skipping unreachable endpoint");
                metrics::record_chain_skip();
                l_rem.remove(&id);
                continue;
            };
            let message = Message::Activation {
                round: state.round,
                s: s_initial.clone(),
                l_rem: l_rem.clone(),
                l_act: BTreeSet::new(),
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
                return Some(id);
            }
            metrics::record_chain_skip();
            l_rem.remove(&id);
        }
        None
    }

    /// First valid result wins; later ones are counted and ignored.
    async fn collect_result(&self, inbox: &mut Inbox, mut state: DcRound) -> DcRound {
        let deadline = self.meta.schedule().round_end(state.round);
        let mut decided = false;

        while let Some(bytes) = inbox.recv_until(deadline).await {
            state.report.net.record_received(bytes.len());
            metrics::record_message_received(ROLE);
            if decided {
                debug!("Ignored message after result");
                continue;
            }

            let (s_final, l_act) = match self.accept_result(&state, &bytes) {
                Ok(result) => result,
                Err(rejection) => {
                    debug!(%rejection, "Discarded phase 2 message");
                    continue;
                }
            };
            decided = true;

            let Some(s_initial) = state.s_initial.as_ref() else {
                continue;
            };
            match self
                .backend
                .calc_aggregate(&state.data, s_initial, &s_final, &l_act)
            {
                Ok(aggregate) => {
                    state.report.success = true;
                    state.report.aggregate = Some(aggregate);
                    state.report.phase_2_count = l_act.len();
                    state.report.phase_2_sms = l_act.into_iter().collect();
                    log_round_event!(
                        info,
                        ROLE,
                        state.round,
                        "Aggregate computed",
                        aggregate,
                        contributors = state.report.phase_2_count
                    );
                }
                Err(e) => warn!(error = %e, "Failed to compute aggregate"),
            }
        }
        state
    }

    fn accept_result(
        &self,
        state: &DcRound,
        bytes: &[u8],
    ) -> Result<(Accumulator, BTreeSet<SmId>), Rejection> {
        let message = Message::decode(bytes).map_err(|_| Rejection::Malformed)?;
        let (round, s, l_act) = match message {
            Message::Result { round, s, l_act } => (round, s, l_act),
            other => return Err(Rejection::UnexpectedKind(other.kind())),
        };
        check_round(state.round, round)?;
        check_result(self.meta.n(), self.meta.n_min(), &state.l_rem(), &l_act)?;
        self.backend.check_result(&s)?;
        Ok((s, l_act))
    }

    fn finish(&self, mut state: DcRound) {
        state.report.terminated = true;
        state.report.t_end = self.meta.schedule().elapsed(Instant::now());

        let outcome = if state.report.success {
            "success"
        } else if state.report.phase_1_count < self.meta.n_min() {
            "quorum_shortfall"
        } else {
            "no_result"
        };
        metrics::record_round(ROLE, outcome);
        log_round_event!(
            info,
            ROLE,
            state.round,
            "Round finished",
            outcome,
            phase_1_count = state.report.phase_1_count
        );
        self.reports.push(state.report);
    }
}

#[async_trait]
impl<N: NetworkManager> AggregationRole for DataConcentrator<N> {
    type Report = DcReport;

    async fn run_once(&mut self) -> ProtocolResult<()> {
        self.run_rounds(1).await
    }

    async fn run_rounds(&mut self, count: u64) -> ProtocolResult<()> {
        let mut inbox = self.listen().await?;
        info!(role = ROLE, "Waiting for operation start");
        for round in 0..count {
            self.run_single_round(&mut inbox, round).await;
        }
        self.network.stop().await;
        Ok(())
    }

    async fn run_forever(&mut self) -> ProtocolResult<()> {
        let mut inbox = self.listen().await?;
        info!(role = ROLE, "Waiting for operation start");
        let mut round = 0;
        loop {
            self.run_single_round(&mut inbox, round).await;
            round += 1;
        }
    }

    fn reports(&self) -> ReportLog<DcReport> {
        self.reports.clone()
    }
}
