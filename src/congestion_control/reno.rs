// Copyright (c) 2024 The RenoBWE Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cmp;

use log::*;

use super::aimd;
use super::CongestionStats;
use super::CongestionStrategy;
use super::ConnectionState;
use crate::MIN_SSTHRESH;

/// Plain Reno congestion control.
///
/// The classic loss response: halve the window on loss, grow by one packet
/// per acked packet in slow start and by one packet per round trip in
/// congestion avoidance. Keeps no bandwidth estimate and applies no
/// bandwidth ceiling; it serves as the baseline the `reno_bwe` strategy is
/// measured against.
#[derive(Debug)]
pub struct Reno {
    /// Last congestion window reported to the log.
    last_cwnd: u32,

    /// Congestion statistics.
    stats: CongestionStats,
}

impl Reno {
    pub fn new() -> Self {
        Self {
            last_cwnd: 0,
            stats: Default::default(),
        }
    }

    fn log_cwnd_change(&mut self, state: &ConnectionState) {
        if state.cwnd != self.last_cwnd {
            trace!(
                "{}. cwnd = {}, ssthresh = {}, cwnd_cnt = {}",
                self.name(),
                state.cwnd,
                state.ssthresh,
                state.cwnd_cnt,
            );
            self.last_cwnd = state.cwnd;
        }
    }
}

impl CongestionStrategy for Reno {
    fn name(&self) -> &str {
        "reno"
    }

    fn init(&mut self) {
        self.last_cwnd = 0;
        self.stats = Default::default();
    }

    fn on_ack_sample(&mut self, rtt_us: i32, pkts_acked: u32) {
        // No estimator to feed; samples only update the counters.
        self.stats.samples_seen = self.stats.samples_seen.saturating_add(1);

        if rtt_us <= 0 || pkts_acked == 0 {
            self.stats.samples_discarded = self.stats.samples_discarded.saturating_add(1);
            return;
        }

        self.stats.pkts_acked_in_total = self
            .stats
            .pkts_acked_in_total
            .saturating_add(pkts_acked as u64);
    }

    fn ssthresh(&mut self, state: &ConnectionState) -> u32 {
        self.stats.loss_events = self.stats.loss_events.saturating_add(1);
        cmp::max(state.cwnd / 2, MIN_SSTHRESH)
    }

    fn cong_avoid(
        &mut self,
        state: &mut ConnectionState,
        _ack: u32,
        acked: u32,
        in_slow_start: bool,
    ) {
        if !state.is_cwnd_limited {
            return;
        }

        let mut acked = acked;
        if in_slow_start {
            acked = aimd::slow_start_increase(state, acked);
            if acked == 0 {
                self.log_cwnd_change(state);
                return;
            }
        }

        let w = state.cwnd;
        aimd::additive_increase(state, w, acked);

        state.cwnd = cmp::min(state.cwnd, state.cwnd_clamp);
        self.log_cwnd_change(state);
    }

    fn undo_cwnd(&self, state: &ConnectionState) -> u32 {
        state.cwnd
    }

    fn stats(&self) -> &CongestionStats {
        &self.stats
    }
}

impl Default for Reno {
    fn default() -> Self {
        Self::new()
    }
}
