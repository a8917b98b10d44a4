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
use super::estimator::BandwidthEstimator;
use super::CongestionStats;
use super::CongestionStrategy;
use super::ConnectionState;
use crate::MIN_SSTHRESH;

/// Factor applied to the estimated BDP when capping window growth. A window
/// larger than twice the pipe only builds queue, it does not add rate.
const BDP_CAP_GAIN: u64 = 2;

/// Upper bound for a loss-time threshold, relative to the current window.
/// Keeps one noisy post-loss bandwidth estimate from exploding the window.
const MAX_SSTHRESH_GAIN: u64 = 4;

/// Reno window growth with a Westwood-style bandwidth ceiling.
///
/// Growth is plain Reno (slow start, then additive increase) to preserve
/// fairness against standard TCP flows. The loss response differs: instead
/// of halving the window, the slow start threshold is set from the
/// estimated bandwidth-delay product of the path, and window growth is
/// capped at twice that estimate.
#[derive(Debug)]
pub struct RenoBwe {
    /// Bandwidth and RTT estimator, fed by ACK rate samples.
    estimator: BandwidthEstimator,

    /// Last congestion window reported to the log. Kept per connection so
    /// concurrent connections log independently.
    last_cwnd: u32,

    /// Congestion statistics.
    stats: CongestionStats,
}

impl RenoBwe {
    pub fn new() -> Self {
        Self {
            estimator: BandwidthEstimator::new(),
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

impl CongestionStrategy for RenoBwe {
    fn name(&self) -> &str {
        "reno_bwe"
    }

    fn init(&mut self) {
        self.estimator.reset();
        self.last_cwnd = 0;
        self.stats = Default::default();
    }

    fn on_ack_sample(&mut self, rtt_us: i32, pkts_acked: u32) {
        self.stats.samples_seen = self.stats.samples_seen.saturating_add(1);

        if !self.estimator.on_ack_sample(rtt_us, pkts_acked) {
            self.stats.samples_discarded = self.stats.samples_discarded.saturating_add(1);
            return;
        }

        self.stats.pkts_acked_in_total = self
            .stats
            .pkts_acked_in_total
            .saturating_add(pkts_acked as u64);

        trace!(
            "{}. rtt = {}us, min_rtt = {}us, bwe = {}pps, bwe_filt = {}pps",
            self.name(),
            rtt_us,
            self.estimator.min_rtt_us(),
            self.estimator.delivery_rate_pps(),
            self.estimator.filtered_rate_pps(),
        );
    }

    fn ssthresh(&mut self, state: &ConnectionState) -> u32 {
        self.stats.loss_events = self.stats.loss_events.saturating_add(1);

        let reno_half = cmp::max(state.cwnd / 2, MIN_SSTHRESH);

        let bdp_pkts = match self.estimator.bdp_pkts() {
            Some(bdp) => bdp,
            None => return reno_half,
        };

        // Bound the estimate to [2, 4*cwnd]: a pure BDP value can be noisy
        // right after a loss.
        let max_thresh = state.cwnd as u64 * MAX_SSTHRESH_GAIN;
        let target_cwnd = if bdp_pkts < MIN_SSTHRESH as u64 {
            MIN_SSTHRESH
        } else if bdp_pkts > max_thresh {
            cmp::min(max_thresh, u32::MAX as u64) as u32
        } else {
            bdp_pkts as u32
        };

        let target_cwnd = cmp::max(target_cwnd, MIN_SSTHRESH);

        debug!(
            "{}. loss event: cwnd = {}, bdp = {}, ssthresh {} -> {}",
            self.name(),
            state.cwnd,
            bdp_pkts,
            state.ssthresh,
            target_cwnd,
        );

        target_cwnd
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
                // The whole budget was spent below the threshold.
                self.log_cwnd_change(state);
                return;
            }
        }

        let w = state.cwnd;
        aimd::additive_increase(state, w, acked);

        // Westwood-style ceiling: keep the window within twice the
        // estimated pipe size.
        if let Some(bdp_pkts) = self.estimator.bdp_pkts() {
            let cap = cmp::min(bdp_pkts.saturating_mul(BDP_CAP_GAIN), u32::MAX as u64) as u32;
            if cap > 0 && state.cwnd > cap {
                state.cwnd = cap;
            }
        }

        // The hard clamp always wins, after every other adjustment.
        state.cwnd = cmp::min(state.cwnd, state.cwnd_clamp);
        self.log_cwnd_change(state);
    }

    fn undo_cwnd(&self, state: &ConnectionState) -> u32 {
        // No saved window to restore: the adjusted window is already the
        // best available estimate.
        state.cwnd
    }

    fn stats(&self) -> &CongestionStats {
        &self.stats
    }
}

impl Default for RenoBwe {
    fn default() -> Self {
        Self::new()
    }
}
