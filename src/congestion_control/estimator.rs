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

use crate::CA_PRIV_SIZE;
use crate::RTT_UNSET;
use crate::USEC_PER_SEC;

/// Bandwidth and RTT estimation for a connection.
///
/// Each valid ACK rate sample updates a running minimum RTT and a
/// Westwood-style delivery rate estimate: the instantaneous rate is the
/// number of acked packets divided by the sample RTT, and a one-pole
/// low-pass filter (7/8 old + 1/8 new) smooths out per-ACK noise.
///
/// The minimum RTT is never reset for the lifetime of the connection, so
/// the estimator assumes the path's base RTT does not increase.
#[derive(Debug, Clone)]
pub struct BandwidthEstimator {
    /// Minimum observed RTT in microseconds. `RTT_UNSET` until the first
    /// valid sample arrives.
    min_rtt_us: u32,

    /// Delivery rate of the most recent sample, in packets per second.
    bwe_pps: u32,

    /// Filtered delivery rate in packets per second. Zero until seeded by
    /// the first valid sample.
    bwe_filt_pps: u32,
}

// The host transport layer reserves a fixed-size private area for each
// connection's strategy state; the estimator must fit in it.
const _: () = assert!(std::mem::size_of::<BandwidthEstimator>() <= CA_PRIV_SIZE);

impl BandwidthEstimator {
    pub fn new() -> Self {
        Self {
            min_rtt_us: RTT_UNSET,
            bwe_pps: 0,
            bwe_filt_pps: 0,
        }
    }

    /// Reset the estimator to the no-sample state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Process one delivery rate sample.
    ///
    /// Returns false if the sample was discarded: a non-positive RTT or a
    /// zero packet count carries no usable rate information.
    pub fn on_ack_sample(&mut self, rtt_us: i32, pkts_acked: u32) -> bool {
        if rtt_us <= 0 || pkts_acked == 0 {
            return false;
        }
        let rtt_us = rtt_us as u32;

        if self.min_rtt_us == RTT_UNSET || rtt_us < self.min_rtt_us {
            self.min_rtt_us = rtt_us;
        }

        let inst_pps = pkts_acked as u64 * USEC_PER_SEC / rtt_us as u64;
        self.bwe_pps = cmp::min(inst_pps, u32::MAX as u64) as u32;

        self.bwe_filt_pps = if self.bwe_filt_pps == 0 {
            self.bwe_pps
        } else {
            ((7 * self.bwe_filt_pps as u64 + self.bwe_pps as u64) / 8) as u32
        };

        true
    }

    /// Minimum observed RTT in microseconds, or `RTT_UNSET`.
    pub fn min_rtt_us(&self) -> u32 {
        self.min_rtt_us
    }

    /// Delivery rate of the most recent sample, in packets per second.
    pub fn delivery_rate_pps(&self) -> u32 {
        self.bwe_pps
    }

    /// Filtered delivery rate in packets per second, zero if unseeded.
    pub fn filtered_rate_pps(&self) -> u32 {
        self.bwe_filt_pps
    }

    /// Estimated bandwidth-delay product of the path in packets.
    ///
    /// None until both a minimum RTT and a filtered rate exist.
    pub fn bdp_pkts(&self) -> Option<u64> {
        if self.min_rtt_us == RTT_UNSET || self.bwe_filt_pps == 0 {
            return None;
        }
        Some(self.bwe_filt_pps as u64 * self.min_rtt_us as u64 / USEC_PER_SEC)
    }
}

impl Default for BandwidthEstimator {
    fn default() -> Self {
        Self::new()
    }
}
