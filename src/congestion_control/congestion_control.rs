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

use core::str::FromStr;
use std::fmt;

use crate::Error;
use crate::Result;
use crate::StrategyConfig;
pub use reno::Reno;
pub use reno_bwe::RenoBwe;

/// Available congestion control algorithm
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum CongestionControlAlgorithm {
    /// RenoBWE combines Reno window growth with a Westwood-style bandwidth
    /// estimator. On loss it sets the slow start threshold from the
    /// estimated bandwidth-delay product instead of halving the window, and
    /// it caps window growth at twice the estimated BDP.
    #[default]
    RenoBwe,

    /// Plain Reno keeps the classic loss response: halve the window, grow
    /// additively. It maintains no bandwidth estimate. Mainly useful as a
    /// baseline for comparing the bandwidth-aware variant.
    Reno,
}

impl FromStr for CongestionControlAlgorithm {
    type Err = Error;

    fn from_str(algor: &str) -> Result<CongestionControlAlgorithm> {
        if algor.eq_ignore_ascii_case("reno_bwe") {
            Ok(CongestionControlAlgorithm::RenoBwe)
        } else if algor.eq_ignore_ascii_case("reno") {
            Ok(CongestionControlAlgorithm::Reno)
        } else {
            Err(Error::InvalidConfig("unknown".into()))
        }
    }
}

/// Congestion control statistics.
#[derive(Debug, Default, Clone)]
pub struct CongestionStats {
    /// Total ACK rate samples offered to the strategy.
    pub samples_seen: u64,

    /// Samples discarded as carrying no usable rate information.
    pub samples_discarded: u64,

    /// Total packets acked by valid samples.
    pub pkts_acked_in_total: u64,

    /// Loss events, i.e. threshold recomputations.
    pub loss_events: u64,
}

/// Per-connection state owned by the transport layer.
///
/// The engine reads and updates these fields during the calls defined on
/// [`CongestionStrategy`]; creation and teardown belong to the transport.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    /// Congestion window in packets. Always at least 1 and never above
    /// `cwnd_clamp`.
    pub cwnd: u32,

    /// Hard upper bound for the congestion window in packets.
    pub cwnd_clamp: u32,

    /// Slow start threshold in packets. Always at least 2.
    pub ssthresh: u32,

    /// Whether the sender is currently limited by the congestion window.
    /// Set by the transport before each `cong_avoid` call; when false the
    /// window must not grow.
    pub is_cwnd_limited: bool,

    /// Fractional window credit accumulated during additive increase.
    /// The window grows by one packet each time this reaches `cwnd`.
    pub cwnd_cnt: u32,
}

impl ConnectionState {
    /// Create the per-connection state from the given configuration.
    pub fn new(conf: &StrategyConfig) -> Result<ConnectionState> {
        conf.validate()?;

        Ok(ConnectionState {
            cwnd: conf.initial_congestion_window,
            cwnd_clamp: conf.congestion_window_clamp,
            ssthresh: conf.initial_ssthresh,
            is_cwnd_limited: false,
            cwnd_cnt: 0,
        })
    }

    /// Check if the connection is in slow start.
    pub fn in_slow_start(&self) -> bool {
        self.cwnd < self.ssthresh
    }
}

/// Congestion control interfaces shared by different strategies.
///
/// The transport layer holds one strategy instance per connection and
/// guarantees serialized, non-reentrant access for the duration of each
/// call. `init` must be called once before any other operation; calling the
/// other hooks first is a host integration bug, not a checked error.
pub trait CongestionStrategy {
    /// Name of the congestion control strategy.
    fn name(&self) -> &str;

    /// Reset the strategy state at connection strategy adoption.
    fn init(&mut self);

    /// Callback for each delivery rate sample, carrying the sample RTT in
    /// microseconds and the number of newly acked packets. Samples with a
    /// non-positive RTT or zero acked packets are discarded.
    fn on_ack_sample(&mut self, rtt_us: i32, pkts_acked: u32);

    /// Recompute the slow start threshold after a congestion loss event.
    /// The result is at least [`MIN_SSTHRESH`] packets; the caller stores
    /// it into [`ConnectionState::ssthresh`].
    ///
    /// [`MIN_SSTHRESH`]: crate::MIN_SSTHRESH
    fn ssthresh(&mut self, state: &ConnectionState) -> u32;

    /// Grow the congestion window for `acked` newly acknowledged packets,
    /// updating `state.cwnd` in place. Called once per ACK processing pass.
    fn cong_avoid(
        &mut self,
        state: &mut ConnectionState,
        ack: u32,
        acked: u32,
        in_slow_start: bool,
    );

    /// Congestion window to restore when a loss episode is retracted.
    fn undo_cwnd(&self, state: &ConnectionState) -> u32;

    /// Congestion stats.
    fn stats(&self) -> &CongestionStats;
}

impl fmt::Debug for dyn CongestionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "congestion strategy {}.", self.name())
    }
}

/// Build a congestion control strategy.
pub fn build_congestion_strategy(conf: &StrategyConfig) -> Box<dyn CongestionStrategy> {
    match conf.congestion_control_algorithm {
        CongestionControlAlgorithm::RenoBwe => Box::new(RenoBwe::new()),
        CongestionControlAlgorithm::Reno => Box::new(Reno::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn congestion_control_name() {
        let cases = [
            ("reno_bwe", Ok(CongestionControlAlgorithm::RenoBwe)),
            ("Reno_Bwe", Ok(CongestionControlAlgorithm::RenoBwe)),
            ("RENO_BWE", Ok(CongestionControlAlgorithm::RenoBwe)),
            ("reno", Ok(CongestionControlAlgorithm::Reno)),
            ("Reno", Ok(CongestionControlAlgorithm::Reno)),
            ("RENO", Ok(CongestionControlAlgorithm::Reno)),
            ("renobwe", Err(Error::InvalidConfig("unknown".into()))),
            ("westwood", Err(Error::InvalidConfig("unknown".into()))),
        ];

        for (name, algor) in cases {
            assert_eq!(CongestionControlAlgorithm::from_str(name), algor);
        }
    }

    #[test]
    fn build_strategy() {
        let mut conf = StrategyConfig::default();
        let s = build_congestion_strategy(&conf);
        assert_eq!(s.name(), "reno_bwe");
        assert_eq!(format!("{:?}", &*s), "congestion strategy reno_bwe.");

        conf.congestion_control_algorithm = CongestionControlAlgorithm::Reno;
        let s = build_congestion_strategy(&conf);
        assert_eq!(s.name(), "reno");
    }

    #[test]
    fn connection_state_new() {
        let conf = StrategyConfig::default();
        let state = ConnectionState::new(&conf).unwrap();
        assert_eq!(state.cwnd, 10);
        assert_eq!(state.cwnd_clamp, u32::MAX);
        assert_eq!(state.ssthresh, u32::MAX);
        assert_eq!(state.is_cwnd_limited, false);
        assert_eq!(state.cwnd_cnt, 0);
        assert_eq!(state.in_slow_start(), true);

        let conf = StrategyConfig {
            initial_congestion_window: 0,
            ..StrategyConfig::default()
        };
        assert!(ConnectionState::new(&conf).is_err());
    }

    #[test]
    fn slow_start_boundary() {
        let conf = StrategyConfig {
            initial_congestion_window: 10,
            initial_ssthresh: 10,
            ..StrategyConfig::default()
        };
        let state = ConnectionState::new(&conf).unwrap();
        assert_eq!(state.in_slow_start(), false);
    }

    // Walks a connection through the whole hook surface: estimator warmup,
    // a loss event, and window growth afterwards.
    #[test]
    fn strategy_lifecycle() {
        init_logger();

        let conf = StrategyConfig {
            congestion_window_clamp: 1000,
            ..StrategyConfig::default()
        };
        let mut strategy = build_congestion_strategy(&conf);
        let mut state = ConnectionState::new(&conf).unwrap();
        strategy.init();

        // Single sample: 10 packets over 10ms is 1000 packets/s.
        strategy.on_ack_sample(10_000, 10);
        assert_eq!(strategy.stats().samples_seen, 1);
        assert_eq!(strategy.stats().pkts_acked_in_total, 10);

        // Loss: BDP is 1000pps * 10ms = 10 packets, within [2, 4*cwnd].
        state.ssthresh = strategy.ssthresh(&state);
        assert_eq!(state.ssthresh, 10);
        assert_eq!(strategy.stats().loss_events, 1);

        // Growth in congestion avoidance stays below the clamp and within
        // twice the estimated BDP.
        state.is_cwnd_limited = true;
        for _ in 0..100 {
            let in_slow_start = state.in_slow_start();
            strategy.cong_avoid(&mut state, 0, 10, in_slow_start);
            assert!(state.cwnd <= state.cwnd_clamp);
            assert!(state.cwnd >= 1);
        }
        assert!(state.cwnd <= 20);

        // Undo reports the current window unchanged.
        assert_eq!(strategy.undo_cwnd(&state), state.cwnd);
    }
}

mod aimd;
mod estimator;
mod reno;
mod reno_bwe;
