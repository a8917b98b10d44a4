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

//! RenoBWE is a per-connection TCP congestion control engine. Given a stream
//! of acknowledgment events supplied by an external transport layer, it
//! decides how the sender's congestion window should grow, how the slow
//! start threshold should be recomputed after a loss, and whether a prior
//! window reduction should be undone.
//!
//! ## Features
//!
//! * **Bandwidth-aware loss response**: the `reno_bwe` strategy estimates
//!   the path's delivery rate and minimum RTT from ACK samples and sets the
//!   slow start threshold from the bandwidth-delay product instead of plain
//!   window halving.
//! * **Reno-style fairness**: window growth follows the classic slow start
//!   and additive increase rules, so flows using this engine share capacity
//!   fairly with standard TCP.
//! * **Pluggable strategies**: strategies implement a common
//!   [`CongestionStrategy`] trait and are selected by name, mirroring the
//!   pluggable congestion control interface of common transport stacks. A
//!   plain `reno` strategy without the bandwidth ceiling is also provided.
//!
//! The engine is purely computational: it performs no I/O, keeps no locks,
//! and never allocates on the per-ACK paths. The transport layer owns the
//! [`ConnectionState`] and guarantees serialized access per connection.
//!
//! ## Get started
//!
//! ```
//! use renobwe::build_congestion_strategy;
//! use renobwe::ConnectionState;
//! use renobwe::StrategyConfig;
//!
//! let conf = StrategyConfig::default();
//! let mut strategy = build_congestion_strategy(&conf);
//! let mut state = ConnectionState::new(&conf).unwrap();
//!
//! strategy.init();
//! strategy.on_ack_sample(10_000, 10);
//!
//! state.is_cwnd_limited = true;
//! let in_slow_start = state.in_slow_start();
//! strategy.cong_avoid(&mut state, 0, 10, in_slow_start);
//!
//! // On loss the transport stores the recomputed threshold.
//! state.ssthresh = strategy.ssthresh(&state);
//! ```

pub use crate::congestion_control::build_congestion_strategy;
pub use crate::congestion_control::CongestionControlAlgorithm;
pub use crate::congestion_control::CongestionStats;
pub use crate::congestion_control::CongestionStrategy;
pub use crate::congestion_control::ConnectionState;
pub use crate::congestion_control::Reno;
pub use crate::congestion_control::RenoBwe;
pub use crate::error::Error;

/// A specialized [`Result`] type for congestion control operations.
///
/// [`Result`]: https://doc.rust-lang.org/std/result/enum.Result.html
pub type Result<T> = std::result::Result<T, Error>;

/// Sentinel value for "no RTT sample observed yet".
pub const RTT_UNSET: u32 = u32::MAX;

/// The minimal slow start threshold in packets.
///
/// A threshold below two packets would stall the window after every loss.
pub const MIN_SSTHRESH: u32 = 2;

/// Microseconds per second, the unit base for delivery rate estimation.
pub(crate) const USEC_PER_SEC: u64 = 1_000_000;

/// The default initial congestion window in packets.
/// See RFC 6928 (IW10).
const DEFAULT_INITIAL_CWND: u32 = 10;

/// Size in bytes of the per-connection private area reserved by the host
/// transport layer for strategy state: three `u32` fields plus one reserved
/// slot for future metrics. Strategy estimator state must fit in it.
pub(crate) const CA_PRIV_SIZE: usize = 16;

/// Configurations about the congestion control strategy of a connection.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// The congestion control algorithm used for a connection.
    pub congestion_control_algorithm: CongestionControlAlgorithm,

    /// The initial congestion window in packets.
    /// Endpoints SHOULD use an initial congestion window of ten packets.
    /// See RFC 6928 Section 2
    pub initial_congestion_window: u32,

    /// The hard upper bound for the congestion window in packets. The
    /// engine never grows the window beyond this value.
    pub congestion_window_clamp: u32,

    /// The initial slow start threshold in packets. The default leaves the
    /// connection in slow start until the first loss event.
    pub initial_ssthresh: u32,
}

impl Default for StrategyConfig {
    fn default() -> StrategyConfig {
        StrategyConfig {
            congestion_control_algorithm: CongestionControlAlgorithm::RenoBwe,
            initial_congestion_window: DEFAULT_INITIAL_CWND,
            congestion_window_clamp: u32::MAX,
            initial_ssthresh: u32::MAX,
        }
    }
}

impl StrategyConfig {
    /// Check the configuration invariants required by the engine.
    pub fn validate(&self) -> Result<()> {
        if self.initial_congestion_window < 1 {
            return Err(Error::InvalidConfig(
                "initial congestion window must be at least 1 packet".into(),
            ));
        }
        if self.initial_congestion_window > self.congestion_window_clamp {
            return Err(Error::InvalidConfig(
                "initial congestion window exceeds the window clamp".into(),
            ));
        }
        if self.initial_ssthresh < MIN_SSTHRESH {
            return Err(Error::InvalidConfig(
                "initial ssthresh must be at least 2 packets".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let conf = StrategyConfig::default();
        assert_eq!(
            conf.congestion_control_algorithm,
            CongestionControlAlgorithm::RenoBwe
        );
        assert_eq!(conf.initial_congestion_window, 10);
        assert_eq!(conf.congestion_window_clamp, u32::MAX);
        assert_eq!(conf.initial_ssthresh, u32::MAX);
        assert!(conf.validate().is_ok());
    }

    #[test]
    fn config_validate() {
        let mut conf = StrategyConfig {
            initial_congestion_window: 0,
            ..StrategyConfig::default()
        };
        assert!(conf.validate().is_err());

        conf.initial_congestion_window = 20;
        conf.congestion_window_clamp = 10;
        assert!(conf.validate().is_err());

        conf.congestion_window_clamp = 20;
        conf.initial_ssthresh = 1;
        assert!(conf.validate().is_err());

        conf.initial_ssthresh = MIN_SSTHRESH;
        assert!(conf.validate().is_ok());
    }
}

#[path = "congestion_control/congestion_control.rs"]
pub mod congestion_control;

pub mod error;
