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

//! Pure window growth primitives shared by the Reno family strategies.

use std::cmp;

use super::ConnectionState;

/// Exponential slow start growth.
///
/// Grows the window by one packet per acked packet, stopping at the slow
/// start threshold. Returns the unconsumed part of the `acked` budget: zero
/// means the entire budget was spent below the threshold, a non-zero value
/// means the window crossed into congestion avoidance with that much credit
/// left for additive increase.
pub(crate) fn slow_start_increase(state: &mut ConnectionState, acked: u32) -> u32 {
    let target = cmp::min(state.cwnd.saturating_add(acked), state.ssthresh);
    if target <= state.cwnd {
        // Already at or past the threshold, the whole budget is left over.
        return acked;
    }

    let consumed = target - state.cwnd;
    state.cwnd = cmp::min(target, state.cwnd_clamp);
    acked - consumed
}

/// Additive increase.
///
/// Grows the window by one packet per `w` packets of acked credit, with the
/// fractional remainder accumulated in `state.cwnd_cnt` across calls. `w`
/// is the window the credit is measured against, normally the current
/// congestion window, and must be non-zero.
pub(crate) fn additive_increase(state: &mut ConnectionState, w: u32, acked: u32) {
    if state.cwnd_cnt >= w {
        state.cwnd_cnt = 0;
        state.cwnd = state.cwnd.saturating_add(1);
    }

    state.cwnd_cnt = state.cwnd_cnt.saturating_add(acked);
    if state.cwnd_cnt >= w {
        let delta = state.cwnd_cnt / w;
        state.cwnd_cnt -= delta * w;
        state.cwnd = state.cwnd.saturating_add(delta);
    }

    state.cwnd = cmp::min(state.cwnd, state.cwnd_clamp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrategyConfig;

    fn state(cwnd: u32, clamp: u32, ssthresh: u32) -> ConnectionState {
        let conf = StrategyConfig {
            initial_congestion_window: cwnd,
            congestion_window_clamp: clamp,
            initial_ssthresh: ssthresh,
            ..StrategyConfig::default()
        };
        ConnectionState::new(&conf).unwrap()
    }

    #[test]
    fn slow_start_below_thresh() {
        let mut s = state(10, 1000, 100);
        let remaining = slow_start_increase(&mut s, 10);
        assert_eq!(s.cwnd, 20);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn slow_start_crosses_thresh() {
        let mut s = state(10, 1000, 16);
        let remaining = slow_start_increase(&mut s, 10);
        assert_eq!(s.cwnd, 16);
        assert_eq!(remaining, 4);
    }

    #[test]
    fn slow_start_at_thresh() {
        let mut s = state(16, 1000, 16);
        let remaining = slow_start_increase(&mut s, 10);
        assert_eq!(s.cwnd, 16);
        assert_eq!(remaining, 10);
    }

    #[test]
    fn slow_start_respects_clamp() {
        let mut s = state(10, 12, 100);
        let remaining = slow_start_increase(&mut s, 10);
        assert_eq!(s.cwnd, 12);
        // The consumed budget is measured against the threshold, not the
        // clamp, so nothing is left for additive increase.
        assert_eq!(remaining, 0);
    }

    #[test]
    fn additive_increase_accumulates() {
        let mut s = state(10, 1000, 2);

        // 4 acked packets per call against a window of 10: the window grows
        // on every third call once the credit reaches a full window.
        additive_increase(&mut s, 10, 4);
        assert_eq!(s.cwnd, 10);
        assert_eq!(s.cwnd_cnt, 4);

        additive_increase(&mut s, 10, 4);
        assert_eq!(s.cwnd, 10);
        assert_eq!(s.cwnd_cnt, 8);

        additive_increase(&mut s, 10, 4);
        assert_eq!(s.cwnd, 11);
        assert_eq!(s.cwnd_cnt, 2);
    }

    #[test]
    fn additive_increase_large_burst() {
        let mut s = state(10, 1000, 2);

        // A burst worth several windows grows the window by the quotient.
        additive_increase(&mut s, 10, 35);
        assert_eq!(s.cwnd, 13);
        assert_eq!(s.cwnd_cnt, 5);
    }

    #[test]
    fn additive_increase_respects_clamp() {
        let mut s = state(10, 10, 2);
        additive_increase(&mut s, 10, 100);
        assert_eq!(s.cwnd, 10);
    }

    #[test]
    fn additive_increase_carryover() {
        let mut s = state(10, 1000, 2);
        s.cwnd_cnt = 12;

        // Leftover credit from a previous window grows the window before
        // new credit is added.
        additive_increase(&mut s, 10, 1);
        assert_eq!(s.cwnd, 11);
        assert_eq!(s.cwnd_cnt, 1);
    }
}
