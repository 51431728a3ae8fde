//! Per-input position debouncing.
//!
//! A raw position must hold steady for `DEBOUNCE_INTERVAL_MS` before it
//! is accepted as the new stable position. This prevents false triggers
//! from mechanical contact bounce.

/// Minimum dwell time before a changed raw position is accepted.
/// 20ms absorbs contact bounce on toggle switches without a perceptible
/// input lag.
pub const DEBOUNCE_INTERVAL_MS: u32 = 20;

/// Sentinel for "no position accepted yet".
const UNKNOWN: i8 = -1;

pub struct Debouncer {
    /// Last accepted position, or -1 before the first stabilization.
    stable: i8,
    /// Most recent raw position (the stabilization candidate).
    candidate: i8,
    /// Wrapping millisecond timestamp of the last candidate change.
    last_change_ms: u32,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            stable: UNKNOWN,
            candidate: UNKNOWN,
            last_change_ms: 0,
        }
    }

    /// Feed one raw sample at time `now_ms`.
    ///
    /// `None` means the read was electrically invalid (a 3-way toggle
    /// with both contacts asserted) and keeps the current candidate.
    /// Returns the new stable position on the tick it is accepted.
    pub fn update(&mut self, raw: Option<u8>, now_ms: u32) -> Option<u8> {
        let raw = match raw {
            Some(position) => position as i8,
            None => return None,
        };

        if raw != self.candidate {
            self.candidate = raw;
            self.last_change_ms = now_ms;
            return None;
        }

        if self.candidate != self.stable
            && now_ms.wrapping_sub(self.last_change_ms) >= DEBOUNCE_INTERVAL_MS
        {
            self.stable = self.candidate;
            return Some(self.candidate as u8);
        }

        None
    }

    /// Last accepted position, if any.
    pub fn stable(&self) -> Option<u8> {
        if self.stable == UNKNOWN {
            None
        } else {
            Some(self.stable as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed the same raw position for `ticks` 1ms ticks, collecting any
    /// stabilization events.
    fn hold(
        debouncer: &mut Debouncer,
        raw: Option<u8>,
        now_ms: &mut u32,
        ticks: u32,
    ) -> std::vec::Vec<u8> {
        let mut events = std::vec::Vec::new();
        for _ in 0..ticks {
            if let Some(position) = debouncer.update(raw, *now_ms) {
                events.push(position);
            }
            *now_ms += 1;
        }
        events
    }

    #[test]
    fn test_stable_position_fires_exactly_once() {
        let mut debouncer = Debouncer::new();
        let mut now = 0;

        // Initial position stabilizes once after the dwell time.
        let events = hold(&mut debouncer, Some(0), &mut now, 50);
        assert_eq!(events, [0]);
        assert_eq!(debouncer.stable(), Some(0));

        // New position: change seen at t, accepted at t + interval.
        let events = hold(&mut debouncer, Some(1), &mut now, 50);
        assert_eq!(events, [1]);
        assert_eq!(debouncer.stable(), Some(1));
    }

    #[test]
    fn test_event_fires_at_dwell_threshold() {
        let mut debouncer = Debouncer::new();

        // Candidate recorded at t=100; ticks below the threshold emit
        // nothing, the tick crossing it emits the event.
        assert_eq!(debouncer.update(Some(2), 100), None);
        for t in 101..100 + DEBOUNCE_INTERVAL_MS {
            assert_eq!(debouncer.update(Some(2), t), None);
        }
        assert_eq!(debouncer.update(Some(2), 100 + DEBOUNCE_INTERVAL_MS), Some(2));
    }

    #[test]
    fn test_chatter_never_stabilizes() {
        let mut debouncer = Debouncer::new();
        let mut now = 0;
        hold(&mut debouncer, Some(0), &mut now, 50);

        // Oscillate faster than the dwell time: stable position holds.
        for _ in 0..100 {
            assert_eq!(debouncer.update(Some(1), now), None);
            now += 5;
            assert_eq!(debouncer.update(Some(0), now), None);
            now += 5;
        }
        assert_eq!(debouncer.stable(), Some(0));
    }

    #[test]
    fn test_invalid_sample_keeps_candidate() {
        let mut debouncer = Debouncer::new();
        let mut now = 0;
        hold(&mut debouncer, Some(0), &mut now, 50);

        // Candidate moves to 2, then invalid reads interleave. The dwell
        // clock is not reset by them, so the position still stabilizes.
        assert_eq!(debouncer.update(Some(2), now), None);
        now += 1;
        for _ in 0..5 {
            assert_eq!(debouncer.update(None, now), None);
            now += 1;
        }
        let events = hold(&mut debouncer, Some(2), &mut now, 30);
        assert_eq!(events, [2]);
    }

    #[test]
    fn test_timestamp_wraparound() {
        let mut debouncer = Debouncer::new();
        let mut now = u32::MAX - 5;

        assert_eq!(debouncer.update(Some(1), now), None);
        for _ in 0..DEBOUNCE_INTERVAL_MS {
            now = now.wrapping_add(1);
        }
        // now has wrapped past zero; the dwell comparison still holds.
        assert_eq!(debouncer.update(Some(1), now), Some(1));
    }
}
