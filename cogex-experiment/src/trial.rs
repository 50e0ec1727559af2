use cogex_core::{KeyResponse, MediaHook};
use cogex_timing::TimerHandle;
use std::time::Duration;

/// Host callbacks delivered to a running trial.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialEvent {
    Media(MediaHook),
    TimerFired(TimerHandle),
    Response(KeyResponse),
}

/// Delay from playback (re)start until `stop`, measured from `start` (or 0).
///
/// Negative or NaN spans fire immediately.
pub fn stop_delay(start: Option<f64>, stop: f64) -> Duration {
    let secs = (stop - start.unwrap_or(0.0)).max(0.0);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::stop_delay;
    use proptest::prelude::*;
    use std::time::Duration;

    #[test]
    fn stop_without_start_counts_from_zero() {
        assert_eq!(stop_delay(None, 3.0), Duration::from_millis(3000));
    }

    #[test]
    fn stop_counts_from_start() {
        assert_eq!(stop_delay(Some(1.0), 3.0), Duration::from_millis(2000));
    }

    #[test]
    fn stop_before_start_fires_immediately() {
        assert_eq!(stop_delay(Some(4.0), 3.0), Duration::ZERO);
        assert_eq!(stop_delay(None, f64::NAN), Duration::ZERO);
    }

    #[test]
    fn infinite_stop_saturates() {
        assert_eq!(stop_delay(None, f64::INFINITY), Duration::MAX);
    }

    proptest! {
        #[test]
        fn delay_matches_whole_millisecond_span(start_ms in 0u64..600_000, span_ms in 0u64..600_000) {
            let start = start_ms as f64 / 1000.0;
            let stop = (start_ms + span_ms) as f64 / 1000.0;
            let delay = stop_delay(Some(start), stop);
            let expected = Duration::from_millis(span_ms);
            let diff = if delay > expected { delay - expected } else { expected - delay };
            prop_assert!(diff < Duration::from_micros(1), "{delay:?} vs {expected:?}");
        }
    }
}
