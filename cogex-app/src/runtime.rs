use crate::host::{KeyboardCapture, ScriptedDisplay};
use crate::script::{Script, ScriptAction, ScriptEvent};
use crate::sink::JsonSink;
use anyhow::{bail, Result};
use cogex_cache::PreloadCache;
use cogex_core::MediaHook;
use cogex_experiment::{TrialController, TrialEvent};
use cogex_timing::{ns_to_ms, Timer, TimerQueue};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

pub type HostController<C> =
    TrialController<ScriptedDisplay, PreloadCache, TimerQueue<C>, KeyboardCapture<C>, JsonSink>;

/// Replays a script against a started trial, firing due timers in between.
pub struct Runtime<C: Timer<Timestamp = u64>> {
    clock: C,
    origin: u64,
    pending: VecDeque<ScriptEvent>,
}

impl<C: Timer<Timestamp = u64>> Runtime<C> {
    /// `autoplay` plays the clip as soon as the trial is up, like the browser would.
    pub fn new(clock: C, script: &Script, autoplay: bool) -> Self {
        let mut pending: VecDeque<ScriptEvent> = script.ordered().into();
        if autoplay {
            pending.push_front(ScriptEvent {
                at_ms: 0,
                action: ScriptAction::Play,
            });
        }
        let origin = clock.now();
        Self {
            clock,
            origin,
            pending,
        }
    }

    /// Runs until the trial finishes. Fails when nothing left could end it.
    pub fn run(&mut self, trial: &mut HostController<C>) -> Result<()> {
        while !trial.is_finished() {
            let next_event = self
                .pending
                .front()
                .map(|e| self.origin.saturating_add(e.at_ms.saturating_mul(1_000_000)));
            let next_timer = trial.timers().next_due();

            let target = match (next_event, next_timer) {
                (None, None) => bail!(
                    "trial stalled: script exhausted with no pending timer, the clip never ended"
                ),
                (Some(event), Some(timer)) => event.min(timer),
                (Some(event), None) => event,
                (None, Some(timer)) => timer,
            };
            self.wait_until(target);

            // a timer due at the same instant as a script event fires first
            if next_timer.is_some_and(|timer| timer <= target) {
                for handle in trial.timers_mut().take_due() {
                    trial.handle_event(TrialEvent::TimerFired(handle));
                }
                continue;
            }

            if let Some(event) = self.pending.pop_front() {
                debug!(at_ms = event.at_ms, action = ?event.action, "script event");
                self.dispatch(trial, event.action);
            }
        }
        Ok(())
    }

    /// Milliseconds since the runtime started, on its clock.
    pub fn elapsed_ms(&self) -> f64 {
        ns_to_ms(self.clock.now().saturating_sub(self.origin))
    }

    fn wait_until(&self, target: u64) {
        let now = self.clock.now();
        if target > now {
            self.clock.sleep(Duration::from_nanos(target - now));
        }
    }

    fn dispatch(&self, trial: &mut HostController<C>, action: ScriptAction) {
        match action {
            ScriptAction::Play => {
                let fire = trial.display_mut().video_mut().is_some_and(|v| v.play());
                if fire {
                    trial.handle_event(TrialEvent::Media(MediaHook::Play));
                }
            }
            ScriptAction::Pause => {
                if let Some(video) = trial.display_mut().video_mut() {
                    video.pause();
                }
            }
            ScriptAction::Ended => {
                let fire = trial
                    .display_mut()
                    .video_mut()
                    .is_some_and(|v| v.finish());
                if fire {
                    trial.handle_event(TrialEvent::Media(MediaHook::Ended));
                }
            }
            ScriptAction::KeyDown { key } => {
                if let Some(response) = trial.responses_mut().key_down(key) {
                    trial.handle_event(TrialEvent::Response(response));
                }
            }
            ScriptAction::KeyUp { key } => trial.responses_mut().key_up(&key),
        }
    }
}
