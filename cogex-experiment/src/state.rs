use super::config::TrialConfig;
use super::trial::{stop_delay, TrialEvent};
use cogex_core::{
    DisplaySurface, KeyResponse, ListenerHandle, MediaElement, MediaHook, MediaResolver,
    ResponseCapture, ResponseRequest, ResponseState, TimeBasis, TrialPhase, TrialResult,
    TrialSink, VideoStimulus, VIDEO_ELEMENT_ID,
};
use cogex_timing::{TimerHandle, TimerService};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrialError {
    #[error("trial needs at least one source")]
    EmptySources,
    #[error("trial was already started")]
    AlreadyStarted,
    #[error("display has no element with id {0:?} after mounting")]
    MediaElementMissing(&'static str),
}

/// Drives one video keyboard-response trial from mounting to its result.
///
/// The host forwards media, timer and keyboard callbacks through
/// [`TrialController::handle_event`]. The first of playback end, stop timer
/// or accepted keypress finalizes the trial; everything after is ignored.
pub struct TrialController<D, M, T, K, S>
where
    D: DisplaySurface,
    M: MediaResolver,
    T: TimerService,
    K: ResponseCapture,
    S: TrialSink,
{
    config: TrialConfig,
    display: D,
    resolver: M,
    timers: T,
    responses: K,
    sink: S,
    phase: TrialPhase,
    response: ResponseState,
    listener: Option<ListenerHandle>,
    armed_stop_timers: Vec<TimerHandle>,
}

impl<D, M, T, K, S> TrialController<D, M, T, K, S>
where
    D: DisplaySurface,
    M: MediaResolver,
    T: TimerService,
    K: ResponseCapture,
    S: TrialSink,
{
    pub fn new(
        config: TrialConfig,
        display: D,
        resolver: M,
        timers: T,
        responses: K,
        sink: S,
    ) -> Result<Self, TrialError> {
        if config.sources.is_empty() {
            return Err(TrialError::EmptySources);
        }
        Ok(Self {
            config,
            display,
            resolver,
            timers,
            responses,
            sink,
            phase: TrialPhase::Idle,
            response: ResponseState::default(),
            listener: None,
            armed_stop_timers: Vec::new(),
        })
    }

    /// Mounts the stimulus, wires media hooks and opens the response window.
    pub fn start(&mut self) -> Result<(), TrialError> {
        if self.phase != TrialPhase::Idle {
            return Err(TrialError::AlreadyStarted);
        }

        let preloaded = self
            .config
            .primary_source()
            .and_then(|primary| self.resolver.preloaded_buffer(primary));

        let markup = VideoStimulus {
            sources: &self.config.sources,
            width: self.config.width,
            height: self.config.height,
            autoplay: self.config.autoplay,
            controls: self.config.controls,
            prompt: self.config.prompt.as_deref(),
            source_tags: preloaded.is_none(),
        }
        .render();

        debug!(%markup, preloaded = preloaded.is_some(), "mounting stimulus");
        self.display.mount(markup);

        let wired = match self.display.element_mut(VIDEO_ELEMENT_ID) {
            Some(element) => {
                // no <source> tags were emitted, the buffer can only be attached now
                if let Some(buffer) = &preloaded {
                    element.set_src(buffer);
                }
                element.wire(MediaHook::Ended);
                element.wire(MediaHook::Play);

                if let Some(start) = self.config.start {
                    element.set_current_time(start);
                }
                if let Some(rate) = self.config.rate {
                    element.set_playback_rate(rate);
                }
                true
            }
            None => false,
        };
        if !wired {
            warn!(id = VIDEO_ELEMENT_ID, "video element missing after mount");
            self.display.clear();
            return Err(TrialError::MediaElementMissing(VIDEO_ELEMENT_ID));
        }

        if !self.config.choices.is_none() {
            let listener = self.responses.register(ResponseRequest {
                accepted_keys: self.config.choices.clone(),
                time_basis: TimeBasis::Performance,
                persist: false,
                allow_held_key: false,
            });
            debug!(?listener, choices = ?self.config.choices, "keyboard listener registered");
            self.listener = Some(listener);
        }

        self.phase = TrialPhase::Presenting;
        info!(sources = ?self.config.sources, "trial started");
        Ok(())
    }

    /// Applies a host callback. Returns whether it changed the trial.
    pub fn handle_event(&mut self, event: TrialEvent) -> bool {
        if !self.phase.allows_input() {
            debug!(?event, phase = ?self.phase, "event ignored");
            return false;
        }

        match event {
            TrialEvent::Media(MediaHook::Ended) => {
                info!("playback ended");
                self.finalize();
                true
            }
            TrialEvent::Media(MediaHook::Play) => self.arm_stop_timer(),
            TrialEvent::TimerFired(handle) if self.armed_stop_timers.contains(&handle) => {
                info!(?handle, "stop time reached");
                self.finalize();
                true
            }
            TrialEvent::Response(response) if self.listener.is_some() => {
                self.after_response(response);
                true
            }
            other => {
                debug!(event = ?other, "event not addressed to this trial");
                false
            }
        }
    }

    // Every play arms a new timer; earlier ones stay pending until finalize cancels them all.
    fn arm_stop_timer(&mut self) -> bool {
        let Some(stop) = self.config.stop else {
            return false;
        };
        let delay = stop_delay(self.config.start, stop);
        let handle = self.timers.schedule(delay);
        debug!(
            ?handle,
            delay_ms = delay.as_secs_f64() * 1000.0,
            armed = self.armed_stop_timers.len() + 1,
            "stop timer armed"
        );
        self.armed_stop_timers.push(handle);
        true
    }

    fn after_response(&mut self, response: KeyResponse) {
        let key = response.key.clone();
        let rt = response.rt;
        if self.response.record(response) {
            info!(%key, rt_ms = rt, "response recorded");
        } else {
            debug!(%key, "later response ignored");
        }
        self.finalize();
    }

    fn finalize(&mut self) {
        self.timers.cancel_all();
        self.armed_stop_timers.clear();

        if let Some(listener) = self.listener.take() {
            self.responses.cancel(listener);
        }

        let result = TrialResult::new(&self.config.sources, &self.response);

        self.display.clear();
        self.phase = TrialPhase::Finished;

        info!(
            stimulus = %result.stimulus,
            rt = ?result.rt,
            key_press = ?result.key_press,
            "trial finished"
        );
        self.sink.accept(result);
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener
    }

    /// Stop timers armed and still pending, oldest first. Empty once finished.
    pub fn armed_stop_timers(&self) -> &[TimerHandle] {
        &self.armed_stop_timers
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn resolver(&self) -> &M {
        &self.resolver
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    pub fn responses(&self) -> &K {
        &self.responses
    }

    pub fn responses_mut(&mut self) -> &mut K {
        &mut self.responses
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Hands the collaborators back to the host.
    pub fn into_parts(self) -> (D, M, T, K, S) {
        (
            self.display,
            self.resolver,
            self.timers,
            self.responses,
            self.sink,
        )
    }
}
