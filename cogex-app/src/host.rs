use cogex_core::{
    DisplaySurface, Key, KeyResponse, ListenerHandle, MediaBuffer, MediaElement, MediaHook,
    ResponseCapture, ResponseRequest, TimeBasis, VIDEO_ELEMENT_ID,
};
use cogex_timing::{ns_to_ms, Timer};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Headless `<video>` element: remembers what the trial set on it and which
/// events it asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedVideo {
    pub src: Option<String>,
    pub current_time: f64,
    pub playback_rate: f64,
    pub paused: bool,
    pub ended: bool,
    hooks: HashSet<MediaHook>,
}

impl Default for ScriptedVideo {
    fn default() -> Self {
        Self {
            src: None,
            current_time: 0.0,
            playback_rate: 1.0,
            paused: true,
            ended: false,
            hooks: HashSet::new(),
        }
    }
}

impl ScriptedVideo {
    pub fn is_wired(&self, hook: MediaHook) -> bool {
        self.hooks.contains(&hook)
    }

    /// Starts playback. Returns true when a `play` event should reach the trial.
    pub fn play(&mut self) -> bool {
        let was_paused = std::mem::replace(&mut self.paused, false);
        self.ended = false;
        was_paused && self.is_wired(MediaHook::Play)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Playback reached the end. Returns true when `ended` should reach the trial.
    pub fn finish(&mut self) -> bool {
        self.paused = true;
        self.ended = true;
        self.is_wired(MediaHook::Ended)
    }
}

impl MediaElement for ScriptedVideo {
    fn set_src(&mut self, buffer: &MediaBuffer) {
        self.src = Some(buffer.uri());
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }

    fn wire(&mut self, hook: MediaHook) {
        self.hooks.insert(hook);
    }
}

/// Display that keeps mounted markup in memory.
#[derive(Debug, Default)]
pub struct ScriptedDisplay {
    markup: Option<String>,
    video: Option<ScriptedVideo>,
}

impl ScriptedDisplay {
    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub fn video(&self) -> Option<&ScriptedVideo> {
        self.video.as_ref()
    }

    pub fn video_mut(&mut self) -> Option<&mut ScriptedVideo> {
        self.video.as_mut()
    }
}

impl DisplaySurface for ScriptedDisplay {
    type Element = ScriptedVideo;

    fn mount(&mut self, markup: String) {
        let has_video = markup.contains(&format!("<video id=\"{VIDEO_ELEMENT_ID}\""));
        self.video = has_video.then(ScriptedVideo::default);
        self.markup = Some(markup);
    }

    fn clear(&mut self) {
        self.markup = None;
        self.video = None;
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut ScriptedVideo> {
        if id == VIDEO_ELEMENT_ID {
            self.video.as_mut()
        } else {
            None
        }
    }
}

#[derive(Debug)]
struct Listener {
    handle: ListenerHandle,
    request: ResponseRequest,
    armed_at: u64,
}

/// Keyboard capture fed with key-down/key-up events by the host.
#[derive(Debug)]
pub struct KeyboardCapture<C: Timer<Timestamp = u64>> {
    clock: C,
    next_id: u64,
    listener: Option<Listener>,
    held: HashSet<Key>,
}

impl<C: Timer<Timestamp = u64>> KeyboardCapture<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            next_id: 0,
            listener: None,
            held: HashSet::new(),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Feeds a key-down. Returns the response to deliver to the trial, if any.
    pub fn key_down(&mut self, key: Key) -> Option<KeyResponse> {
        let repeat = !self.held.insert(key.clone());
        let listener = self.listener.as_ref()?;

        if !listener.request.accepted_keys.accepts(&key) {
            debug!(%key, "key not among choices");
            return None;
        }
        if repeat && !listener.request.allow_held_key {
            debug!(%key, "held key ignored");
            return None;
        }

        let rt = match listener.request.time_basis {
            TimeBasis::Performance => ns_to_ms(self.clock.now().saturating_sub(listener.armed_at)),
        };
        if !listener.request.persist {
            self.listener = None;
        }
        Some(KeyResponse { rt, key })
    }

    pub fn key_up(&mut self, key: &Key) {
        self.held.remove(key);
    }
}

impl<C: Timer<Timestamp = u64>> ResponseCapture for KeyboardCapture<C> {
    fn register(&mut self, request: ResponseRequest) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        if let Some(previous) = self.listener.take() {
            warn!(previous = ?previous.handle, "replacing active keyboard listener");
        }
        self.listener = Some(Listener {
            handle,
            request,
            armed_at: self.clock.now(),
        });
        handle
    }

    fn cancel(&mut self, listener: ListenerHandle) {
        if self
            .listener
            .as_ref()
            .is_some_and(|active| active.handle == listener)
        {
            self.listener = None;
        }
    }
}
