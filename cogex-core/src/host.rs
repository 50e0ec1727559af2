//! Services a trial borrows from the host that runs it.
//!
//! Timer scheduling lives in `cogex-timing`; everything else a trial needs
//! from its host is declared here.

use crate::key::KeyChoices;
use crate::trial::TrialResult;
use std::fmt;
use std::sync::Arc;

/// Media element events a trial can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaHook {
    Ended,
    Play,
}

/// Preloaded, in-memory media ready to be assigned to an element.
#[derive(Clone, PartialEq)]
pub struct MediaBuffer {
    pub id: u64,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl MediaBuffer {
    /// Handle URI the element plays from instead of fetching a file.
    pub fn uri(&self) -> String {
        format!("cogex-buffer:{}", self.id)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for MediaBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBuffer")
            .field("id", &self.id)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Looks up preloaded media for a source reference.
pub trait MediaResolver {
    fn preloaded_buffer(&self, reference: &str) -> Option<MediaBuffer>;
}

/// Handle to the mounted `<video>` element.
pub trait MediaElement {
    fn set_src(&mut self, buffer: &MediaBuffer);
    fn set_current_time(&mut self, seconds: f64);
    fn set_playback_rate(&mut self, rate: f64);
    /// Route this event to the trial from now on.
    fn wire(&mut self, hook: MediaHook);
}

/// Surface the trial mounts its markup into.
pub trait DisplaySurface {
    type Element: MediaElement;

    fn mount(&mut self, markup: String);
    fn clear(&mut self);
    fn element_mut(&mut self, id: &str) -> Option<&mut Self::Element>;
}

/// Clock reaction times are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    /// Monotonic high-resolution clock.
    #[default]
    Performance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRequest {
    pub accepted_keys: KeyChoices,
    pub time_basis: TimeBasis,
    /// Keep listening after the first response.
    pub persist: bool,
    /// Accept a key that was already down when it was pressed again (auto-repeat).
    pub allow_held_key: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// Keyboard listener registry.
pub trait ResponseCapture {
    fn register(&mut self, request: ResponseRequest) -> ListenerHandle;
    fn cancel(&mut self, listener: ListenerHandle);
}

/// Receives the finished trial's record.
pub trait TrialSink {
    fn accept(&mut self, result: TrialResult);
}

impl TrialSink for Vec<TrialResult> {
    fn accept(&mut self, result: TrialResult) {
        self.push(result);
    }
}

impl<S: TrialSink + ?Sized> TrialSink for &mut S {
    fn accept(&mut self, result: TrialResult) {
        (**self).accept(result);
    }
}
