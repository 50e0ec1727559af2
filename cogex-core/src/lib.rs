pub mod host;
pub mod key;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use host::{
    DisplaySurface, ListenerHandle, MediaBuffer, MediaElement, MediaHook, MediaResolver,
    ResponseCapture, ResponseRequest, TimeBasis, TrialSink,
};
pub use key::{Key, KeyChoices, ALL_KEYS, NO_KEYS};
pub use phase::TrialPhase;
pub use stimulus::{media_type_of, strip_query, VideoStimulus, VIDEO_ELEMENT_ID};
pub use trial::{KeyResponse, ResponseState, TrialResult};
