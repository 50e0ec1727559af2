pub mod queue;
pub mod timer;

pub use queue::{TimerHandle, TimerQueue, TimerService};
pub use timer::{ns_to_ms, HighPrecisionTimer, Timer, VirtualClock};
