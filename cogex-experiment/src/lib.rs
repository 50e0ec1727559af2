pub mod config;
pub mod state;
pub mod trial;
pub use config::{ConfigError, ParameterInfo, ParameterKind, TrialConfig, PRELOAD};
pub use state::{TrialController, TrialError};
pub use trial::{stop_delay, TrialEvent};
