#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod progress;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use progress::{Advance, AdvanceOutcome, ProgressError, ProgressState, StepStatus};
pub use scoring::{AreaDelta, AreaScore, ScoreSheet, SubcategoryScore};
pub use time::Clock;
