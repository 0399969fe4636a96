mod session;
mod workflow;

// Public API of the assessment wizard.
pub use crate::error::AssessmentError;
pub use session::AssessmentSession;
pub use workflow::{AssessmentLoopService, StepAdvance};
