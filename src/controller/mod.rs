pub mod state;
pub mod submission;

pub use state::{Phase, UiState};
pub use submission::SubmissionController;
