pub mod recording;
pub mod text;

pub use recording::{CallLog, PresenterCall, RecordingPresenter};
pub use text::{TextPresenter, Transcript};
