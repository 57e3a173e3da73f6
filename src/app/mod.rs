mod commit;
mod editor;
mod error;
mod options;
mod status;
mod validation;

pub use commit::{CommitError, CommitKind, SchemaCoordinate, finalize_question, write_question};
pub use editor::QuestionEditor;
pub use error::{EditorError, SaveBlocker, SessionPhase};
pub use options::{EditorOptions, SaveMessages};
pub use status::{Notification, NotificationKind, NotificationLog, Notifier, TracingNotifier};
pub use validation::{AnswerValidator, run_answer_check};
