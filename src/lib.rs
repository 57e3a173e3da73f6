#![deny(rust_2018_idioms)]

pub mod app;
pub mod directory;
pub mod domain;
pub mod form;
pub mod io;

pub use app::{
    AnswerValidator, CommitError, CommitKind, EditorError, EditorOptions, Notification,
    NotificationKind, NotificationLog, Notifier, QuestionEditor, SaveBlocker, SaveMessages,
    SchemaCoordinate, SessionPhase, TracingNotifier,
};
pub use directory::{ConceptDirectory, LookupError, StaticDirectory};
#[cfg(feature = "rest")]
pub use directory::{RestDirectory, RestDirectoryConfig};
pub use domain::{
    Answer, Concept, ConceptAnswer, FormSchema, Question, QuestionType, Rendering,
    SchemaParseError,
};
pub use form::{FieldCommand, FieldDraft, QuestionFieldState, SelectedAnswer};
pub use io::{DocumentFormat, OutputDestination, OutputOptions};

pub mod prelude {
    pub use super::{
        Answer, Concept, ConceptDirectory, EditorOptions, FieldCommand, FormSchema, Question,
        QuestionEditor, QuestionType, Rendering, SchemaCoordinate, StaticDirectory,
    };
}
