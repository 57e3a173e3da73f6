mod actions;
mod answers;
mod reducers;
mod state;
mod uniqueness;

pub use actions::FieldCommand;
pub use answers::{
    SelectedAnswer, answers_from_selection, array_move, dedup_answers, merge_additional,
    move_answer, reconcile_answers,
};
pub use reducers::apply_command;
pub use state::{AnswerCheck, AnswerCheckReport, FieldDraft, GroupUpdate, QuestionFieldState};
pub use uniqueness::{IdentifierCheck, collect_question_ids, schema_question_ids};
