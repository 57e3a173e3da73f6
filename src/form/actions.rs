use crate::domain::{Answer, Concept, QuestionType, Rendering};

use super::answers::SelectedAnswer;

#[derive(Debug, Clone)]
pub enum FieldCommand {
    SetId(String),
    SetLabel(Option<String>),
    SetType(QuestionType),
    SetRendering(Option<Rendering>),
    BindConcept(Option<Concept>),
    /// Replace the committed answers with a multi-select selection.
    SelectAnswers(Vec<SelectedAnswer>),
    MoveAnswer {
        source: String,
        target: String,
    },
    AddAdditionalAnswer(Answer),
    RemoveAdditionalAnswer(String),
    AddGroupMember,
    RemoveGroupMember(usize),
}
