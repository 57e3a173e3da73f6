use crate::domain::Question;

use super::{
    actions::FieldCommand,
    answers::{answers_from_selection, move_answer},
    state::QuestionFieldState,
};

/// Apply `command` to the working copy; returns whether anything changed.
pub fn apply_command(state: &mut QuestionFieldState, command: FieldCommand) -> bool {
    match command {
        FieldCommand::SetId(id) => state.update(|mut draft| {
            draft.question.id = id;
            draft
        }),
        FieldCommand::SetLabel(label) => state.update(|mut draft| {
            draft.question.label = label;
            draft
        }),
        FieldCommand::SetType(kind) => state.update(|mut draft| {
            draft.question.kind = kind;
            draft
        }),
        FieldCommand::SetRendering(rendering) => state.update(|mut draft| {
            if draft.question.rendering() != rendering.as_ref() {
                draft.question.options_mut().rendering = rendering;
            }
            draft
        }),
        FieldCommand::BindConcept(concept) => state.bind_concept(concept),
        FieldCommand::SelectAnswers(selection) => state.update(|mut draft| {
            let mapped = answers_from_selection(&selection);
            if draft.question.answers() == mapped.as_slice() {
                return draft;
            }
            draft.question.set_answers(mapped);
            draft
                .additional_answers
                .retain(|added| selection.iter().any(|item| item.id == added.concept));
            draft
        }),
        FieldCommand::MoveAnswer { source, target } => state.update(|mut draft| {
            if let Some(reordered) = move_answer(draft.question.answers(), &source, &target) {
                draft.question.set_answers(reordered);
            }
            draft
        }),
        FieldCommand::AddAdditionalAnswer(answer) => state.update(|mut draft| {
            let known = draft
                .question
                .answers()
                .iter()
                .chain(draft.additional_answers.iter())
                .any(|existing| existing.concept == answer.concept);
            if known {
                return draft;
            }
            let mut committed = draft.question.answers().to_vec();
            committed.push(answer.clone());
            draft.question.set_answers(committed);
            draft.additional_answers.push(answer);
            draft
        }),
        FieldCommand::RemoveAdditionalAnswer(id) => state.update(|mut draft| {
            draft.additional_answers.retain(|added| added.concept != id);
            if draft.question.answers().iter().any(|answer| answer.concept == id) {
                let remaining = draft
                    .question
                    .answers()
                    .iter()
                    .filter(|answer| answer.concept != id)
                    .cloned()
                    .collect();
                draft.question.set_answers(remaining);
            }
            draft
        }),
        FieldCommand::AddGroupMember => state.update(|mut draft| {
            draft
                .question
                .questions
                .get_or_insert_with(Vec::new)
                .push(Question::empty_member());
            draft
        }),
        FieldCommand::RemoveGroupMember(index) => state.remove_group_member(index),
    }
}

impl QuestionFieldState {
    pub fn dispatch(&mut self, command: FieldCommand) -> bool {
        apply_command(self, command)
    }
}
