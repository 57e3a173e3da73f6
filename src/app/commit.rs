use std::fmt;

use crate::{
    domain::{FormSchema, Question},
    form::{FieldDraft, merge_additional},
};

/// Address of a question inside the host schema. Without an index the
/// question is appended to the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCoordinate {
    pub page: usize,
    pub section: usize,
    pub question: Option<usize>,
}

impl SchemaCoordinate {
    pub fn append(page: usize, section: usize) -> Self {
        Self {
            page,
            section,
            question: None,
        }
    }

    pub fn at(page: usize, section: usize, question: usize) -> Self {
        Self {
            page,
            section,
            question: Some(question),
        }
    }
}

impl fmt::Display for SchemaCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} / section {}", self.page, self.section)?;
        if let Some(index) = self.question {
            write!(f, " / question {index}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitError {
    pub coordinate: SchemaCoordinate,
    pub message: String,
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.coordinate)
    }
}

impl std::error::Error for CommitError {}

/// The question as it will be saved: additional answers not yet committed
/// are appended to the committed list.
pub fn finalize_question(draft: &FieldDraft) -> Question {
    let mut question = draft.question.clone();
    if !draft.additional_answers.is_empty() {
        let merged = merge_additional(question.answers(), &draft.additional_answers);
        question.set_answers(merged);
    }
    question
}

/// Copy `schema` and write `question` into the copy.
///
/// `Updated` replaces the question at the coordinate's index; `Created`
/// appends to the section. The input schema is left untouched.
pub fn write_question(
    schema: &FormSchema,
    coordinate: SchemaCoordinate,
    question: Question,
    kind: CommitKind,
) -> Result<FormSchema, CommitError> {
    let fail = |message: String| CommitError {
        coordinate,
        message,
    };

    let mut updated = schema.clone();
    let page_count = updated.pages.len();
    let section = updated
        .section_mut(coordinate.page, coordinate.section)
        .ok_or_else(|| {
            if coordinate.page >= page_count {
                fail(format!("page {} does not exist", coordinate.page))
            } else {
                fail(format!("section {} does not exist", coordinate.section))
            }
        })?;

    match kind {
        CommitKind::Created => section.questions.push(question),
        CommitKind::Updated => {
            let index = coordinate
                .question
                .ok_or_else(|| fail("an existing question needs an index to be replaced".into()))?;
            let len = section.questions.len();
            let slot = section.questions.get_mut(index).ok_or_else(|| {
                fail(format!(
                    "question {index} does not exist (section holds {len})"
                ))
            })?;
            *slot = question;
        }
    }
    Ok(updated)
}
