use crate::domain::{FormSchema, Question};

/// Every id reachable from `questions`, depth first, groups before members.
pub fn collect_question_ids(questions: &[Question], acc: &mut Vec<String>) {
    for question in questions {
        acc.push(question.id.clone());
        collect_question_ids(question.members(), acc);
    }
}

/// Every question id in the host schema, nested members included.
pub fn schema_question_ids(schema: &FormSchema) -> Vec<String> {
    let mut ids = Vec::new();
    for page in &schema.pages {
        for section in &page.sections {
            collect_question_ids(&section.questions, &mut ids);
        }
    }
    ids
}

/// Duplicate-id detection for the question being edited.
///
/// The host schema still contains the pre-edit version of the question when
/// an existing question is edited; its ids are discounted once each so the
/// question does not collide with itself.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierCheck<'a> {
    schema: &'a FormSchema,
    editing: &'a Question,
    original: Option<&'a Question>,
}

impl<'a> IdentifierCheck<'a> {
    pub fn new(schema: &'a FormSchema, editing: &'a Question) -> Self {
        Self {
            schema,
            editing,
            original: None,
        }
    }

    pub fn replacing(mut self, original: Option<&'a Question>) -> Self {
        self.original = original;
        self
    }

    pub fn occurrences(&self, candidate: &str) -> usize {
        let mut schema_ids = schema_question_ids(self.schema);
        for stale in self.original_ids() {
            if let Some(position) = schema_ids.iter().position(|id| *id == stale) {
                schema_ids.remove(position);
            }
        }

        let mut editing_ids = Vec::new();
        collect_question_ids(self.editing.members(), &mut editing_ids);
        editing_ids.push(self.editing.id.clone());

        schema_ids
            .iter()
            .chain(editing_ids.iter())
            .filter(|id| id.as_str() == candidate)
            .count()
    }

    pub fn is_duplicate(&self, candidate: &str) -> bool {
        self.occurrences(candidate) > 1
    }

    fn original_ids(&self) -> Vec<String> {
        let Some(original) = self.original.filter(|question| !question.id.is_empty()) else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        collect_question_ids(original.members(), &mut ids);
        ids.push(original.id.clone());
        ids
    }
}
