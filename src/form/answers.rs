//! Answer list algorithms: merging concept-native answers with the question's
//! committed answers, and the list edits the editor exposes.

use indexmap::IndexMap;

use crate::domain::{Answer, Concept};

/// An entry of a multi-select selection, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAnswer {
    pub id: String,
    pub label: String,
}

impl SelectedAnswer {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl From<&Answer> for SelectedAnswer {
    fn from(answer: &Answer) -> Self {
        SelectedAnswer::new(answer.concept.clone(), answer.label.clone())
    }
}

/// Build the answer list shown for a question.
///
/// Native concept answers come first, in concept order, carrying the
/// committed label when one overrides the canonical display. Committed
/// answers the concept does not know follow in their own order. When the
/// concept offers nothing natively the committed list is returned as is.
pub fn reconcile_answers(concept: Option<&Concept>, committed: &[Answer]) -> Vec<Answer> {
    let native = concept.map(|concept| concept.answers.as_slice()).unwrap_or(&[]);
    if native.is_empty() && !committed.is_empty() {
        return committed.to_vec();
    }

    let native_entries = native.iter().map(|answer| {
        let label = committed
            .iter()
            .find(|stored| stored.concept == answer.uuid)
            .map(|stored| stored.label.clone())
            .unwrap_or_else(|| answer.display.clone());
        Answer::new(answer.uuid.clone(), label)
    });
    let foreign_entries = committed
        .iter()
        .filter(|stored| !native.iter().any(|answer| answer.uuid == stored.concept))
        .cloned();

    dedup_answers(native_entries.chain(foreign_entries))
}

/// Keep the first answer seen for each concept id.
pub fn dedup_answers(answers: impl IntoIterator<Item = Answer>) -> Vec<Answer> {
    let mut seen: IndexMap<String, Answer> = IndexMap::new();
    for answer in answers {
        seen.entry(answer.concept.clone()).or_insert(answer);
    }
    seen.into_values().collect()
}

/// Move `source` to the position currently held by `target`.
///
/// Returns `None` when either id is missing or both resolve to the same slot.
pub fn move_answer(answers: &[Answer], source: &str, target: &str) -> Option<Vec<Answer>> {
    let from = answers.iter().position(|answer| answer.concept == source)?;
    let to = answers.iter().position(|answer| answer.concept == target)?;
    if from == to {
        return None;
    }
    let mut reordered = answers.to_vec();
    array_move(&mut reordered, from, to);
    Some(reordered)
}

/// Stable array move: every other element keeps its relative order.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

pub fn answers_from_selection(selection: &[SelectedAnswer]) -> Vec<Answer> {
    selection
        .iter()
        .map(|item| Answer::new(item.id.clone(), item.label.clone()))
        .collect()
}

/// Committed answers followed by every additional answer they lack.
pub fn merge_additional(committed: &[Answer], additional: &[Answer]) -> Vec<Answer> {
    let mut merged = committed.to_vec();
    for answer in additional {
        if !merged.iter().any(|existing| existing.concept == answer.concept) {
            merged.push(answer.clone());
        }
    }
    merged
}
