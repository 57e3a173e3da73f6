use std::{collections::HashSet, sync::Arc};

use indexmap::IndexSet;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    directory::{ConceptDirectory, resolves},
    domain::Concept,
    form::{AnswerCheck, AnswerCheckReport},
};

/// Run one answer-validation pass.
///
/// Distinct non-native ids are looked up one at a time in display order;
/// the pass stops at the first id that does not resolve.
pub async fn run_answer_check<D>(check: &AnswerCheck, directory: &D) -> AnswerCheckReport
where
    D: ConceptDirectory + ?Sized,
{
    let native: HashSet<&str> = check.native_ids.iter().map(String::as_str).collect();
    let pending: IndexSet<&str> = check
        .answers
        .iter()
        .map(|answer| answer.concept.as_str())
        .filter(|id| !native.contains(id))
        .collect();

    let mut valid = true;
    for id in pending {
        let resolved = resolves(directory, id).await;
        debug!(generation = check.generation, concept = id, resolved, "answer lookup");
        if !resolved {
            valid = false;
            break;
        }
    }

    AnswerCheckReport {
        generation: check.generation,
        valid,
    }
}

/// Shared handle to the concept directory used by an edit session.
#[derive(Clone)]
pub struct AnswerValidator {
    directory: Arc<dyn ConceptDirectory>,
}

impl std::fmt::Debug for AnswerValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerValidator").finish_non_exhaustive()
    }
}

impl AnswerValidator {
    pub fn new(directory: Arc<dyn ConceptDirectory>) -> Self {
        Self { directory }
    }

    pub async fn check(&self, check: &AnswerCheck) -> AnswerCheckReport {
        run_answer_check(check, self.directory.as_ref()).await
    }

    /// Run the pass on the tokio runtime; apply the report once it resolves.
    pub fn spawn(&self, check: AnswerCheck) -> JoinHandle<AnswerCheckReport> {
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move { run_answer_check(&check, directory.as_ref()).await })
    }

    /// Resolve the concept a question is bound to.
    pub async fn resolve_concept(&self, id: &str) -> Option<Concept> {
        match self.directory.lookup_concept(id).await {
            Ok(concept) if concept.uuid == id => Some(concept),
            Ok(concept) => {
                debug!(requested = id, returned = %concept.uuid, "concept id mismatch");
                None
            }
            Err(err) => {
                tracing::warn!(concept = id, error = %err, "concept lookup failed");
                None
            }
        }
    }
}
