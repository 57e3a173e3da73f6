use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    directory::ConceptDirectory,
    domain::{FormSchema, Question, QuestionType},
    form::{
        AnswerCheckReport, FieldCommand, IdentifierCheck, QuestionFieldState, collect_question_ids,
    },
};

use super::{
    commit::{CommitKind, SchemaCoordinate, finalize_question, write_question},
    error::{EditorError, SaveBlocker, SessionPhase},
    options::EditorOptions,
    status::{Notification, Notifier, TracingNotifier},
    validation::AnswerValidator,
};

/// Edit session for one question of a host schema.
///
/// Opened either on an existing question ([`QuestionEditor::edit`]) or on a
/// blank template ([`QuestionEditor::create`]); ends with [`save`] or
/// [`cancel`]. The host schema is only read; a successful save hands a new
/// schema to the caller.
///
/// [`save`]: QuestionEditor::save
/// [`cancel`]: QuestionEditor::cancel
pub struct QuestionEditor {
    schema: Arc<FormSchema>,
    coordinate: SchemaCoordinate,
    original: Option<Question>,
    field: QuestionFieldState,
    validator: Option<AnswerValidator>,
    notifier: Arc<dyn Notifier>,
    options: EditorOptions,
    phase: SessionPhase,
}

impl QuestionEditor {
    pub fn create(schema: Arc<FormSchema>, page: usize, section: usize) -> Self {
        Self::open(
            schema,
            SchemaCoordinate::append(page, section),
            None,
            Question::template(),
        )
    }

    pub fn edit(schema: Arc<FormSchema>, coordinate: SchemaCoordinate) -> Result<Self, EditorError> {
        let original = coordinate
            .question
            .and_then(|index| schema.question(coordinate.page, coordinate.section, index))
            .cloned()
            .ok_or(EditorError::QuestionNotFound(coordinate))?;
        Ok(Self::open(
            schema,
            coordinate,
            Some(original.clone()),
            original,
        ))
    }

    /// Edit `original` at `coordinate`, starting from `working` instead of
    /// the stored version.
    pub fn with_working_copy(
        schema: Arc<FormSchema>,
        coordinate: SchemaCoordinate,
        original: Option<Question>,
        working: Question,
    ) -> Self {
        Self::open(schema, coordinate, original, working)
    }

    fn open(
        schema: Arc<FormSchema>,
        coordinate: SchemaCoordinate,
        original: Option<Question>,
        working: Question,
    ) -> Self {
        Self {
            schema,
            coordinate,
            original,
            field: QuestionFieldState::new(working),
            validator: None,
            notifier: Arc::new(TracingNotifier),
            options: EditorOptions::default(),
            phase: SessionPhase::Created,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn ConceptDirectory>) -> Self {
        self.validator = Some(AnswerValidator::new(directory));
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn coordinate(&self) -> SchemaCoordinate {
        self.coordinate
    }

    pub fn original(&self) -> Option<&Question> {
        self.original.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn field(&self) -> &QuestionFieldState {
        &self.field
    }

    pub fn field_mut(&mut self) -> Result<&mut QuestionFieldState, EditorError> {
        self.ensure_open()?;
        self.phase = SessionPhase::Editing;
        Ok(&mut self.field)
    }

    pub fn dispatch(&mut self, command: FieldCommand) -> Result<bool, EditorError> {
        Ok(self.field_mut()?.dispatch(command))
    }

    /// Splice edits made in open group member containers into the working
    /// copy. Returns how many changed it.
    pub fn sync_members(&mut self) -> usize {
        let applied = self.field.receive_group_updates();
        if applied > 0 {
            debug!(applied, "group member edits spliced");
        }
        applied
    }

    /// Whether `candidate` occurs more than once across the schema and the
    /// working copy, discounting the question being replaced.
    pub fn is_duplicate_id(&mut self, candidate: &str) -> bool {
        self.sync_members();
        self.counts_twice(candidate)
    }

    fn counts_twice(&self, candidate: &str) -> bool {
        IdentifierCheck::new(&self.schema, self.field.question())
            .replacing(self.original.as_ref())
            .is_duplicate(candidate)
    }

    pub fn save_blockers(&mut self) -> Vec<SaveBlocker> {
        self.sync_members();
        let question = self.field.question();
        let mut blockers = Vec::new();
        if question.id.is_empty() {
            blockers.push(SaveBlocker::MissingId);
        }
        if !self.field.concept_valid() {
            blockers.push(SaveBlocker::InvalidConcept);
        }
        let needs_concept = match &question.kind {
            QuestionType::Obs => true,
            QuestionType::ObsGroup
            | QuestionType::Control
            | QuestionType::EncounterDatetime
            | QuestionType::EncounterLocation
            | QuestionType::EncounterProvider
            | QuestionType::EncounterRole
            | QuestionType::TestOrder
            | QuestionType::PatientIdentifier
            | QuestionType::ProgramState
            | QuestionType::Diagnosis
            | QuestionType::Unspecified
            | QuestionType::Other(_) => false,
        };
        if needs_concept && question.concept_id().is_none() {
            blockers.push(SaveBlocker::MissingConcept);
        }
        let mut candidates = vec![question.id.clone()];
        collect_question_ids(question.members(), &mut candidates);
        let mut duplicates: Vec<String> = Vec::new();
        for id in candidates {
            if !id.is_empty() && !duplicates.contains(&id) && self.counts_twice(&id) {
                duplicates.push(id);
            }
        }
        blockers.extend(duplicates.into_iter().map(SaveBlocker::DuplicateId));
        if question.rendering().is_none() {
            blockers.push(SaveBlocker::MissingRendering);
        }
        blockers
    }

    pub fn can_save(&mut self) -> bool {
        self.save_blockers().is_empty()
    }

    /// Verify the bound concept and, when configured, the answers.
    pub async fn prepare(&mut self) -> Result<(), EditorError> {
        if self.options.verify_concept {
            self.verify_concept().await?;
        }
        if self.options.validate_answers {
            self.validate_answers().await?;
        }
        Ok(())
    }

    /// Resolve the question's concept id against the directory.
    ///
    /// A resolved concept is bound so its native answers take part in
    /// reconciliation. Returns the resulting concept validity.
    pub async fn verify_concept(&mut self) -> Result<bool, EditorError> {
        self.ensure_open()?;
        let Some(id) = self.field.question().concept_id().map(str::to_string) else {
            self.field.set_concept_validity(true);
            return Ok(true);
        };
        let Some(validator) = self.validator.clone() else {
            debug!(concept = %id, "no concept directory configured; skipping verification");
            return Ok(self.field.concept_valid());
        };

        let resolved = validator.resolve_concept(&id).await;
        let valid = resolved.is_some();
        if let Some(concept) = resolved {
            self.field.bind_concept(Some(concept));
        }
        self.field.set_concept_validity(valid);
        Ok(valid)
    }

    /// Run an answer-validation pass to completion and apply it.
    pub async fn validate_answers(&mut self) -> Result<bool, EditorError> {
        self.ensure_open()?;
        let Some(check) = self.field.begin_answer_check() else {
            return Ok(self.field.answers_valid());
        };
        let Some(validator) = self.validator.clone() else {
            debug!("no concept directory configured; answers left unchecked");
            self.field.apply_answer_check(AnswerCheckReport {
                generation: check.generation,
                valid: true,
            });
            return Ok(true);
        };
        let report = validator.check(&check).await;
        self.field.apply_answer_check(report);
        Ok(self.field.answers_valid())
    }

    /// Start an answer-validation pass in the background.
    ///
    /// Any pass already in flight is superseded; feed the finished report to
    /// [`QuestionEditor::finish_answer_validation`].
    pub fn spawn_answer_validation(
        &mut self,
    ) -> Result<Option<JoinHandle<AnswerCheckReport>>, EditorError> {
        self.ensure_open()?;
        let Some(validator) = self.validator.as_ref() else {
            return Ok(None);
        };
        Ok(self
            .field
            .begin_answer_check()
            .map(|check| validator.spawn(check)))
    }

    pub fn finish_answer_validation(&mut self, report: AnswerCheckReport) -> bool {
        self.field.apply_answer_check(report)
    }

    /// Write the question into a copy of the host schema.
    ///
    /// Pending group member edits are spliced in first. `on_schema_change`
    /// receives the new schema on success. A write failure is reported
    /// through the notifier and leaves the session open.
    pub fn save(
        &mut self,
        on_schema_change: impl FnOnce(FormSchema),
    ) -> Result<CommitKind, EditorError> {
        self.ensure_open()?;
        let blockers = self.save_blockers();
        if !blockers.is_empty() {
            return Err(EditorError::SaveBlocked(blockers));
        }

        let question = finalize_question(self.field.draft());
        self.field.update(|mut draft| {
            draft.question = question.clone();
            draft
        });

        let kind = if self.original.is_some() {
            CommitKind::Updated
        } else {
            CommitKind::Created
        };
        let messages = &self.options.messages;
        match write_question(&self.schema, self.coordinate, question, kind) {
            Ok(updated) => {
                on_schema_change(updated);
                let subtitle = match kind {
                    CommitKind::Created => &messages.created,
                    CommitKind::Updated => &messages.updated,
                };
                self.notifier.notify(Notification::success(
                    messages.success_title.to_string(),
                    subtitle.to_string(),
                ));
                info!(
                    id = %self.field.question().id,
                    coordinate = %self.coordinate,
                    ?kind,
                    "question saved"
                );
                self.phase = SessionPhase::Committed;
                Ok(kind)
            }
            Err(err) => {
                warn!(coordinate = %self.coordinate, error = %err, "question save failed");
                self.notifier.notify(Notification::error(
                    messages.failure_title.to_string(),
                    err.message.clone(),
                ));
                Err(EditorError::Commit(err))
            }
        }
    }

    /// Discard the working copy; the host schema is never touched.
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        debug!(coordinate = %self.coordinate, "question edit discarded");
        self.phase = SessionPhase::Discarded;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), EditorError> {
        if self.phase.is_closed() {
            return Err(EditorError::SessionClosed(self.phase));
        }
        Ok(())
    }
}
