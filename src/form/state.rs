use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::debug;

use crate::domain::{Answer, Concept, Question};

use super::answers::reconcile_answers;

/// Everything an edit session may change: the working copy of the question
/// and the answers added through search that are not yet saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDraft {
    pub question: Question,
    pub additional_answers: Vec<Answer>,
}

/// Sent by a grouped member's container whenever its question changes.
///
/// `member` identifies the opened container, not a position: the parent maps
/// it to the member's current index when the update is spliced.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupUpdate {
    pub member: u64,
    pub question: Question,
}

/// Input of one answer-validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCheck {
    pub generation: u64,
    pub native_ids: Vec<String>,
    pub answers: Vec<Answer>,
}

/// Outcome of one answer-validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerCheckReport {
    pub generation: u64,
    pub valid: bool,
}

#[derive(Debug)]
struct GroupLink {
    member: u64,
    index: usize,
    sender: UnboundedSender<GroupUpdate>,
}

#[derive(Debug)]
struct GroupInbox {
    sender: UnboundedSender<GroupUpdate>,
    receiver: UnboundedReceiver<GroupUpdate>,
    /// Current index of each opened member, keyed by its `member` token;
    /// `None` once that member was removed.
    members: Vec<Option<usize>>,
}

impl GroupInbox {
    fn register(&mut self, index: usize) -> u64 {
        self.members.push(Some(index));
        (self.members.len() - 1) as u64
    }

    fn index_of(&self, member: u64) -> Option<usize> {
        usize::try_from(member)
            .ok()
            .and_then(|slot| self.members.get(slot).copied().flatten())
    }

    fn forget(&mut self, removed: usize) {
        for slot in self.members.iter_mut() {
            *slot = match *slot {
                Some(index) if index == removed => None,
                Some(index) if index > removed => Some(index - 1),
                other => other,
            };
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AnswerValidity {
    generation: u64,
    checked_revision: Option<u64>,
    valid: bool,
    pending: bool,
}

/// Working copy of one question for the lifetime of an edit session.
///
/// `update` is the single write path. A container opened for a group member
/// forwards each change to its parent as a [`GroupUpdate`]; the parent
/// applies them in [`QuestionFieldState::receive_group_updates`].
#[derive(Debug)]
pub struct QuestionFieldState {
    draft: FieldDraft,
    concept: Option<Concept>,
    concept_valid: bool,
    revision: u64,
    answers: AnswerValidity,
    parent: Option<GroupLink>,
    inbox: Option<GroupInbox>,
}

impl QuestionFieldState {
    pub fn new(question: Question) -> Self {
        Self {
            draft: FieldDraft {
                question,
                additional_answers: Vec::new(),
            },
            concept: None,
            concept_valid: true,
            revision: 0,
            answers: AnswerValidity {
                generation: 0,
                checked_revision: None,
                valid: true,
                pending: false,
            },
            parent: None,
            inbox: None,
        }
    }

    fn nested(
        question: Question,
        member: u64,
        index: usize,
        sender: UnboundedSender<GroupUpdate>,
    ) -> Self {
        let mut state = Self::new(question);
        state.parent = Some(GroupLink {
            member,
            index,
            sender,
        });
        state
    }

    pub fn question(&self) -> &Question {
        &self.draft.question
    }

    pub fn draft(&self) -> &FieldDraft {
        &self.draft
    }

    pub fn additional_answers(&self) -> &[Answer] {
        &self.draft.additional_answers
    }

    pub fn concept(&self) -> Option<&Concept> {
        self.concept.as_ref()
    }

    pub fn concept_valid(&self) -> bool {
        self.concept_valid
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }

    /// Index this container was opened at in its parent's `questions`.
    pub fn group_index(&self) -> Option<usize> {
        self.parent.as_ref().map(|link| link.index)
    }

    /// Answer list as displayed: native concept answers merged with the
    /// committed ones.
    pub fn display_answers(&self) -> Vec<Answer> {
        reconcile_answers(self.concept.as_ref(), self.draft.question.answers())
    }

    /// Apply `transform` to the current draft.
    ///
    /// Returns `false` and emits nothing when the transform produces a draft
    /// equal to the current one.
    pub fn update(&mut self, transform: impl FnOnce(FieldDraft) -> FieldDraft) -> bool {
        let next = transform(self.draft.clone());
        if next == self.draft {
            return false;
        }
        self.draft = next;
        self.revision += 1;
        if let Some(link) = &self.parent {
            let update = GroupUpdate {
                member: link.member,
                question: self.draft.question.clone(),
            };
            if link.sender.send(update).is_err() {
                debug!(member = link.member, "group parent dropped; update discarded");
            }
        }
        true
    }

    /// Bind the concept resolved for this question, or clear it.
    ///
    /// Clearing drops the additional answers; committed answers stay.
    pub fn bind_concept(&mut self, concept: Option<Concept>) -> bool {
        let concept_id = concept.as_ref().map(|concept| concept.uuid.clone());
        let unbinding = concept.is_none();
        let concept_changed = self.concept != concept;
        self.concept = concept;
        let draft_changed = self.update(|mut draft| {
            if draft.question.concept_id() != concept_id.as_deref() {
                draft.question.options_mut().concept = concept_id;
            }
            if unbinding {
                draft.additional_answers.clear();
            }
            draft
        });
        if concept_changed && !draft_changed {
            self.revision += 1;
        }
        concept_changed || draft_changed
    }

    pub fn set_concept_validity(&mut self, valid: bool) {
        self.concept_valid = valid;
    }

    /// Whether the answers or the concept changed since the last pass began.
    pub fn needs_answer_check(&self) -> bool {
        self.answers.checked_revision != Some(self.revision)
    }

    pub fn answers_valid(&self) -> bool {
        self.answers.valid
    }

    pub fn answer_check_pending(&self) -> bool {
        self.answers.pending
    }

    /// Start a new answer-validation pass, superseding any pass in flight.
    ///
    /// Returns `None` when there is nothing external to check; the outcome
    /// is then settled as valid immediately.
    pub fn begin_answer_check(&mut self) -> Option<AnswerCheck> {
        self.answers.generation += 1;
        self.answers.checked_revision = Some(self.revision);

        let native_ids: Vec<String> = self
            .concept
            .as_ref()
            .map(|concept| concept.answers.iter().map(|a| a.uuid.clone()).collect())
            .unwrap_or_default();
        let answers = self.display_answers();
        if native_ids.is_empty() || answers.is_empty() {
            self.answers.valid = true;
            self.answers.pending = false;
            return None;
        }

        self.answers.pending = true;
        Some(AnswerCheck {
            generation: self.answers.generation,
            native_ids,
            answers,
        })
    }

    /// Record a finished pass. Reports from superseded passes are ignored.
    pub fn apply_answer_check(&mut self, report: AnswerCheckReport) -> bool {
        if report.generation != self.answers.generation {
            debug!(
                stale = report.generation,
                current = self.answers.generation,
                "ignoring superseded answer validation"
            );
            return false;
        }
        self.answers.valid = report.valid;
        self.answers.pending = false;
        true
    }

    /// Open a container for `questions[index]` whose changes flow back here.
    pub fn open_group_member(&mut self, index: usize) -> Option<QuestionFieldState> {
        let member = self.draft.question.members().get(index)?.clone();
        let inbox = self.inbox.get_or_insert_with(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            GroupInbox {
                sender,
                receiver,
                members: Vec::new(),
            }
        });
        let token = inbox.register(index);
        Some(QuestionFieldState::nested(
            member,
            token,
            index,
            inbox.sender.clone(),
        ))
    }

    /// Delete `questions[index]`.
    ///
    /// Containers opened for later members keep writing to the member they
    /// were opened on; updates from the removed member's container are dropped.
    pub fn remove_group_member(&mut self, index: usize) -> bool {
        let removed = self.update(|mut draft| {
            if let Some(members) = draft.question.questions.as_mut()
                && index < members.len()
            {
                members.remove(index);
            }
            draft
        });
        if removed && let Some(inbox) = self.inbox.as_mut() {
            inbox.forget(index);
        }
        removed
    }

    /// Splice pending member updates into `questions`; returns how many
    /// changed the draft.
    pub fn receive_group_updates(&mut self) -> usize {
        let Some(inbox) = self.inbox.as_mut() else {
            return 0;
        };
        let mut pending = Vec::new();
        loop {
            match inbox.receiver.try_recv() {
                Ok(update) => pending.push(update),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        let mut applied = 0;
        for GroupUpdate { member, question } in pending {
            let Some(index) = self.inbox.as_ref().and_then(|inbox| inbox.index_of(member))
            else {
                debug!(member, "group member was removed; update dropped");
                continue;
            };
            let changed = self.update(|mut draft| {
                if let Some(slot) = draft
                    .question
                    .questions
                    .as_mut()
                    .and_then(|members| members.get_mut(index))
                {
                    *slot = question;
                } else {
                    debug!(index, "group member no longer present; update dropped");
                }
                draft
            });
            if changed {
                applied += 1;
            }
        }
        applied
    }
}
