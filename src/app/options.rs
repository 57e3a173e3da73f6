use std::borrow::Cow;

/// Texts used for the notification emitted by a save attempt.
#[derive(Debug, Clone)]
pub struct SaveMessages {
    pub success_title: Cow<'static, str>,
    pub created: Cow<'static, str>,
    pub updated: Cow<'static, str>,
    pub failure_title: Cow<'static, str>,
}

impl Default for SaveMessages {
    fn default() -> Self {
        Self {
            success_title: Cow::Borrowed("Success!"),
            created: Cow::Borrowed("New question created"),
            updated: Cow::Borrowed("Question updated"),
            failure_title: Cow::Borrowed("Error saving question"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Check non-native answers against the concept directory.
    pub validate_answers: bool,
    /// Resolve the bound concept during `prepare`.
    pub verify_concept: bool,
    pub messages: SaveMessages,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            validate_answers: true,
            verify_concept: true,
            messages: SaveMessages::default(),
        }
    }
}

impl EditorOptions {
    pub fn with_answer_validation(mut self, enabled: bool) -> Self {
        self.validate_answers = enabled;
        self
    }

    pub fn with_concept_verification(mut self, enabled: bool) -> Self {
        self.verify_concept = enabled;
        self
    }

    pub fn with_messages(mut self, messages: SaveMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_success_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.messages.success_title = title.into();
        self
    }

    pub fn with_failure_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.messages.failure_title = title.into();
        self
    }
}
