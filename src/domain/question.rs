use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::concept::Concept;

/// One field definition of a form. Groups carry their members in `questions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "QuestionType::is_unspecified"
    )]
    #[schemars(with = "String")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_options: Option<QuestionOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub rendering: Option<Rendering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<Answer>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A selectable choice: the referenced concept and the label shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    pub concept: String,
    #[serde(default)]
    pub label: String,
}

impl Answer {
    pub fn new(concept: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            label: label.into(),
        }
    }
}

impl From<&Concept> for Answer {
    fn from(concept: &Concept) -> Self {
        Answer::new(concept.uuid.clone(), concept.display.clone())
    }
}

impl Question {
    /// Starting point for a question created from scratch.
    pub fn template() -> Self {
        Self {
            kind: QuestionType::Control,
            ..Self::default()
        }
    }

    /// Placeholder appended when a member is added to a group.
    pub fn empty_member() -> Self {
        Self::default()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, QuestionType::ObsGroup)
    }

    pub fn answers(&self) -> &[Answer] {
        self.question_options
            .as_ref()
            .and_then(|options| options.answers.as_deref())
            .unwrap_or(&[])
    }

    pub fn set_answers(&mut self, answers: Vec<Answer>) {
        self.options_mut().answers = Some(answers);
    }

    /// Bound concept id; an empty string counts as unbound.
    pub fn concept_id(&self) -> Option<&str> {
        self.question_options
            .as_ref()
            .and_then(|options| options.concept.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn rendering(&self) -> Option<&Rendering> {
        self.question_options
            .as_ref()
            .and_then(|options| options.rendering.as_ref())
    }

    pub fn members(&self) -> &[Question] {
        self.questions.as_deref().unwrap_or(&[])
    }

    pub fn options_mut(&mut self) -> &mut QuestionOptions {
        self.question_options.get_or_insert_with(QuestionOptions::default)
    }
}

/// Question type tag as understood by the form engine.
///
/// Types this crate does not interpret round-trip through `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Obs,
    ObsGroup,
    Control,
    EncounterDatetime,
    EncounterLocation,
    EncounterProvider,
    EncounterRole,
    TestOrder,
    PatientIdentifier,
    ProgramState,
    Diagnosis,
    #[default]
    Unspecified,
    Other(String),
}

const QUESTION_TYPES: &[(QuestionType, &str)] = &[
    (QuestionType::Obs, "obs"),
    (QuestionType::ObsGroup, "obsGroup"),
    (QuestionType::Control, "control"),
    (QuestionType::EncounterDatetime, "encounterDatetime"),
    (QuestionType::EncounterLocation, "encounterLocation"),
    (QuestionType::EncounterProvider, "encounterProvider"),
    (QuestionType::EncounterRole, "encounterRole"),
    (QuestionType::TestOrder, "testOrder"),
    (QuestionType::PatientIdentifier, "patientIdentifier"),
    (QuestionType::ProgramState, "programState"),
    (QuestionType::Diagnosis, "diagnosis"),
    (QuestionType::Unspecified, ""),
];

impl QuestionType {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, QuestionType::Unspecified)
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::Other(raw) => raw,
            known => QUESTION_TYPES
                .iter()
                .find(|(kind, _)| kind == known)
                .map(|(_, tag)| *tag)
                .unwrap_or_default(),
        }
    }
}

impl From<String> for QuestionType {
    fn from(raw: String) -> Self {
        QUESTION_TYPES
            .iter()
            .find(|(_, tag)| *tag == raw)
            .map(|(kind, _)| kind.clone())
            .unwrap_or(QuestionType::Other(raw))
    }
}

impl From<&str> for QuestionType {
    fn from(raw: &str) -> Self {
        QuestionType::from(raw.to_string())
    }
}

impl From<QuestionType> for String {
    fn from(kind: QuestionType) -> Self {
        match kind {
            QuestionType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Widget the form engine uses to render a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rendering {
    Text,
    Textarea,
    Number,
    Date,
    Datetime,
    Select,
    Radio,
    Checkbox,
    Toggle,
    UiSelectExtended,
    ContentSwitcher,
    Markdown,
    FixedValue,
    File,
    Group,
    Repeating,
    Other(String),
}

const RENDERINGS: &[(Rendering, &str)] = &[
    (Rendering::Text, "text"),
    (Rendering::Textarea, "textarea"),
    (Rendering::Number, "number"),
    (Rendering::Date, "date"),
    (Rendering::Datetime, "datetime"),
    (Rendering::Select, "select"),
    (Rendering::Radio, "radio"),
    (Rendering::Checkbox, "checkbox"),
    (Rendering::Toggle, "toggle"),
    (Rendering::UiSelectExtended, "ui-select-extended"),
    (Rendering::ContentSwitcher, "content-switcher"),
    (Rendering::Markdown, "markdown"),
    (Rendering::FixedValue, "fixed-value"),
    (Rendering::File, "file"),
    (Rendering::Group, "group"),
    (Rendering::Repeating, "repeating"),
];

impl Rendering {
    pub fn as_str(&self) -> &str {
        match self {
            Rendering::Other(raw) => raw,
            known => RENDERINGS
                .iter()
                .find(|(rendering, _)| rendering == known)
                .map(|(_, tag)| *tag)
                .unwrap_or_default(),
        }
    }
}

impl From<String> for Rendering {
    fn from(raw: String) -> Self {
        RENDERINGS
            .iter()
            .find(|(_, tag)| *tag == raw)
            .map(|(rendering, _)| rendering.clone())
            .unwrap_or(Rendering::Other(raw))
    }
}

impl From<&str> for Rendering {
    fn from(raw: &str) -> Self {
        Rendering::from(raw.to_string())
    }
}

impl From<Rendering> for String {
    fn from(rendering: Rendering) -> Self {
        match rendering {
            Rendering::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
