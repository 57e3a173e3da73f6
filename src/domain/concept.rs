use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CODED_DATATYPE: &str = "Coded";

/// Vocabulary entry as returned by the concept directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Concept {
    pub uuid: String,
    #[serde(default)]
    pub display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<ConceptDatatype>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<ConceptAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConceptDatatype {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
}

/// Answer the concept enumerates natively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConceptAnswer {
    pub uuid: String,
    #[serde(default)]
    pub display: String,
}

impl Concept {
    pub fn new(uuid: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            display: display.into(),
            ..Self::default()
        }
    }

    pub fn coded(
        uuid: impl Into<String>,
        display: impl Into<String>,
        answers: impl IntoIterator<Item = ConceptAnswer>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            display: display.into(),
            datatype: Some(ConceptDatatype {
                uuid: None,
                name: CODED_DATATYPE.to_string(),
            }),
            answers: answers.into_iter().collect(),
        }
    }

    pub fn is_coded(&self) -> bool {
        self.datatype
            .as_ref()
            .is_some_and(|datatype| datatype.name == CODED_DATATYPE)
    }

    pub fn has_native_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    pub fn is_native_answer(&self, id: &str) -> bool {
        self.answers.iter().any(|answer| answer.uuid == id)
    }
}

impl ConceptAnswer {
    pub fn new(uuid: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            display: display.into(),
        }
    }
}
