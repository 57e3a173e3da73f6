use async_trait::async_trait;
use indexmap::IndexMap;

use crate::domain::Concept;

use super::{ConceptDirectory, LookupError};

/// Directory backed by a fixed concept list, e.g. one loaded from a file.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    concepts: IndexMap<String, Concept>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_concepts(concepts: impl IntoIterator<Item = Concept>) -> Self {
        let mut directory = Self::new();
        for concept in concepts {
            directory.insert(concept);
        }
        directory
    }

    /// Later entries with the same uuid replace earlier ones.
    pub fn insert(&mut self, concept: Concept) {
        self.concepts.insert(concept.uuid.clone(), concept);
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

#[async_trait]
impl ConceptDirectory for StaticDirectory {
    async fn lookup_concept(&self, id: &str) -> Result<Concept, LookupError> {
        self.concepts
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }
}
