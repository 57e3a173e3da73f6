//! Concept directory clients.

mod memory;
#[cfg(feature = "rest")]
mod rest;

use std::fmt;

use async_trait::async_trait;

use crate::domain::Concept;

pub use memory::StaticDirectory;
#[cfg(feature = "rest")]
pub use rest::{RestDirectory, RestDirectoryConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound(String),
    Transport(String),
    Decode(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound(id) => write!(f, "concept {id} not found"),
            LookupError::Transport(message) => write!(f, "concept lookup failed: {message}"),
            LookupError::Decode(message) => write!(f, "unreadable concept response: {message}"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Lookup-by-id access to the remote concept directory.
#[async_trait]
pub trait ConceptDirectory: Send + Sync {
    async fn lookup_concept(&self, id: &str) -> Result<Concept, LookupError>;
}

/// Resolve `id` and accept the result only when the directory echoes the
/// requested id back.
pub async fn resolves<D>(directory: &D, id: &str) -> bool
where
    D: ConceptDirectory + ?Sized,
{
    match directory.lookup_concept(id).await {
        Ok(concept) => concept.uuid == id,
        Err(err) => {
            tracing::warn!(concept = id, error = %err, "concept lookup failed");
            false
        }
    }
}
