use std::fmt;

use jsonschema::validator_for;
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{concept::Concept, question::Question, schema::FormSchema};

/// One structural problem found while reading a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaIssue {
    pub pointer: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SchemaParseError {
    pub document: &'static str,
    pub issues: Vec<SchemaIssue>,
}

impl fmt::Display for SchemaParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} document", self.document)?;
        for issue in &self.issues {
            let pointer = if issue.pointer.is_empty() {
                "<root>"
            } else {
                issue.pointer.as_str()
            };
            write!(f, "\n  {pointer}: {}", issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaParseError {}

/// JSON Schema describing the form document shape this crate reads.
pub fn form_document_schema() -> Value {
    schema_value::<FormSchema>()
}

/// Parse a host form document into the typed `FormSchema`.
pub fn parse_form_schema(value: &Value) -> Result<FormSchema, SchemaParseError> {
    parse_checked(value, "form schema")
}

/// Parse a single question definition.
pub fn parse_question(value: &Value) -> Result<Question, SchemaParseError> {
    parse_checked(value, "question")
}

/// Parse a concept list, or a single concept object.
pub fn parse_concepts(value: &Value) -> Result<Vec<Concept>, SchemaParseError> {
    match value {
        Value::Array(_) => parse_checked(value, "concept list"),
        _ => parse_checked::<Concept>(value, "concept").map(|concept| vec![concept]),
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Bool(true))
}

fn parse_checked<T>(value: &Value, document: &'static str) -> Result<T, SchemaParseError>
where
    T: JsonSchema + DeserializeOwned,
{
    let schema = schema_value::<T>();
    let validator = validator_for(&schema).map_err(|err| SchemaParseError {
        document,
        issues: vec![SchemaIssue {
            pointer: String::new(),
            message: format!("failed to compile document schema: {err}"),
        }],
    })?;

    let issues: Vec<SchemaIssue> = validator
        .iter_errors(value)
        .map(|error| SchemaIssue {
            pointer: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();
    if !issues.is_empty() {
        return Err(SchemaParseError { document, issues });
    }

    serde_json::from_value(value.clone()).map_err(|err| SchemaParseError {
        document,
        issues: vec![SchemaIssue {
            pointer: String::new(),
            message: err.to_string(),
        }],
    })
}
