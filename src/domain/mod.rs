mod concept;
mod parser;
mod question;
mod schema;

pub use concept::{CODED_DATATYPE, Concept, ConceptAnswer, ConceptDatatype};
pub use parser::{
    SchemaIssue, SchemaParseError, form_document_schema, parse_concepts, parse_form_schema,
    parse_question,
};
pub use question::{Answer, Question, QuestionOptions, QuestionType, Rendering};
pub use schema::{FormSchema, Page, Section};
