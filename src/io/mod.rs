mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{
    load_concepts, load_form_schema, load_question, parse_document_any, parse_document_str,
    read_document,
};
pub use output::{OutputDestination, OutputOptions, emit, serialize};
