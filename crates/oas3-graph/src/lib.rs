//! Compiles OpenAPI 3.1 documents into a language-neutral graph of models and apis.
//!
//! [`walker`] traverses a document and resolves references, [`generator`]
//! turns what it visits into the [`model::ModelGraph`].

pub mod generator;
pub mod model;
pub mod walker;
