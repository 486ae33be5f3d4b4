//! Error types for engine and format operations

use thiserror::Error;

use crate::model::NodeKey;

/// Errors raised by the engine itself.
///
/// Malformed list structure is never an error: the post-fixer repairs it. These variants
/// cover the few situations where the engine cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The post-fix driver kept producing corrections past its bound
    #[error("post-fixer did not settle within {iterations} correcting passes")]
    PostFixerDiverged { iterations: usize },
    /// A model handle no longer resolves to an element
    #[error("model element {0} does not exist")]
    UnknownNode(NodeKey),
    /// A position could not be translated between the model and the view
    #[error("position cannot be mapped: {0}")]
    Unmappable(String),
}

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// The engine failed while loading or rendering a document
    #[error(transparent)]
    Engine(#[from] EngineError),
}
