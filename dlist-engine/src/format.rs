//! Format trait definition
//!
//! Formats load markup into a settled [ModelDocument] and write one back out. Parsing always
//! ends with the post-fixer, so every format hands out models that satisfy the list
//! invariants no matter how loose the input was.

use std::collections::HashMap;

use crate::error::FormatError;
use crate::model::ModelDocument;

/// Trait for document formats
///
/// Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, doc: &ModelDocument) -> Result<String, FormatError> {
///         Ok(format!("{} blocks", doc.len()))
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "html", "json")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a settled model
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &str) -> Result<ModelDocument, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a model into source text
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _doc: &ModelDocument) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize a model, optionally using extra parameters.
    ///
    /// Formats without parameters can rely on the default implementation, which rejects
    /// any option.
    fn serialize_with_options(
        &self,
        doc: &ModelDocument,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.serialize(doc)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}

/// Reads a boolean extra parameter.
pub(crate) fn bool_option(
    options: &HashMap<String, String>,
    key: &str,
) -> Result<Option<bool>, FormatError> {
    options
        .get(key)
        .map(|value| match value.as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            other => Err(FormatError::SerializationError(format!(
                "Option '{key}' expects a boolean, got '{other}'"
            ))),
        })
        .transpose()
}
