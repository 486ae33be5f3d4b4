//! Named formats, looked up by name or by file extension

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::editor::EngineSettings;
use crate::error::FormatError;
use crate::format::Format;
use crate::formats::{HtmlFormat, HtmlOptions, JsonFormat, TreevizFormat};
use crate::model::ModelDocument;

#[derive(Clone, Copy)]
enum Capability {
    Parse,
    Serialize,
}

/// Formats keyed by name. Names iterate in sorted order.
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let doc = registry.parse("<dl><dt>a</dt></dl>", "html")?;
/// let json = registry.serialize(&doc, "json")?;
/// ```
pub struct FormatRegistry {
    formats: BTreeMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formats: BTreeMap::new(),
        }
    }

    /// The built-in formats with default settings.
    pub fn with_defaults() -> Self {
        Self::configured(HtmlOptions::default(), EngineSettings::default(), false)
    }

    /// The built-in formats, sharing one set of engine settings.
    pub fn configured(html: HtmlOptions, settings: EngineSettings, show_keys: bool) -> Self {
        let mut registry = Self::new();
        registry.register(HtmlFormat::new(html, settings));
        registry.register(JsonFormat::new(settings));
        registry.register(TreevizFormat { show_keys });
        registry
    }

    /// Adds `format`, replacing one registered under the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats.insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        match self.formats.get(name) {
            Some(format) => Ok(format.as_ref()),
            None => Err(FormatError::FormatNotFound(name.to_string())),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    pub fn list_formats(&self) -> Vec<String> {
        self.formats.keys().cloned().collect()
    }

    /// Name of the format claiming the extension of `filename`, compared case-insensitively.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        self.formats
            .iter()
            .find(|(_, format)| format.file_extensions().contains(&extension.as_str()))
            .map(|(name, _)| name.clone())
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<ModelDocument, FormatError> {
        self.capable(format, Capability::Parse)?.parse(source)
    }

    pub fn serialize(&self, doc: &ModelDocument, format: &str) -> Result<String, FormatError> {
        self.capable(format, Capability::Serialize)?.serialize(doc)
    }

    pub fn serialize_with_options(
        &self,
        doc: &ModelDocument,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        self.capable(format, Capability::Serialize)?
            .serialize_with_options(doc, options)
    }

    fn capable(&self, name: &str, capability: Capability) -> Result<&dyn Format, FormatError> {
        let format = self.get(name)?;
        let (supported, verb) = match capability {
            Capability::Parse => (format.supports_parsing(), "parsing"),
            Capability::Serialize => (format.supports_serialization(), "serialization"),
        };
        if supported {
            Ok(format)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{name}' does not support {verb}"
            )))
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
