//! Extension-keyed dispatch table for format parsers.

use std::collections::HashMap;
use std::sync::Arc;

use super::FormatParser;
use super::csv::CsvParser;
use super::fixed::FixedWidthParser;
use super::json::JsonParser;

/// Maps file extensions to format parsers.
///
/// Extension matching is exact and case-insensitive; a single leading dot is
/// stripped, so `register(".CSV", ...)` and `resolve("csv")` agree. A failed
/// [`Self::resolve`] is the unsupported-format signal: the ingestion loop
/// records a skip for the file instead of treating it as an error.
pub struct ParserRegistry {
    map: HashMap<String, Arc<dyn FormatParser>>,
}

impl ParserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Registry pre-populated with every built-in format.
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register("csv", CsvParser::comma());
        registry.register("tsv", CsvParser::tab());
        registry.register("json", JsonParser);
        registry.register("ndjson", JsonParser);
        registry.register("fwf", FixedWidthParser);
        registry
    }

    /// Register a parser for a file extension, replacing any previous binding.
    pub fn register(&mut self, extension: impl AsRef<str>, parser: impl FormatParser + 'static) {
        self.map
            .insert(normalize(extension.as_ref()), Arc::new(parser));
    }

    /// Look up the parser for an extension, if one is registered.
    pub fn resolve(&self, extension: &str) -> Option<Arc<dyn FormatParser>> {
        self.map.get(&normalize(extension)).cloned()
    }

    /// Number of registered parsers.
    pub fn parser_count(&self) -> usize {
        self.map.len()
    }

    /// All registered extensions, normalized.
    pub fn registered_extensions(&self) -> Vec<&str> {
        self.map.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(extension: &str) -> String {
    extension.strip_prefix('.').unwrap_or(extension).to_ascii_lowercase()
}
