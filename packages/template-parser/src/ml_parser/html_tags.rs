//! HTML Tag Definitions
//!
//! A read-only default table for HTML. Callers with other vocabularies pass
//! their own [`TagDefinitionProvider`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::tags::{TagContentType, TagDefinition, TagDefinitionProvider};

const VOID_TAGS: &[&str] = &[
    "area", "embed", "link", "img", "input", "param", "hr", "br", "source", "track", "wbr",
    "base", "meta", "col", "keygen",
];

#[derive(Debug, Clone)]
pub struct HtmlTagDefinitions {
    definitions: IndexMap<String, TagDefinition>,
    default_definition: TagDefinition,
}

impl HtmlTagDefinitions {
    pub fn new() -> Self {
        let mut definitions = IndexMap::new();
        for name in VOID_TAGS {
            definitions.insert(name.to_string(), TagDefinition::void());
        }
        for name in ["script", "style"] {
            definitions.insert(name.to_string(), TagDefinition::with_content_type(TagContentType::RawText));
        }
        for name in ["textarea", "title"] {
            definitions.insert(
                name.to_string(),
                TagDefinition::with_content_type(TagContentType::EscapableRawText),
            );
        }
        HtmlTagDefinitions {
            definitions,
            default_definition: TagDefinition::default(),
        }
    }

    /// Add or replace the definition of `name`.
    pub fn insert(&mut self, name: &str, definition: TagDefinition) {
        self.definitions.insert(name.to_ascii_lowercase(), definition);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

impl Default for HtmlTagDefinitions {
    fn default() -> Self {
        HtmlTagDefinitions::new()
    }
}

impl TagDefinitionProvider for HtmlTagDefinitions {
    fn tag_definition(&self, tag_name: &str) -> TagDefinition {
        if let Some(def) = self.definitions.get(tag_name) {
            return *def;
        }
        if let Some(def) = self.definitions.get(&tag_name.to_ascii_lowercase()) {
            return *def;
        }
        // Foreign elements (`svg:path`, `:svg:path`) may always self close.
        if tag_name.contains(':') {
            return TagDefinition {
                can_self_close: true,
                ..self.default_definition
            };
        }
        self.default_definition
    }
}

static HTML_TAG_DEFINITIONS: Lazy<HtmlTagDefinitions> = Lazy::new(HtmlTagDefinitions::new);

/// The shared default HTML table.
pub fn html_tag_definitions() -> &'static HtmlTagDefinitions {
    &HTML_TAG_DEFINITIONS
}
