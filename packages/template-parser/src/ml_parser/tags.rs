//! ML Parser Tags
//!
//! Tag metadata consumed by the lexer and the tree builder. The table itself
//! is supplied by the caller through [`TagDefinitionProvider`].

use serde::{Deserialize, Serialize};

/// How the content of an element is scanned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagContentType {
    /// Regular markup with tags, text and interpolation.
    #[default]
    ParsableData,
    RawText,
    EscapableRawText,
}

impl TagContentType {
    /// Raw content is read verbatim up to the matching closing tag.
    pub fn is_raw(self) -> bool {
        matches!(self, TagContentType::RawText | TagContentType::EscapableRawText)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDefinition {
    pub is_void: bool,
    pub can_self_close: bool,
    pub content_type: TagContentType,
}

impl TagDefinition {
    pub fn void() -> Self {
        TagDefinition {
            is_void: true,
            can_self_close: true,
            content_type: TagContentType::ParsableData,
        }
    }

    pub fn with_content_type(content_type: TagContentType) -> Self {
        TagDefinition {
            content_type,
            ..TagDefinition::default()
        }
    }
}

pub trait TagDefinitionProvider: Sync {
    fn tag_definition(&self, tag_name: &str) -> TagDefinition;
}

impl<F> TagDefinitionProvider for F
where
    F: Fn(&str) -> TagDefinition + Sync,
{
    fn tag_definition(&self, tag_name: &str) -> TagDefinition {
        self(tag_name)
    }
}
