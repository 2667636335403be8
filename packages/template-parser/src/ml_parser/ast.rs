//! ML Parser AST
//!
//! The markup tree: a forest of elements, text and comments. Children are
//! owned by their parent element.

use serde::{Deserialize, Serialize};

use super::tokens::Token;
use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    Element(Element),
    Attribute(Attribute),
    Text(Text),
    Comment(Comment),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Element(el) => &el.source_span,
            Node::Attribute(attr) => &attr.source_span,
            Node::Text(text) => &text.source_span,
            Node::Comment(comment) => &comment.source_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
    /// The Text, RawText and Interpolation tokens the value was built from.
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub value: Option<String>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    pub value_span: Option<ParseSourceSpan>,
    /// Present only when the value contains interpolation.
    pub value_tokens: Option<Vec<Token>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub is_self_closing: bool,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    /// Set only when a matching close tag was consumed.
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Element {
    pub fn new(name: String, attrs: Vec<Attribute>, start_source_span: ParseSourceSpan) -> Self {
        Element {
            name,
            attrs,
            children: Vec::new(),
            is_self_closing: false,
            source_span: start_source_span,
            start_source_span,
            end_source_span: None,
        }
    }
}
