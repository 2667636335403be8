/**
 * Expression AST
 *
 * Trees produced by the expression parser. Every node carries a span
 * relative to the parsed input and an absolute span into the template.
 */

use serde::{Deserialize, Serialize};

/// Offsets into the parsed expression text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Offsets into the enclosing template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    ThisReceiver(ThisReceiver),
    Conditional(Conditional),
    PropertyRead(PropertyRead),
    PropertyWrite(PropertyWrite),
    SafePropertyRead(SafePropertyRead),
    KeyedRead(KeyedRead),
    KeyedWrite(KeyedWrite),
    SafeKeyedRead(SafeKeyedRead),
    Call(Call),
    SafeCall(SafeCall),
    Binary(Binary),
    Unary(Unary),
    PrefixNot(PrefixNot),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Interpolation(Interpolation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyExpr {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// The implicit context that bare identifiers are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// An explicit `this`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThisReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyWrite {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedWrite {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeKeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
    /// Span of the argument list, parentheses excluded.
    pub argument_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeCall {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
    pub argument_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

/// `+x` or `-x`, kept in the `0 + x` / `0 - x` form: `left` is always the
/// number literal `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operator: String,
    pub left: Box<AST>,
    pub expr: Box<AST>,
}

impl Unary {
    pub fn new(span: ParseSpan, source_span: AbsoluteSourceSpan, operator: &str, expr: AST) -> Self {
        let zero = LiteralPrimitive::new(span, source_span, LiteralValue::Number(0.0));
        Unary {
            span,
            source_span,
            operator: operator.to_string(),
            left: Box::new(AST::LiteralPrimitive(zero)),
            expr: Box::new(expr),
        }
    }

    /// The equivalent binary node.
    pub fn to_binary(&self) -> Binary {
        Binary {
            span: self.span,
            source_span: self.source_span,
            operation: self.operator.clone(),
            left: self.left.clone(),
            right: self.expr.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum LiteralValue {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub value: LiteralValue,
}

impl LiteralPrimitive {
    pub fn new(span: ParseSpan, source_span: AbsoluteSourceSpan, value: LiteralValue) -> Self {
        LiteralPrimitive {
            span,
            source_span,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub keys: Vec<LiteralMapKey>,
    pub values: Vec<AST>,
}

/// `strings` always has one more entry than `expressions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub strings: Vec<String>,
    pub expressions: Vec<AST>,
}

impl AST {
    pub fn empty(span: ParseSpan, source_span: AbsoluteSourceSpan) -> Self {
        AST::EmptyExpr(EmptyExpr { span, source_span })
    }

    pub fn span(&self) -> ParseSpan {
        match self {
            AST::EmptyExpr(n) => n.span,
            AST::ImplicitReceiver(n) => n.span,
            AST::ThisReceiver(n) => n.span,
            AST::Conditional(n) => n.span,
            AST::PropertyRead(n) => n.span,
            AST::PropertyWrite(n) => n.span,
            AST::SafePropertyRead(n) => n.span,
            AST::KeyedRead(n) => n.span,
            AST::KeyedWrite(n) => n.span,
            AST::SafeKeyedRead(n) => n.span,
            AST::Call(n) => n.span,
            AST::SafeCall(n) => n.span,
            AST::Binary(n) => n.span,
            AST::Unary(n) => n.span,
            AST::PrefixNot(n) => n.span,
            AST::LiteralPrimitive(n) => n.span,
            AST::LiteralArray(n) => n.span,
            AST::LiteralMap(n) => n.span,
            AST::Interpolation(n) => n.span,
        }
    }

    pub fn source_span(&self) -> AbsoluteSourceSpan {
        match self {
            AST::EmptyExpr(n) => n.source_span,
            AST::ImplicitReceiver(n) => n.source_span,
            AST::ThisReceiver(n) => n.source_span,
            AST::Conditional(n) => n.source_span,
            AST::PropertyRead(n) => n.source_span,
            AST::PropertyWrite(n) => n.source_span,
            AST::SafePropertyRead(n) => n.source_span,
            AST::KeyedRead(n) => n.source_span,
            AST::KeyedWrite(n) => n.source_span,
            AST::SafeKeyedRead(n) => n.source_span,
            AST::Call(n) => n.source_span,
            AST::SafeCall(n) => n.source_span,
            AST::Binary(n) => n.source_span,
            AST::Unary(n) => n.source_span,
            AST::PrefixNot(n) => n.source_span,
            AST::LiteralPrimitive(n) => n.source_span,
            AST::LiteralArray(n) => n.source_span,
            AST::LiteralMap(n) => n.source_span,
            AST::Interpolation(n) => n.source_span,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AST::EmptyExpr(_))
    }

    pub fn is_implicit_receiver(&self) -> bool {
        matches!(self, AST::ImplicitReceiver(_))
    }
}

/// A parsed expression together with the text it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ASTWithSource {
    pub ast: AST,
    pub source: String,
    pub absolute_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBindingIdentifier {
    pub source: String,
    pub span: AbsoluteSourceSpan,
}

/// `let x = y`, `let x` or `expr as x`. A missing value refers to the
/// implicit context value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableBinding {
    pub source_span: AbsoluteSourceSpan,
    pub key: TemplateBindingIdentifier,
    pub value: Option<TemplateBindingIdentifier>,
}

/// `key: expr` or a bare `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionBinding {
    pub source_span: AbsoluteSourceSpan,
    pub key: TemplateBindingIdentifier,
    pub value: Option<ASTWithSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateBinding {
    Variable(VariableBinding),
    Expression(ExpressionBinding),
}

impl TemplateBinding {
    pub fn key(&self) -> &TemplateBindingIdentifier {
        match self {
            TemplateBinding::Variable(binding) => &binding.key,
            TemplateBinding::Expression(binding) => &binding.key,
        }
    }

    pub fn source_span(&self) -> AbsoluteSourceSpan {
        match self {
            TemplateBinding::Variable(binding) => binding.source_span,
            TemplateBinding::Expression(binding) => binding.source_span,
        }
    }
}
