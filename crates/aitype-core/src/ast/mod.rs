//! Syntax tree produced by the external AiScript parser.
//!
//! The tree arrives as JSON: every node is an object with a `type`
//! discriminator, kind-specific fields and an optional `loc`. Kinds the
//! checker has no rule for deserialize into [`NodeKind::Other`].

use crate::errors::CheckerError;
use crate::span::Span;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Span>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node { kind, loc: None }
    }

    pub fn with_loc(mut self, start: usize, end: usize) -> Self {
        self.loc = Some(Span::new(start, end));
        self
    }

    /// Location for diagnostics; nodes without one report at `0..0`
    pub fn span(&self) -> Span {
        self.loc.unwrap_or_default()
    }

    pub fn as_fn(&self) -> Option<&FnLiteral> {
        match &self.kind {
            NodeKind::Fn(func) => Some(func),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    // Statements
    Def(Definition),
    Assign(Assignment),
    AddAssign(Assignment),
    SubAssign(Assignment),
    Return(Return),
    For(ForLoop),
    Each(EachLoop),
    Loop(Loop),
    Break,
    Continue,
    Ns(Namespace),

    // Expressions
    If(IfExpression),
    Fn(FnLiteral),
    Match(MatchExpression),
    Block(Block),
    Call(Call),
    Not(Not),
    And(Binary),
    Or(Binary),
    Tmpl(Template),
    Index(IndexAccess),
    Prop(PropertyAccess),
    Str(StrLiteral),
    Num(NumLiteral),
    Bool(BoolLiteral),
    Null,
    Arr(ArrLiteral),
    Obj(ObjLiteral),
    Identifier(Identifier),

    // Type sources
    NamedTypeSource(NamedTypeSource),
    FnTypeSource(FnTypeSource),

    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<Box<Node>>,
    pub expr: Box<Node>,
    #[serde(default, rename = "mut")]
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub dest: Box<Node>,
    pub expr: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub expr: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Box<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Box<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Box<Node>>,
    #[serde(rename = "for")]
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EachLoop {
    pub var: String,
    pub items: Box<Node>,
    #[serde(rename = "for")]
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfExpression {
    pub cond: Box<Node>,
    pub then: Box<Node>,
    #[serde(default)]
    pub elseif: Vec<ElseIf>,
    #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_branch: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIf {
    pub cond: Node,
    pub then: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FnLiteral {
    #[serde(default)]
    pub args: Vec<FnArg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret_type: Option<Box<Node>>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FnArg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchExpression {
    pub about: Box<Node>,
    #[serde(default)]
    pub qs: Vec<MatchArm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub q: Node,
    pub a: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub target: Box<Node>,
    #[serde(default)]
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Not {
    pub expr: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub left: Box<Node>,
    pub right: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub tmpl: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplatePart {
    Text(String),
    Expr(Node),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexAccess {
    pub target: Box<Node>,
    pub index: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccess {
    pub target: Box<Node>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumLiteral {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrLiteral {
    pub value: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjLiteral {
    pub value: IndexMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTypeSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnTypeSource {
    #[serde(default)]
    pub args: Vec<Node>,
    pub result: Box<Node>,
}

/// Parse a program (a JSON array of top-level nodes)
pub fn parse_program(json: &str) -> Result<Vec<Node>, CheckerError> {
    Ok(serde_json::from_str(json)?)
}
