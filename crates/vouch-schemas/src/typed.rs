//! Typed schema builder
//!
//! Builds a [`ParsedSchema`] directly, without going through rule strings.
//! Every typed node is `required` unless marked [`TypedNode::optional`],
//! and contributes its type rule right after the presence check:
//!
//! ```rust
//! use vouch_schemas::typed::{self, schema};
//!
//! let parsed = schema([
//!     ("username", typed::string().rule("min", [3])),
//!     ("age", typed::number().optional()),
//!     ("tags", typed::array(typed::string()).optional()),
//! ]);
//! assert_eq!(parsed.field_names(), vec!["username", "age", "tags"]);
//! ```
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use crate::parser::{NodeKind, ParsedRule, ParsedSchema, SchemaNode};
use serde_json::Value;

/// A typed field definition
#[derive(Debug, Clone, PartialEq)]
pub struct TypedNode {
    optional: bool,
    type_rule: Option<&'static str>,
    rules: Vec<ParsedRule>,
    kind: TypedKind,
}

#[derive(Debug, Clone, PartialEq)]
enum TypedKind {
    Literal,
    Object(Vec<(String, TypedNode)>),
    Array(Option<Box<TypedNode>>),
}

impl TypedNode {
    fn new(type_rule: Option<&'static str>, kind: TypedKind) -> Self {
        Self {
            optional: false,
            type_rule,
            rules: Vec::new(),
            kind,
        }
    }

    /// Drop the implicit `required` rule
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Append an extra rule after the type rule
    pub fn rule<I, A>(mut self, name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Value>,
    {
        self.rules.push(ParsedRule::with_args(
            name,
            args.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Append an extra rule without arguments
    pub fn with(self, name: &str) -> Self {
        self.rule(name, Vec::<Value>::new())
    }

    fn into_node(self) -> SchemaNode {
        let mut rules = Vec::with_capacity(self.rules.len() + 2);
        if !self.optional {
            rules.push(ParsedRule::new("required"));
        }
        if let Some(type_rule) = self.type_rule {
            rules.push(ParsedRule::new(type_rule));
        }
        rules.extend(self.rules);

        let kind = match self.kind {
            TypedKind::Literal => NodeKind::Literal,
            TypedKind::Object(children) => NodeKind::Object(
                children
                    .into_iter()
                    .map(|(name, child)| (name, child.into_node()))
                    .collect(),
            ),
            TypedKind::Array(each) => NodeKind::Array(each.map(|e| Box::new(e.into_node()))),
        };

        SchemaNode { rules, kind }
    }
}

/// Build a pre-parsed schema from typed fields
pub fn schema<I, K>(fields: I) -> ParsedSchema
where
    I: IntoIterator<Item = (K, TypedNode)>,
    K: Into<String>,
{
    ParsedSchema::from_nodes(
        fields
            .into_iter()
            .map(|(name, node)| (name.into(), node.into_node()))
            .collect(),
    )
}

/// String field
pub fn string() -> TypedNode {
    TypedNode::new(Some("string"), TypedKind::Literal)
}

/// Numeric field
pub fn number() -> TypedNode {
    TypedNode::new(Some("number"), TypedKind::Literal)
}

/// Boolean field
pub fn boolean() -> TypedNode {
    TypedNode::new(Some("boolean"), TypedKind::Literal)
}

/// Field of any type; only presence is checked
pub fn any() -> TypedNode {
    TypedNode::new(None, TypedKind::Literal)
}

/// Object field with typed children
pub fn object<I, K>(children: I) -> TypedNode
where
    I: IntoIterator<Item = (K, TypedNode)>,
    K: Into<String>,
{
    TypedNode::new(
        Some("object"),
        TypedKind::Object(
            children
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        ),
    )
}

/// Array field whose elements match `each`
pub fn array(each: TypedNode) -> TypedNode {
    TypedNode::new(Some("array"), TypedKind::Array(Some(Box::new(each))))
}
