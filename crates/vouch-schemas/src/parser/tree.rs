//! Parsed schema tree
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use crate::error::{CompileError, CompileResult};
use crate::parser::ParsedRule;

/// Path segment meaning "every element of the array"
pub const WILDCARD: &str = "*";
/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// Shape of a schema node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeKind {
    /// Scalar or otherwise opaque value
    #[default]
    Literal,
    /// Object with declared children, in declaration order
    Object(Vec<(String, SchemaNode)>),
    /// Array whose elements are validated against `each`
    Array(Option<Box<SchemaNode>>),
}

/// A field in the schema tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    pub rules: Vec<ParsedRule>,
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Leaf node with the given rules
    pub fn literal(rules: Vec<ParsedRule>) -> Self {
        Self {
            rules,
            kind: NodeKind::Literal,
        }
    }

    /// Object node with the given rules and children
    pub fn object(rules: Vec<ParsedRule>, children: Vec<(String, SchemaNode)>) -> Self {
        Self {
            rules,
            kind: NodeKind::Object(children),
        }
    }

    /// Array node with the given rules and element node
    pub fn array(rules: Vec<ParsedRule>, each: Option<SchemaNode>) -> Self {
        Self {
            rules,
            kind: NodeKind::Array(each.map(Box::new)),
        }
    }

    fn as_object_children(
        &mut self,
        path: &str,
        segment: &str,
    ) -> CompileResult<&mut Vec<(String, SchemaNode)>> {
        if matches!(self.kind, NodeKind::Literal) {
            self.kind = NodeKind::Object(Vec::new());
        }
        match &mut self.kind {
            NodeKind::Object(children) => Ok(children),
            _ => Err(CompileError::ConflictingPath {
                path: path.to_string(),
                segment: segment.to_string(),
            }),
        }
    }

    fn as_array_each(
        &mut self,
        path: &str,
        segment: &str,
    ) -> CompileResult<&mut Option<Box<SchemaNode>>> {
        if matches!(self.kind, NodeKind::Literal) {
            self.kind = NodeKind::Array(None);
        }
        match &mut self.kind {
            NodeKind::Array(each) => Ok(each),
            _ => Err(CompileError::ConflictingPath {
                path: path.to_string(),
                segment: segment.to_string(),
            }),
        }
    }

    fn descend(
        &mut self,
        segment: &str,
        rest: &[&str],
        rules: Vec<ParsedRule>,
        path: &str,
    ) -> CompileResult<()> {
        match rest.split_first() {
            None => {
                self.rules.extend(rules);
                Ok(())
            }
            Some((&WILDCARD, tail)) => {
                let each = self.as_array_each(path, segment)?;
                let child = each.get_or_insert_with(|| Box::new(SchemaNode::default()));
                child.descend(WILDCARD, tail, rules, path)
            }
            Some(_) => {
                let children = self.as_object_children(path, segment)?;
                insert_child(children, rest, rules, path)
            }
        }
    }

    /// Number of rules in this node and all of its descendants
    pub fn rule_count(&self) -> usize {
        let nested = match &self.kind {
            NodeKind::Literal => 0,
            NodeKind::Object(children) => children.iter().map(|(_, c)| c.rule_count()).sum(),
            NodeKind::Array(each) => each.as_ref().map_or(0, |c| c.rule_count()),
        };
        self.rules.len() + nested
    }
}

/// Schema tree ready for compilation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSchema {
    fields: Vec<(String, SchemaNode)>,
}

impl ParsedSchema {
    /// Build a schema from already-structured top level nodes
    pub fn from_nodes(fields: Vec<(String, SchemaNode)>) -> Self {
        Self { fields }
    }

    /// Top level nodes in declaration order
    pub fn fields(&self) -> &[(String, SchemaNode)] {
        &self.fields
    }

    /// Top level field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of declared rules
    pub fn rule_count(&self) -> usize {
        self.fields.iter().map(|(_, node)| node.rule_count()).sum()
    }

    /// Attach `rules` to the node addressed by the dotted `path`,
    /// creating intermediate object and array nodes as needed.
    pub fn insert(&mut self, path: &str, rules: Vec<ParsedRule>) -> CompileResult<()> {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(CompileError::malformed_path(path, "empty path segment"));
        }
        insert_child(&mut self.fields, &segments, rules, path)
    }
}

fn insert_child(
    children: &mut Vec<(String, SchemaNode)>,
    segments: &[&str],
    rules: Vec<ParsedRule>,
    path: &str,
) -> CompileResult<()> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(CompileError::malformed_path(path, "empty path"));
    };
    if *head == WILDCARD {
        return Err(CompileError::malformed_path(
            path,
            "'*' must follow an array field",
        ));
    }

    let index = match children.iter().position(|(name, _)| name == head) {
        Some(index) => index,
        None => {
            children.push((head.to_string(), SchemaNode::default()));
            children.len() - 1
        }
    };
    children[index].1.descend(head, rest, rules, path)
}
