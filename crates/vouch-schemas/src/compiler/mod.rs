//! Schema compiler
//!
//! Turns a raw or pre-parsed schema into a [`CompiledValidator`]: every
//! rule name is resolved against the registry, rule arguments are checked
//! once, and custom messages are bound to their field patterns.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

pub mod executor;

pub use executor::{ExecOptions, TraversalMode};

use crate::error::{CompileError, CompileResult};
use crate::messages::{MessageTemplate, Messages};
use crate::parser::{NodeKind, ParsedSchema, RawSchema, SchemaNode, WILDCARD};
use crate::rules::{Rule, RuleRegistry};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Schema accepted by the compiler
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaInput {
    /// Declarative field → rules mapping
    Raw(RawSchema),
    /// Tree built by the typed builder or parsed ahead of time
    Parsed(ParsedSchema),
}

impl SchemaInput {
    /// Parsed tree, parsing raw schemas on demand
    pub fn parsed(&self) -> CompileResult<Cow<'_, ParsedSchema>> {
        match self {
            Self::Raw(raw) => raw.parse().map(Cow::Owned),
            Self::Parsed(parsed) => Ok(Cow::Borrowed(parsed)),
        }
    }
}

impl From<RawSchema> for SchemaInput {
    fn from(schema: RawSchema) -> Self {
        Self::Raw(schema)
    }
}

impl From<ParsedSchema> for SchemaInput {
    fn from(schema: ParsedSchema) -> Self {
        Self::Parsed(schema)
    }
}

impl TryFrom<Value> for SchemaInput {
    type Error = CompileError;

    fn try_from(value: Value) -> CompileResult<Self> {
        RawSchema::try_from(value).map(Self::Raw)
    }
}

// Callers holding a schema across many calls lend it; cache hits never clone.
impl<'a> From<&'a SchemaInput> for Cow<'a, SchemaInput> {
    fn from(schema: &'a SchemaInput) -> Self {
        Cow::Borrowed(schema)
    }
}

impl From<SchemaInput> for Cow<'_, SchemaInput> {
    fn from(schema: SchemaInput) -> Self {
        Cow::Owned(schema)
    }
}

impl From<RawSchema> for Cow<'_, SchemaInput> {
    fn from(schema: RawSchema) -> Self {
        Cow::Owned(SchemaInput::Raw(schema))
    }
}

impl From<ParsedSchema> for Cow<'_, SchemaInput> {
    fn from(schema: ParsedSchema) -> Self {
        Cow::Owned(SchemaInput::Parsed(schema))
    }
}

/// Compiles schemas into executable validators
pub trait Compiler: Send + Sync {
    fn compile(&self, schema: &SchemaInput, messages: &Messages) -> CompileResult<CompiledValidator>;
}

/// Default compiler backed by a [`RuleRegistry`]
#[derive(Debug, Clone)]
pub struct RuleCompiler {
    registry: Arc<RuleRegistry>,
}

impl Default for RuleCompiler {
    fn default() -> Self {
        Self::new(RuleRegistry::builtin())
    }
}

impl RuleCompiler {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    fn compile_fields(
        &self,
        prefix: Option<&str>,
        fields: &[(String, SchemaNode)],
        messages: &Messages,
    ) -> CompileResult<Vec<(String, CompiledNode)>> {
        fields
            .iter()
            .map(|(key, node)| {
                let pattern = join_path(prefix, key);
                Ok((key.clone(), self.compile_node(pattern, node, messages)?))
            })
            .collect()
    }

    fn compile_node(
        &self,
        pattern: String,
        node: &SchemaNode,
        messages: &Messages,
    ) -> CompileResult<CompiledNode> {
        let mut rules = Vec::with_capacity(node.rules.len());
        for parsed in &node.rules {
            let rule = self
                .registry
                .get(&parsed.name)
                .ok_or_else(|| CompileError::unknown_rule(&pattern, &parsed.name))?;
            let args = rule
                .compile(parsed.args.clone())
                .map_err(|reason| CompileError::invalid_arguments(&pattern, &parsed.name, reason))?;

            rules.push(CompiledRule {
                name: parsed.name.clone(),
                message: messages.resolve(&pattern, &parsed.name).cloned(),
                rule,
                args,
            });
        }

        let kind = match &node.kind {
            NodeKind::Literal => CompiledKind::Literal,
            NodeKind::Object(children) => {
                CompiledKind::Object(self.compile_fields(Some(&pattern), children, messages)?)
            }
            NodeKind::Array(each) => CompiledKind::Array(match each {
                Some(each) => Some(Box::new(self.compile_node(
                    join_path(Some(&pattern), WILDCARD),
                    each,
                    messages,
                )?)),
                None => None,
            }),
        };

        Ok(CompiledNode {
            pattern,
            rules,
            kind,
        })
    }
}

impl Compiler for RuleCompiler {
    fn compile(&self, schema: &SchemaInput, messages: &Messages) -> CompileResult<CompiledValidator> {
        let parsed = schema.parsed()?;
        let fields = self.compile_fields(None, parsed.fields(), messages)?;
        let validator = CompiledValidator {
            fields,
            messages: messages.clone(),
        };

        debug!(
            fields = validator.fields.len(),
            rules = validator.rule_count(),
            "Compiled schema"
        );
        Ok(validator)
    }
}

pub(crate) fn join_path(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, key),
        None => key.to_string(),
    }
}

/// A rule bound to its arguments and message
#[derive(Clone)]
pub struct CompiledRule {
    pub name: String,
    pub args: Vec<Value>,
    pub message: Option<MessageTemplate>,
    rule: Arc<dyn Rule>,
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("message", &self.message)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum CompiledKind {
    Literal,
    Object(Vec<(String, CompiledNode)>),
    Array(Option<Box<CompiledNode>>),
}

/// A field with its compiled rules
#[derive(Debug, Clone)]
pub struct CompiledNode {
    /// Field path as written in the schema (`users.*.email`)
    pub pattern: String,
    pub rules: Vec<CompiledRule>,
    pub kind: CompiledKind,
}

impl CompiledNode {
    fn visit<'a>(&'a self, out: &mut Vec<&'a CompiledNode>) {
        out.push(self);
        match &self.kind {
            CompiledKind::Literal | CompiledKind::Array(None) => {}
            CompiledKind::Object(children) => {
                for (_, child) in children {
                    child.visit(out);
                }
            }
            CompiledKind::Array(Some(each)) => each.visit(out),
        }
    }
}

/// Executable form of a schema.
///
/// Immutable once built; share it behind an `Arc` and call
/// [`CompiledValidator::exec`] as often as needed.
#[derive(Debug, Clone)]
pub struct CompiledValidator {
    fields: Vec<(String, CompiledNode)>,
    messages: Messages,
}

impl CompiledValidator {
    /// Top level nodes in declaration order
    pub fn fields(&self) -> &[(String, CompiledNode)] {
        &self.fields
    }

    /// Messages the validator was compiled with
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Every node in traversal order
    pub fn nodes(&self) -> Vec<&CompiledNode> {
        let mut out = Vec::new();
        for (_, node) in &self.fields {
            node.visit(&mut out);
        }
        out
    }

    /// Total number of compiled rules
    pub fn rule_count(&self) -> usize {
        self.nodes().iter().map(|node| node.rules.len()).sum()
    }
}
