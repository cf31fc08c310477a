//! Vouch Schemas - rule schemas, compiler and executor
//!
//! This crate turns declarative rule schemas into executable validators:
//! - **Parser**: pipe-delimited rule strings and dotted field paths
//! - **Typed builder**: code-first schemas producing the same tree
//! - **Rules**: the built-in rule registry and the [`Rule`] trait
//! - **Compiler**: resolves rules and binds custom messages once
//! - **Executor**: runs a compiled validator in one of three traversal modes
//!
//! ## Quick Start
//!
//! ```rust
//! use vouch_schemas::{
//!     Compiler, ExecOptions, FormatterFactory, Messages, RuleCompiler, SchemaInput,
//!     TraversalMode,
//! };
//! use serde_json::json;
//!
//! let schema = SchemaInput::try_from(json!({
//!     "email": "required|email",
//!     "age": "required|number|above:17",
//! }))?;
//! let compiled = RuleCompiler::default().compile(&schema, &Messages::new())?;
//!
//! let result = compiled.exec(
//!     &json!({"email": "virk@adonisjs.com", "age": 12}),
//!     FormatterFactory::vanilla().build(),
//!     &ExecOptions::default(),
//!     TraversalMode::CollectAll,
//!     None,
//! );
//! let errors = result.unwrap_err();
//! assert_eq!(errors.fields(), vec!["age"]);
//! # Ok::<(), vouch_schemas::CompileError>(())
//! ```
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

pub mod compiler;
pub mod error;
pub mod formatter;
pub mod messages;
pub mod parser;
pub mod rules;
pub mod typed;

// Re-export commonly used types for convenience
pub use compiler::{
    CompiledNode, CompiledRule, CompiledValidator, Compiler, ExecOptions, RuleCompiler,
    SchemaInput, TraversalMode,
};
pub use error::{CompileError, CompileResult, ErrorEntry, ValidationErrors};
pub use formatter::{ErrorCollector, ErrorFormatter, FormatterFactory, JsonApiFormatter, VanillaFormatter};
pub use messages::{default_message, MessageTemplate, Messages};
pub use parser::{ParsedRule, ParsedSchema, RawRules, RawSchema};
pub use rules::{Rule, RuleContext, RuleRegistry};
