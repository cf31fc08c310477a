//! Vouch Core - compile-cache-execute orchestration for rule schemas
//!
//! This crate validates data records against field-level rule schemas:
//! schemas are compiled once, memoized under an explicit cache key and
//! executed in one of three traversal modes.
//!
//! # Main Components
//!
//! - **Cache Manager**: single-flight keyed store for compiled validators
//! - **Configuration Store**: process-wide defaults with call-site overrides
//! - **Validator**: `validate`, `validate_all` and `validate_each`
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use vouch_core::{validate_all, RawSchema};
//!
//! let schema = RawSchema::new()
//!     .field("username", "required")
//!     .field("age", "required");
//!
//! let err = validate_all(&json!({}), schema, None, None).unwrap_err();
//! let errors = err.validation_errors().unwrap();
//! assert_eq!(errors.fields(), vec!["username", "age"]);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod validator;

// Re-export main types for convenience
pub use cache::{CacheManager, CacheStats};
pub use config::{ConfigStore, PartialConfig, ValidatorConfig};
pub use error::{Error, Result};
pub use validator::{
    configure, defaults, factory_defaults, global, reset_defaults, validate, validate_all,
    validate_each, Validator,
};

// Re-export the schema layer so callers need a single dependency
pub use vouch_schemas::{
    typed, CompileError, CompiledValidator, Compiler, ErrorCollector, ErrorEntry, ErrorFormatter,
    ExecOptions, FormatterFactory, JsonApiFormatter, MessageTemplate, Messages, ParsedSchema,
    RawSchema, Rule, RuleCompiler, RuleContext, RuleRegistry, SchemaInput, TraversalMode,
    ValidationErrors, VanillaFormatter,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
