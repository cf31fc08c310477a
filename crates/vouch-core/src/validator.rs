//! Compile-cache-execute orchestration
//!
//! A [`Validator`] owns a compiler, a cache of compiled schemas and a
//! configuration store. Each of [`Validator::validate`],
//! [`Validator::validate_all`] and [`Validator::validate_each`] merges the
//! call-site configuration over the defaults, resolves a compiled
//! validator (from the cache when a key is set) and runs it in its
//! traversal mode.
//!
//! The free functions at the bottom of this module delegate to a lazily
//! built process-wide validator.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use crate::cache::{CacheManager, CacheStats};
use crate::config::{ConfigStore, PartialConfig, ValidatorConfig};
use crate::error::Result;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, debug_span};
use vouch_schemas::{
    CompileError, CompiledValidator, Compiler, Messages, RuleCompiler, RuleRegistry, SchemaInput,
    TraversalMode,
};

/// Schema validation front end
pub struct Validator {
    compiler: Arc<dyn Compiler>,
    cache: CacheManager<CompiledValidator, CompileError>,
    config: ConfigStore,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator with the built-in rules and factory defaults
    pub fn new() -> Self {
        Self::with_compiler(RuleCompiler::default())
    }

    /// Validator compiling against a custom rule registry
    pub fn with_rules(registry: RuleRegistry) -> Self {
        Self::with_compiler(RuleCompiler::new(registry))
    }

    pub fn with_compiler<C: Compiler + 'static>(compiler: C) -> Self {
        Self {
            compiler: Arc::new(compiler),
            cache: CacheManager::new(),
            config: ConfigStore::default(),
        }
    }

    /// Replace the factory defaults
    pub fn with_defaults(mut self, defaults: ValidatorConfig) -> Self {
        self.config = ConfigStore::new(defaults);
        self
    }

    /// Abort at the first failing rule.
    pub fn validate<'s>(
        &self,
        data: &Value,
        schema: impl Into<Cow<'s, SchemaInput>>,
        messages: Option<&Messages>,
        config: Option<&PartialConfig>,
    ) -> Result<Value> {
        self.run(TraversalMode::StopAtFirst, data, schema.into(), messages, config)
    }

    /// Run every rule on every field and collect all failures.
    pub fn validate_all<'s>(
        &self,
        data: &Value,
        schema: impl Into<Cow<'s, SchemaInput>>,
        messages: Option<&Messages>,
        config: Option<&PartialConfig>,
    ) -> Result<Value> {
        self.run(TraversalMode::CollectAll, data, schema.into(), messages, config)
    }

    /// Collect the first failure of each field, continuing across fields.
    pub fn validate_each<'s>(
        &self,
        data: &Value,
        schema: impl Into<Cow<'s, SchemaInput>>,
        messages: Option<&Messages>,
        config: Option<&PartialConfig>,
    ) -> Result<Value> {
        self.run(TraversalMode::StopPerField, data, schema.into(), messages, config)
    }

    fn run(
        &self,
        mode: TraversalMode,
        data: &Value,
        schema: Cow<'_, SchemaInput>,
        messages: Option<&Messages>,
        config: Option<&PartialConfig>,
    ) -> Result<Value> {
        let config = self.config.effective(config);
        let _span = debug_span!(
            "validate",
            mode = mode.as_str(),
            cache_key = config.cache_key().unwrap_or("-"),
        )
        .entered();

        let compiled = self.resolve(&config, &schema, messages)?;
        let output = compiled.exec(
            data,
            config.formatter.build(),
            &config.exec_options(),
            mode,
            config.custom_error_collector.as_ref(),
        )?;
        Ok(output)
    }

    /// Compiled validator for this call, from the cache when a non-empty key
    /// is set.
    ///
    /// On a hit the schema and messages of this call are ignored.
    fn resolve(
        &self,
        config: &ValidatorConfig,
        schema: &SchemaInput,
        messages: Option<&Messages>,
    ) -> Result<Arc<CompiledValidator>> {
        let empty = Messages::new();
        let messages = messages.unwrap_or(&empty);

        let compiled = match config.cache_key() {
            Some(key) => self
                .cache
                .get_or_try_insert_with(key, || self.compiler.compile(schema, messages))?,
            None => {
                debug!("No cache key, compiling schema");
                Arc::new(self.compiler.compile(schema, messages)?)
            }
        };
        Ok(compiled)
    }

    /// Layer `partial` over this validator's defaults
    pub fn configure(&self, partial: &PartialConfig) {
        self.config.configure(partial);
    }

    /// Current defaults
    pub fn defaults(&self) -> Arc<ValidatorConfig> {
        self.config.snapshot()
    }

    /// Defaults before any `configure` call
    pub fn factory_defaults(&self) -> Arc<ValidatorConfig> {
        self.config.factory_defaults()
    }

    pub fn reset_defaults(&self) {
        self.config.reset();
    }

    /// Compiled schema cache shared by every call on this validator
    pub fn cache(&self) -> &CacheManager<CompiledValidator, CompileError> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

static GLOBAL: OnceLock<Validator> = OnceLock::new();

/// Process-wide validator used by the free functions
pub fn global() -> &'static Validator {
    GLOBAL.get_or_init(Validator::new)
}

/// [`Validator::validate`] on the process-wide validator
pub fn validate<'s>(
    data: &Value,
    schema: impl Into<Cow<'s, SchemaInput>>,
    messages: Option<&Messages>,
    config: Option<&PartialConfig>,
) -> Result<Value> {
    global().validate(data, schema, messages, config)
}

/// [`Validator::validate_all`] on the process-wide validator
pub fn validate_all<'s>(
    data: &Value,
    schema: impl Into<Cow<'s, SchemaInput>>,
    messages: Option<&Messages>,
    config: Option<&PartialConfig>,
) -> Result<Value> {
    global().validate_all(data, schema, messages, config)
}

/// [`Validator::validate_each`] on the process-wide validator
pub fn validate_each<'s>(
    data: &Value,
    schema: impl Into<Cow<'s, SchemaInput>>,
    messages: Option<&Messages>,
    config: Option<&PartialConfig>,
) -> Result<Value> {
    global().validate_each(data, schema, messages, config)
}

/// Change the process-wide defaults.
///
/// Intended for startup, before validation traffic begins.
pub fn configure(partial: &PartialConfig) {
    global().configure(partial);
}

pub fn defaults() -> Arc<ValidatorConfig> {
    global().defaults()
}

pub fn factory_defaults() -> Arc<ValidatorConfig> {
    global().factory_defaults()
}

pub fn reset_defaults() {
    global().reset_defaults();
}
