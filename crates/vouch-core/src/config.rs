//! Validator configuration
//!
//! [`ValidatorConfig`] is the effective configuration of one call. It is
//! built by overlaying a [`PartialConfig`] on the current defaults, field
//! by field. Defaults live in a [`ConfigStore`] which publishes immutable
//! snapshots, so a call always sees one consistent configuration.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use vouch_schemas::{ErrorCollector, ExecOptions, FormatterFactory};

/// Effective configuration for a single validation call
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    /// Builds the formatter for each execution
    pub formatter: FormatterFactory,
    /// Cache key; `None` or `""` compiles the schema on every call
    pub cache_key: Option<String>,
    /// Strip fields not declared in the schema from the returned data
    pub remove_additional: bool,
    /// Owns message construction for every failure when set
    pub custom_error_collector: Option<ErrorCollector>,
    /// Treat empty strings as present for non-presence rules
    pub existy_strict: bool,
}

impl ValidatorConfig {
    /// Overlay `partial`; fields it sets win, the rest are kept
    pub fn merge(&self, partial: &PartialConfig) -> Self {
        Self {
            formatter: partial
                .formatter
                .clone()
                .unwrap_or_else(|| self.formatter.clone()),
            cache_key: match &partial.cache_key {
                Some(key) => key.clone(),
                None => self.cache_key.clone(),
            },
            remove_additional: partial.remove_additional.unwrap_or(self.remove_additional),
            custom_error_collector: match &partial.custom_error_collector {
                Some(collector) => collector.clone(),
                None => self.custom_error_collector.clone(),
            },
            existy_strict: partial.existy_strict.unwrap_or(self.existy_strict),
        }
    }

    /// Key to cache the compiled schema under; an empty key counts as unset
    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Flags handed to the executor
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            remove_additional: self.remove_additional,
            existy_strict: self.existy_strict,
        }
    }
}

/// Call-site overrides; unset fields fall through to the defaults.
///
/// `cache_key` and `custom_error_collector` are doubly optional so a call
/// can clear a key or collector set in the defaults.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub formatter: Option<FormatterFactory>,
    pub cache_key: Option<Option<String>>,
    pub remove_additional: Option<bool>,
    pub custom_error_collector: Option<Option<ErrorCollector>>,
    pub existy_strict: Option<bool>,
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formatter(mut self, formatter: FormatterFactory) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Cache the compiled schema under `key`
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(Some(key.into()));
        self
    }

    /// Compile on every call even if the defaults carry a key
    pub fn no_cache(mut self) -> Self {
        self.cache_key = Some(None);
        self
    }

    pub fn remove_additional(mut self, remove: bool) -> Self {
        self.remove_additional = Some(remove);
        self
    }

    pub fn custom_error_collector(mut self, collector: ErrorCollector) -> Self {
        self.custom_error_collector = Some(Some(collector));
        self
    }

    /// Use the formatter even if the defaults carry a collector
    pub fn no_error_collector(mut self) -> Self {
        self.custom_error_collector = Some(None);
        self
    }

    pub fn existy_strict(mut self, strict: bool) -> Self {
        self.existy_strict = Some(strict);
        self
    }

    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.formatter.is_none()
            && self.cache_key.is_none()
            && self.remove_additional.is_none()
            && self.custom_error_collector.is_none()
            && self.existy_strict.is_none()
    }
}

/// Process-wide defaults with a frozen factory snapshot.
///
/// [`ConfigStore::configure`] publishes a new snapshot instead of mutating
/// the current one. It is meant for startup; calls running concurrently
/// with it see either the old or the new defaults.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<ValidatorConfig>>,
    factory: Arc<ValidatorConfig>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl ConfigStore {
    /// Create a store whose factory defaults are `defaults`
    pub fn new(defaults: ValidatorConfig) -> Self {
        let factory = Arc::new(defaults);
        Self {
            current: RwLock::new(Arc::clone(&factory)),
            factory,
        }
    }

    /// Layer `partial` over the current defaults
    pub fn configure(&self, partial: &PartialConfig) {
        let mut current = self.current.write();
        let next = current.merge(partial);
        debug!(
            formatter = next.formatter.name(),
            cache_key = ?next.cache_key,
            remove_additional = next.remove_additional,
            custom_collector = next.custom_error_collector.is_some(),
            "Updated validator defaults"
        );
        *current = Arc::new(next);
    }

    /// Current defaults
    pub fn snapshot(&self) -> Arc<ValidatorConfig> {
        self.current.read().clone()
    }

    /// Defaults as they were before any `configure` call
    pub fn factory_defaults(&self) -> Arc<ValidatorConfig> {
        Arc::clone(&self.factory)
    }

    /// Restore the factory defaults
    pub fn reset(&self) {
        *self.current.write() = Arc::clone(&self.factory);
    }

    /// Effective configuration for one call
    pub fn effective(&self, partial: Option<&PartialConfig>) -> Arc<ValidatorConfig> {
        let defaults = self.snapshot();
        match partial {
            Some(partial) if !partial.is_empty() => Arc::new(defaults.merge(partial)),
            _ => defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.formatter.name(), "vanilla");
        assert!(config.cache_key.is_none());
        assert!(!config.remove_additional);
        assert!(config.custom_error_collector.is_none());
        assert!(!config.existy_strict);
    }

    #[test]
    fn test_merge_call_site_wins_field_by_field() {
        let defaults = ValidatorConfig {
            cache_key: Some("users".to_string()),
            remove_additional: true,
            ..ValidatorConfig::default()
        };
        let merged = defaults.merge(&PartialConfig::new().formatter(FormatterFactory::json_api()));

        assert_eq!(merged.formatter.name(), "jsonapi");
        assert_eq!(merged.cache_key.as_deref(), Some("users"));
        assert_eq!(merged.cache_key(), Some("users"));
        assert!(merged.remove_additional);

        let cleared = defaults.merge(&PartialConfig::new().no_cache().remove_additional(false));
        assert!(cleared.cache_key.is_none());
        assert!(!cleared.remove_additional);
    }

    #[test]
    fn test_empty_cache_key_is_unset() {
        let config = ValidatorConfig::default().merge(&PartialConfig::new().cache_key(""));
        assert_eq!(config.cache_key(), None);
    }

    #[test]
    fn test_configure_layers_and_resets() {
        let store = ConfigStore::default();
        store.configure(&PartialConfig::new().remove_additional(true));
        store.configure(&PartialConfig::new().cache_key("posts"));

        let current = store.snapshot();
        assert!(current.remove_additional);
        assert_eq!(current.cache_key.as_deref(), Some("posts"));
        assert!(!store.factory_defaults().remove_additional);

        store.reset();
        assert!(store.snapshot().cache_key.is_none());
        assert!(!store.snapshot().remove_additional);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let store = ConfigStore::default();
        let before = store.snapshot();
        store.configure(&PartialConfig::new().existy_strict(true));

        assert!(!before.existy_strict);
        assert!(store.snapshot().existy_strict);
    }

    #[test]
    fn test_effective_without_overrides_reuses_snapshot() {
        let store = ConfigStore::default();
        let snapshot = store.snapshot();
        assert!(Arc::ptr_eq(&snapshot, &store.effective(None)));
        assert!(Arc::ptr_eq(&snapshot, &store.effective(Some(&PartialConfig::new()))));
    }
}
