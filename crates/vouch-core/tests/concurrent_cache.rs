//! Concurrent validation sharing one validator and one cache key

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use vouch_core::{
    CompileError, CompiledValidator, Compiler, Messages, PartialConfig, RuleCompiler, SchemaInput,
    Validator,
};

/// Slow compiler so concurrent callers overlap on the same miss
struct SlowCompiler {
    inner: RuleCompiler,
    compiles: Arc<AtomicUsize>,
}

impl Compiler for SlowCompiler {
    fn compile(&self, schema: &SchemaInput, messages: &Messages) -> Result<CompiledValidator, CompileError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        self.inner.compile(schema, messages)
    }
}

#[test]
fn test_concurrent_misses_compile_once() {
    let compiles = Arc::new(AtomicUsize::new(0));
    let validator = Arc::new(Validator::with_compiler(SlowCompiler {
        inner: RuleCompiler::default(),
        compiles: Arc::clone(&compiles),
    }));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let validator = Arc::clone(&validator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let schema = SchemaInput::try_from(json!({"email": "required|email"})).unwrap();
                let config = PartialConfig::new().cache_key("contact");
                let data = if i % 2 == 0 {
                    json!({"email": "virk@adonisjs.com"})
                } else {
                    json!({"email": "nope"})
                };
                barrier.wait();
                validator.validate_all(&data, schema, None, Some(&config))
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(result.is_ok(), i % 2 == 0);
    }

    assert_eq!(compiles.load(Ordering::SeqCst), 1);
    let stats = validator.cache_stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits + stats.coalesced, 15);
}

#[test]
fn test_concurrent_compile_failure_reaches_every_waiter() {
    let compiles = Arc::new(AtomicUsize::new(0));
    let validator = Arc::new(Validator::with_compiler(SlowCompiler {
        inner: RuleCompiler::default(),
        compiles: Arc::clone(&compiles),
    }));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let validator = Arc::clone(&validator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let schema = SchemaInput::try_from(json!({"email": "required|shiny"})).unwrap();
                let config = PartialConfig::new().cache_key("broken");
                barrier.wait();
                validator.validate(&json!({}), schema, None, Some(&config))
            })
        })
        .collect();

    for handle in handles {
        let err = handle.join().unwrap().unwrap_err();
        assert_eq!(err.compile_error(), Some(&CompileError::unknown_rule("email", "shiny")));
    }
    assert!(!validator.cache().contains("broken"));
    assert!(compiles.load(Ordering::SeqCst) >= 1);
}
