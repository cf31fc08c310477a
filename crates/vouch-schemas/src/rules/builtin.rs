//! Built-in rules
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use crate::rules::{as_number, as_text, Rule, RuleContext, RuleRegistry};
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHA_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHA_NUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is valid")
    })
}

fn alpha_regex() -> &'static Regex {
    ALPHA_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("alpha pattern is valid"))
}

fn alpha_numeric_regex() -> &'static Regex {
    ALPHA_NUMERIC_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("alpha_numeric pattern is valid"))
}

/// Register every built-in rule
pub fn register_all(registry: &mut RuleRegistry) {
    registry
        .register(Required)
        .register(StringRule)
        .register(NumberRule)
        .register(IntegerRule)
        .register(BooleanRule)
        .register(ObjectRule)
        .register(ArrayRule)
        .register(Email)
        .register(Alpha)
        .register(AlphaNumeric)
        .register(Above)
        .register(Under)
        .register(Min)
        .register(Max)
        .register(Range)
        .register(In)
        .register(NotIn)
        .register(StartsWith)
        .register(EndsWith)
        .register(Includes)
        .register(RegexRule::default())
        .register(Confirmed);
}

fn expect_args(args: &[Value], count: usize) -> Result<(), String> {
    if args.len() == count {
        Ok(())
    } else {
        Err(format!("expected {} argument(s), got {}", count, args.len()))
    }
}

fn numeric_args(args: Vec<Value>, count: usize) -> Result<Vec<Value>, String> {
    expect_args(&args, count)?;
    args.iter()
        .map(|arg| {
            as_number(arg)
                .and_then(number_value)
                .ok_or_else(|| format!("'{}' is not a number", arg))
        })
        .collect()
}

/// Integral arguments stay integers so messages render `4`, not `4.0`
fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

fn length_arg(args: Vec<Value>) -> Result<Vec<Value>, String> {
    expect_args(&args, 1)?;
    match as_number(&args[0]) {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(vec![Value::from(n as u64)]),
        _ => Err(format!("'{}' is not a non-negative integer", args[0])),
    }
}

fn text_args(args: Vec<Value>, at_least: usize) -> Result<Vec<Value>, String> {
    if args.len() < at_least {
        return Err(format!(
            "expected at least {} argument(s), got {}",
            at_least,
            args.len()
        ));
    }
    args.iter()
        .map(|arg| {
            as_text(arg)
                .map(Value::String)
                .ok_or_else(|| format!("'{}' is not a scalar", arg))
        })
        .collect()
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn number_arg(ctx: &RuleContext<'_>, index: usize) -> Option<f64> {
    ctx.arg(index).and_then(Value::as_f64)
}

fn text_arg<'a>(ctx: &RuleContext<'a>, index: usize) -> Option<&'a str> {
    ctx.arg(index).and_then(Value::as_str)
}

/// Value must be present, not `null` and not an empty string
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match ctx.value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    fn runs_on_absent(&self) -> bool {
        true
    }
}

pub struct StringRule;

impl Rule for StringRule {
    fn name(&self) -> &'static str {
        "string"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        matches!(ctx.value, Some(Value::String(_)))
    }
}

/// JSON numbers and numeric strings
pub struct NumberRule;

impl Rule for NumberRule {
    fn name(&self) -> &'static str {
        "number"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.value.and_then(as_number).is_some()
    }
}

pub struct IntegerRule;

impl Rule for IntegerRule {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.value
            .and_then(as_number)
            .is_some_and(|n| n.fract() == 0.0)
    }
}

/// `true`/`false`, `0`/`1`, and their string forms
pub struct BooleanRule;

impl Rule for BooleanRule {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match ctx.value {
            Some(Value::Bool(_)) => true,
            Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n <= 1),
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "false" | "0" | "1"),
            _ => false,
        }
    }
}

pub struct ObjectRule;

impl Rule for ObjectRule {
    fn name(&self) -> &'static str {
        "object"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        matches!(ctx.value, Some(Value::Object(_)))
    }
}

pub struct ArrayRule;

impl Rule for ArrayRule {
    fn name(&self) -> &'static str {
        "array"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        matches!(ctx.value, Some(Value::Array(_)))
    }
}

pub struct Email;

impl Rule for Email {
    fn name(&self) -> &'static str {
        "email"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.value
            .and_then(Value::as_str)
            .is_some_and(|s| email_regex().is_match(s))
    }
}

pub struct Alpha;

impl Rule for Alpha {
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.value
            .and_then(Value::as_str)
            .is_some_and(|s| alpha_regex().is_match(s))
    }
}

pub struct AlphaNumeric;

impl Rule for AlphaNumeric {
    fn name(&self) -> &'static str {
        "alpha_numeric"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.value
            .and_then(as_text)
            .is_some_and(|s| alpha_numeric_regex().is_match(&s))
    }
}

/// Numeric value strictly greater than the argument
pub struct Above;

impl Rule for Above {
    fn name(&self) -> &'static str {
        "above"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        numeric_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match (ctx.value.and_then(as_number), number_arg(ctx, 0)) {
            (Some(value), Some(limit)) => value > limit,
            _ => false,
        }
    }
}

/// Numeric value strictly lower than the argument
pub struct Under;

impl Rule for Under {
    fn name(&self) -> &'static str {
        "under"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        numeric_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match (ctx.value.and_then(as_number), number_arg(ctx, 0)) {
            (Some(value), Some(limit)) => value < limit,
            _ => false,
        }
    }
}

/// Minimum length of a string or array
pub struct Min;

impl Rule for Min {
    fn name(&self) -> &'static str {
        "min"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        length_arg(args)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        let limit = ctx.arg(0).and_then(Value::as_u64);
        match (ctx.value.and_then(length_of), limit) {
            (Some(len), Some(limit)) => len as u64 >= limit,
            _ => false,
        }
    }
}

/// Maximum length of a string or array
pub struct Max;

impl Rule for Max {
    fn name(&self) -> &'static str {
        "max"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        length_arg(args)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        let limit = ctx.arg(0).and_then(Value::as_u64);
        match (ctx.value.and_then(length_of), limit) {
            (Some(len), Some(limit)) => len as u64 <= limit,
            _ => false,
        }
    }
}

/// Inclusive numeric range
pub struct Range;

impl Rule for Range {
    fn name(&self) -> &'static str {
        "range"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        let args = numeric_args(args, 2)?;
        match (args[0].as_f64(), args[1].as_f64()) {
            (Some(lower), Some(upper)) if lower <= upper => Ok(args),
            _ => Err("lower bound must not exceed upper bound".to_string()),
        }
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match (
            ctx.value.and_then(as_number),
            number_arg(ctx, 0),
            number_arg(ctx, 1),
        ) {
            (Some(value), Some(lower), Some(upper)) => value >= lower && value <= upper,
            _ => false,
        }
    }
}

pub struct In;

impl Rule for In {
    fn name(&self) -> &'static str {
        "in"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        text_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.value
            .and_then(as_text)
            .is_some_and(|text| ctx.args.iter().any(|arg| arg.as_str() == Some(text.as_str())))
    }
}

pub struct NotIn;

impl Rule for NotIn {
    fn name(&self) -> &'static str {
        "not_in"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        text_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match ctx.value.and_then(as_text) {
            Some(text) => !ctx.args.iter().any(|arg| arg.as_str() == Some(text.as_str())),
            None => true,
        }
    }
}

pub struct StartsWith;

impl Rule for StartsWith {
    fn name(&self) -> &'static str {
        "starts_with"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        expect_args(&args, 1)?;
        text_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match (ctx.value.and_then(as_text), text_arg(ctx, 0)) {
            (Some(text), Some(prefix)) => text.starts_with(prefix),
            _ => false,
        }
    }
}

pub struct EndsWith;

impl Rule for EndsWith {
    fn name(&self) -> &'static str {
        "ends_with"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        expect_args(&args, 1)?;
        text_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match (ctx.value.and_then(as_text), text_arg(ctx, 0)) {
            (Some(text), Some(suffix)) => text.ends_with(suffix),
            _ => false,
        }
    }
}

/// String containing the argument, or array containing it as an element
pub struct Includes;

impl Rule for Includes {
    fn name(&self) -> &'static str {
        "includes"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        expect_args(&args, 1)?;
        text_args(args, 1)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        let Some(needle) = text_arg(ctx, 0) else {
            return false;
        };
        match ctx.value {
            Some(Value::String(s)) => s.contains(needle),
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| as_text(item).as_deref() == Some(needle)),
            _ => false,
        }
    }
}

/// Pattern match. Patterns are checked at compile time and kept compiled
/// for the lifetime of the registry; matching only takes a read lock.
#[derive(Default)]
pub struct RegexRule {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl RegexRule {
    fn is_match(&self, pattern: &str, text: &str) -> bool {
        if let Some(regex) = self.compiled.read().get(pattern) {
            return regex.is_match(text);
        }
        // Only reached for patterns that bypassed `compile`
        match Regex::new(pattern) {
            Ok(regex) => {
                let matched = regex.is_match(text);
                self.compiled.write().insert(pattern.to_string(), regex);
                matched
            }
            Err(_) => false,
        }
    }
}

impl Rule for RegexRule {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        expect_args(&args, 1)?;
        let pattern = args[0]
            .as_str()
            .ok_or_else(|| "pattern must be a string".to_string())?;
        let regex = Regex::new(pattern).map_err(|e| e.to_string())?;
        self.compiled.write().insert(pattern.to_string(), regex);
        Ok(args)
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        match (ctx.value.and_then(as_text), text_arg(ctx, 0)) {
            (Some(text), Some(pattern)) => self.is_match(pattern, &text),
            _ => false,
        }
    }
}

/// Value must equal the sibling `<field>_confirmation`
pub struct Confirmed;

impl Rule for Confirmed {
    fn name(&self) -> &'static str {
        "confirmed"
    }

    fn validate(&self, ctx: &RuleContext<'_>) -> bool {
        let confirmation = format!("{}_confirmation", ctx.key);
        match (ctx.value, ctx.sibling(&confirmation)) {
            (Some(value), Some(other)) => value == other,
            _ => false,
        }
    }
}
