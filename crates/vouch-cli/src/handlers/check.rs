//! Check command handler

use super::{load_messages, load_schema};
use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use serde_json::json;
use vouch_core::{Compiler, Messages, RuleCompiler};

/// Compile a schema and report what it declares
pub fn handle_check(args: CheckArgs, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Compiling schema: {}", args.schema.display()))?;

    let schema = load_schema(&args.schema)?;
    let messages = match args.messages.as_deref() {
        Some(path) => load_messages(path)?,
        None => Messages::new(),
    };

    let compiled = RuleCompiler::default().compile(&schema, &messages)?;
    let nodes = compiled.nodes();

    if !output.is_human() {
        let fields: Vec<_> = nodes
            .iter()
            .map(|node| {
                json!({
                    "field": node.pattern,
                    "rules": node.rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        return output.data(&json!({
            "schema": args.schema.display().to_string(),
            "valid": true,
            "fields": fields,
            "rules": compiled.rule_count(),
        }));
    }

    output.success(&format!(
        "✓ Schema compiled: {} field(s), {} rule(s)",
        nodes.len(),
        compiled.rule_count()
    ))?;

    if args.detailed {
        output.section("Fields")?;
        let rows = nodes
            .iter()
            .map(|node| {
                let rules = node
                    .rules
                    .iter()
                    .map(|rule| {
                        if rule.args.is_empty() {
                            return rule.name.clone();
                        }
                        let args = rule
                            .args
                            .iter()
                            .map(|arg| arg.as_str().map_or_else(|| arg.to_string(), str::to_string))
                            .collect::<Vec<_>>();
                        format!("{}:{}", rule.name, args.join(","))
                    })
                    .collect::<Vec<_>>()
                    .join("|");
                vec![node.pattern.clone(), rules]
            })
            .collect();
        output.table(&["Field", "Rules"], rows)?;
    }

    Ok(())
}
