//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{is_yaml, Config};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::fs;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Paths => handle_config_paths(output),
    }
}

fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    output.writeln(content.trim_end())
}

fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?,
    };

    let extension = path.extension().and_then(|s| s.to_str());
    if !matches!(extension, Some("yaml") | Some("yml") | Some("json")) {
        return Err(Error::invalid_args(format!(
            "{} must end in .yaml, .yml or .json",
            path.display()
        )));
    }

    if path.exists() && !args.force {
        return Err(Error::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let defaults = Config::default();
    let content = if is_yaml(&path) {
        serde_yaml::to_string(&defaults)?
    } else {
        serde_json::to_string_pretty(&defaults)?
    };
    fs::write(&path, content)?;

    output.success(&format!("✓ Created config at {}", path.display()))
}

fn handle_config_paths(output: &mut OutputWriter) -> Result<()> {
    let rows = Config::default_config_paths()
        .into_iter()
        .map(|path| {
            let status = if path.exists() { "found" } else { "-" };
            vec![path.display().to_string(), status.to_string()]
        })
        .collect();
    output.table(&["Path", "Status"], rows)
}
