//! Validate command handler

use super::{load_document, load_messages, load_schema};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{FileReport, OutputWriter};
use std::path::Path;
use tracing::{debug, info};
use vouch_core::{Messages, PartialConfig, SchemaInput, TraversalMode, Validator};

/// Handle the validate command
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let settings = config.run_settings(&args)?;
    let timer = Timer::with_details("validate", &args.schema.display().to_string());

    if args.remove_additional && !args.show_data {
        output.warning("--remove-additional only changes the data printed with --show-data")?;
    }

    let schema = load_schema(&args.schema)?;
    let messages = args.messages.as_deref().map(load_messages).transpose()?;

    let validator = Validator::new();
    validator.configure(&config.validator_defaults()?);

    // Every data file shares one compiled schema
    let overrides = settings
        .overrides
        .cache_key(args.schema.display().to_string());

    info!(
        schema = %args.schema.display(),
        files = args.data.len(),
        mode = settings.mode.as_str(),
        "Validating data files"
    );

    let progress = output.progress_bar(args.data.len() as u64, "Validating");
    let mut reports = Vec::with_capacity(args.data.len());

    for path in &args.data {
        if let Some(pb) = &progress {
            pb.set_message(path.display().to_string());
        }

        let report = validate_file(
            &validator,
            path,
            &schema,
            messages.as_ref(),
            &overrides,
            settings.mode,
            args.show_data,
        )?;
        reports.push(report);

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let stats = validator.cache_stats();
    debug!(
        entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        "Schema cache statistics"
    );

    let total = reports.len();
    let failed = reports.iter().filter(|r| !r.valid).count();
    let elapsed = timer.finish();

    if output.is_human() {
        for report in &reports {
            output.file_report(report)?;
        }
        if failed == 0 {
            output.success(&format!("All {} file(s) passed", total))?;
        }
        output.info(&format!("Checked {} file(s) in {}ms", total, elapsed.as_millis()))?;
    } else {
        output.data(&reports)?;
    }

    if failed > 0 {
        return Err(Error::ValidationFailed { failed, total });
    }
    Ok(())
}

fn validate_file(
    validator: &Validator,
    path: &Path,
    schema: &SchemaInput,
    messages: Option<&Messages>,
    overrides: &PartialConfig,
    mode: TraversalMode,
    show_data: bool,
) -> Result<FileReport> {
    let _timer = Timer::with_details("validate_file", &path.display().to_string());
    let data = load_document(path)?;

    let result = match mode {
        TraversalMode::StopAtFirst => validator.validate(&data, schema, messages, Some(overrides)),
        TraversalMode::CollectAll => validator.validate_all(&data, schema, messages, Some(overrides)),
        TraversalMode::StopPerField => validator.validate_each(&data, schema, messages, Some(overrides)),
    };

    match result {
        Ok(validated) => {
            debug!(file = %path.display(), "Data file passed");
            Ok(FileReport::passed(path, show_data.then_some(validated)))
        }
        Err(vouch_core::Error::Validation(errors)) => {
            debug!(file = %path.display(), errors = errors.len(), "Data file failed");
            Ok(FileReport::failed(path, errors))
        }
        Err(vouch_core::Error::Compile(err)) => Err(Error::Schema(err)),
    }
}
