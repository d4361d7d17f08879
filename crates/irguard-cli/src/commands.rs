use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use irguard_contract::SpecDocument;
use irguard_core::write_json_pretty_atomic;
use irguard_runtime::{
    build_run_manifest, default_registry, load_config, CycleOptions, CycleOutcome,
    IrGuardConfig, TargetRegistry, ValidationCycle,
};
use serde_json::{json, Value as JsonValue};

use crate::cli_args::{CliCommand, CorrectArgs, ManifestArgs, RunArgs, TargetArgs, ValidateArgs};

const NOT_EXECUTED_LABEL: &str = "NOT_EXECUTED";

pub(crate) fn dispatch(config_path: Option<&Path>, command: &CliCommand) -> Result<()> {
    let config = resolve_config(config_path)?;
    let registry = default_registry();
    match command {
        CliCommand::Validate(args) => execute_validate(&registry, &config, args),
        CliCommand::Correct(args) => execute_correct(&registry, &config, args),
        CliCommand::Run(args) => execute_run(&registry, &config, args),
        CliCommand::Manifest(args) => execute_manifest(&registry, &config, config_path, args),
    }
}

fn resolve_config(config_path: Option<&Path>) -> Result<IrGuardConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => Ok(IrGuardConfig::default()),
    }
}

fn load_json_schema(config: &IrGuardConfig) -> Result<Option<JsonValue>> {
    let Some(path) = config.schema_path.as_ref() else {
        return Ok(None);
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read JSON schema '{}'", path.display()))?;
    let schema = serde_json::from_str::<JsonValue>(&raw)
        .with_context(|| format!("failed to parse JSON schema '{}'", path.display()))?;
    Ok(Some(schema))
}

fn read_ir(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read IR document '{}'", path.display()))
}

fn new_cycle<'a>(
    registry: &'a TargetRegistry,
    config: &'a IrGuardConfig,
    target: &TargetArgs,
) -> Result<ValidationCycle<'a>> {
    Ok(ValidationCycle::new(registry, config)
        .with_qualifier_override(target.module.as_deref())
        .with_json_schema(load_json_schema(config)?))
}

fn print_json(payload: &JsonValue) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(payload).context("failed to render command output")?;
    println!("{rendered}");
    Ok(())
}

fn write_document(document: &SpecDocument, path: &Path) -> Result<()> {
    write_json_pretty_atomic(path, &document.to_json())
        .with_context(|| format!("failed to write corrected IR '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "wrote corrected IR document");
    Ok(())
}

fn output_path(ir: &Path, out: Option<&PathBuf>) -> PathBuf {
    out.cloned().unwrap_or_else(|| ir.to_path_buf())
}

fn execute_validate(
    registry: &TargetRegistry,
    config: &IrGuardConfig,
    args: &ValidateArgs,
) -> Result<()> {
    let cycle = new_cycle(registry, config, &args.target)?;
    let raw = read_ir(&args.target.ir)?;
    let document = cycle.load(&raw)?;
    let target = cycle.resolve(&document)?;
    let mismatches = cycle.validate(&document, &target);
    print_json(&json!({
        "target": document.target,
        "cases": document.cases.len(),
        "mismatches": mismatches.iter().map(|mismatch| mismatch.to_json()).collect::<Vec<_>>(),
    }))
}

fn execute_correct(
    registry: &TargetRegistry,
    config: &IrGuardConfig,
    args: &CorrectArgs,
) -> Result<()> {
    let mut cycle = new_cycle(registry, config, &args.target)?;
    let raw = read_ir(&args.target.ir)?;
    let outcome = cycle.execute(
        &raw,
        CycleOptions {
            correct: true,
            run_checks: false,
        },
    )?;
    let written = if outcome.correction.is_some() {
        let destination = output_path(&args.target.ir, args.out.as_ref());
        write_document(&outcome.document, &destination)?;
        Some(destination.display().to_string())
    } else {
        None
    };
    print_json(&json!({
        "target": outcome.document.target,
        "mismatches": outcome.initial_mismatches.len(),
        "correction": correction_json(&outcome),
        "output": written,
    }))
}

fn execute_run(registry: &TargetRegistry, config: &IrGuardConfig, args: &RunArgs) -> Result<()> {
    let mut cycle = new_cycle(registry, config, &args.target)?;
    let raw = read_ir(&args.target.ir)?;
    let options = CycleOptions {
        correct: config.auto_correct && !args.no_correct,
        run_checks: args.run,
    };
    let outcome = cycle.execute(&raw, options)?;

    if outcome.correction.is_some() {
        let destination = output_path(&args.target.ir, args.out.as_ref());
        write_document(&outcome.document, &destination)?;
    }

    let label = outcome
        .outcome
        .map_or(NOT_EXECUTED_LABEL, |kind| kind.as_str());
    let mut report = serde_json::to_value(&outcome.report).context("failed to encode run report")?;
    if let Some(object) = report.as_object_mut() {
        object.insert("outcome".to_string(), json!(label));
        object.insert(
            "diagnosis".to_string(),
            json!(outcome.outcome.map(|kind| kind.diagnosis())),
        );
        object.insert("correction".to_string(), correction_json(&outcome));
    }
    write_json_pretty_atomic(&args.report, &report)
        .with_context(|| format!("failed to write run report '{}'", args.report.display()))?;
    println!("{label}");
    Ok(())
}

fn execute_manifest(
    registry: &TargetRegistry,
    config: &IrGuardConfig,
    config_path: Option<&Path>,
    args: &ManifestArgs,
) -> Result<()> {
    let target_args = TargetArgs {
        ir: args.ir.clone(),
        module: None,
    };
    let cycle = new_cycle(registry, config, &target_args)?;
    let document = cycle.load(&read_ir(&args.ir)?)?;
    let manifest = build_run_manifest(&document, &args.ir, config_path, args.report.as_deref())?;
    write_json_pretty_atomic(&args.output, &manifest)
        .with_context(|| format!("failed to write run manifest '{}'", args.output.display()))?;
    println!("{}", args.output.display());
    Ok(())
}

fn correction_json(outcome: &CycleOutcome) -> JsonValue {
    outcome
        .correction
        .as_ref()
        .map_or(JsonValue::Null, |summary| summary.to_json())
}
