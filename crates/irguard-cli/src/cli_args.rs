use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "irguard",
    about = "Validate, correct once, and run machine-generated IR test documents",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "IRGUARD_CONFIG",
        help = "TOML config with default_tolerance, mismatch_ratio, schema_path, auto_correct."
    )]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Check every case against the target and print mismatches.
    Validate(ValidateArgs),
    /// Apply the single correction pass and write the corrected document.
    Correct(CorrectArgs),
    /// Full cycle: validate, correct once, run checks, classify.
    Run(RunArgs),
    /// Write a run manifest with input digests and platform details.
    Manifest(ManifestArgs),
}

#[derive(Debug, Args)]
pub(crate) struct TargetArgs {
    #[arg(long, help = "Path to the IR JSON document.")]
    pub(crate) ir: PathBuf,

    #[arg(
        long = "module",
        help = "Qualifier override used instead of the document's target qualifier."
    )]
    pub(crate) module: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    #[command(flatten)]
    pub(crate) target: TargetArgs,
}

#[derive(Debug, Args)]
pub(crate) struct CorrectArgs {
    #[command(flatten)]
    pub(crate) target: TargetArgs,

    #[arg(
        long,
        help = "Where to write the corrected document. Defaults to --ir. Skipped when nothing needs correcting."
    )]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) target: TargetArgs,

    #[arg(long, help = "Where to write the run report JSON.")]
    pub(crate) report: PathBuf,

    #[arg(long, help = "Where to write the corrected document. Defaults to --ir.")]
    pub(crate) out: Option<PathBuf>,

    #[arg(long, help = "Execute collected checks immediately.")]
    pub(crate) run: bool,

    #[arg(long = "no-correct", help = "Skip the correction pass.")]
    pub(crate) no_correct: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ManifestArgs {
    #[arg(long, help = "Path to the IR JSON document.")]
    pub(crate) ir: PathBuf,

    #[arg(long, help = "Where to write the manifest JSON.")]
    pub(crate) output: PathBuf,

    #[arg(long, help = "Run report to include in the manifest digests.")]
    pub(crate) report: Option<PathBuf>,
}
