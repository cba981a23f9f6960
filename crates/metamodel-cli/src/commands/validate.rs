//! `metamodel validate`: build everything and report failures.

use serde::Serialize;
use tracing::info;

use metamodel_core::application::{ApplicationError, DeploymentMode};
use metamodel_core::domain::{ValidationFailure, ValidationReport};
use metamodel_core::error::MetamodelError;

use crate::{
    cli::ValidateArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    service,
};

/// JSON shape of a validation run.
#[derive(Debug, Serialize)]
struct ValidationOutcome<'a> {
    mode: DeploymentMode,
    passed: bool,
    errors: usize,
    warnings: usize,
    failures: &'a [ValidationFailure],
}

pub fn execute(args: ValidateArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let mode = args.mode.map(DeploymentMode::from).unwrap_or(config.validation.mode);
    let service = service::open(config)?;
    info!(%mode, "validating metamodel");

    match service.build(mode) {
        Ok(report) => {
            print_report(&output, mode, &report, true)?;
            Ok(())
        }
        Err(MetamodelError::Application(aborted @ ApplicationError::ValidationAborted { .. })) => {
            // The loader keeps the failures of the aborted build.
            print_report(&output, mode, &service.loader().report(), false)?;
            Err(CliError::Core(aborted.into()))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(
    output: &OutputManager,
    mode: DeploymentMode,
    report: &ValidationReport,
    passed: bool,
) -> CliResult<()> {
    if output.is_json() {
        return output.json(&ValidationOutcome {
            mode,
            passed,
            errors: report.error_count(),
            warnings: report.warning_count(),
            failures: report.failures(),
        });
    }

    for failure in report.errors() {
        output.error(&failure.to_string())?;
    }
    for failure in report.warnings() {
        output.warning(&failure.to_string())?;
    }

    let summary = format!(
        "{} error(s), {} warning(s) in {} mode",
        report.error_count(),
        report.warning_count(),
        mode
    );
    if report.is_clean() {
        output.success(&format!("Metamodel is valid ({summary})"))?;
    } else if passed {
        output.warning(&format!("Metamodel built with failures: {summary}"))?;
    } else if !output.is_quiet() {
        output.error(&format!("Metamodel rejected: {summary}"))?;
    }
    Ok(())
}
