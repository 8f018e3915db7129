use crate::infra::file_orchestrator;
use clap::Args;
use sales_gate::config::AppConfig;
use sales_gate::error::AppError;
use sales_gate::telemetry;
use sales_gate::workflows::sales::{AuditLog, FileReport, RunReport, ValidationEngine, Verdict};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Delimited sales file to validate; the file is not moved
    pub(crate) path: PathBuf,
}

pub(crate) fn run_pipeline() -> Result<ExitCode, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let report = file_orchestrator(&config.pipeline).run()?;
    println!("{}", render_run_report(&report));

    if report.failed() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

pub(crate) fn validate_file(args: ValidateArgs) -> Result<ExitCode, AppError> {
    let bytes = std::fs::read(&args.path)?;
    let verdict = Verdict::evaluate(&ValidationEngine::new(), &bytes);
    let response = verdict.response();

    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

pub(crate) fn export_audit() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let exported = AuditLog::new(&config.pipeline.audit_log).export_json_array()?;
    println!("{exported}");
    Ok(())
}

fn render_run_report(report: &RunReport) -> String {
    let mut lines: Vec<String> = report.files.iter().map(render_file).collect();
    lines.push(format!(
        "{} file(s): {} accepted, {} rejected, {} need manual intervention",
        report.files.len(),
        report.accepted(),
        report.rejected(),
        report.failed()
    ));
    lines.join("\n")
}

fn render_file(file: &FileReport) -> String {
    let outcome = file
        .verdict
        .as_ref()
        .map(|verdict| verdict.message())
        .unwrap_or_else(|| "not validated".to_string());

    match &file.error {
        Some(err) => format!("{:<32} {:<10} {} ({})", file.file_name, file.state, outcome, err),
        None => format!("{:<32} {:<10} {}", file.file_name, file.state, outcome),
    }
}
