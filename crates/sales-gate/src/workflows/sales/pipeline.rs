use super::audit::{AuditError, AuditRecord, AuditSink};
use super::notification::{NotificationComposer, NotificationMessage, Notifier};
use super::parser::{self, ParseError};
use super::storage::{self, DirectoryLayout};
use super::validation::{OutcomeKind, ValidationEngine, ValidationOutcome, ValidationResponse};
use crate::config::PipelineConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Lifecycle of one intake file within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileState {
    Discovered,
    Processing,
    Accepted,
    Rejected,
    Archived,
}

impl FileState {
    fn can_advance_to(self, next: FileState) -> bool {
        matches!(
            (self, next),
            (FileState::Discovered, FileState::Processing)
                | (FileState::Processing, FileState::Accepted)
                | (FileState::Processing, FileState::Rejected)
                | (FileState::Accepted, FileState::Archived)
                | (FileState::Rejected, FileState::Archived)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            FileState::Discovered => "Discovered",
            FileState::Processing => "Processing",
            FileState::Accepted => "Accepted",
            FileState::Rejected => "Rejected",
            FileState::Archived => "Archived",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    intake_path: PathBuf,
    state: FileState,
}

impl SourceFile {
    pub fn discovered(name: impl Into<String>, intake_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            intake_path: intake_path.into(),
            state: FileState::Discovered,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intake_path(&self) -> &Path {
        &self.intake_path
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    pub fn advance(&mut self, next: FileState) -> Result<(), PipelineError> {
        if !self.state.can_advance_to(next) {
            return Err(PipelineError::InvalidTransition {
                file: self.name.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// What the gate concluded about a file's contents.
///
/// Structural parse failures stay separate from rule failures; both route the
/// file to the rejected location.
#[derive(Debug)]
pub enum Verdict {
    Validated(ValidationOutcome),
    Malformed(ParseError),
}

impl Verdict {
    pub fn evaluate(engine: &ValidationEngine, bytes: &[u8]) -> Self {
        match parser::parse_bytes(bytes) {
            Ok(file) => Verdict::Validated(engine.validate(file.columns(), file.records())),
            Err(err) => Verdict::Malformed(err),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Validated(outcome) if outcome.is_passed())
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Verdict::Validated(outcome) => outcome.kind(),
            Verdict::Malformed(_) => OutcomeKind::Invalid,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Verdict::Validated(outcome) => outcome.message(),
            Verdict::Malformed(err) => format!("Error processing file: {err}"),
        }
    }

    pub fn response(&self) -> ValidationResponse {
        match self {
            Verdict::Validated(outcome) => ValidationResponse::from_outcome(outcome),
            Verdict::Malformed(err) => ValidationResponse::malformed(err),
        }
    }

    fn notification(
        &self,
        composer: &NotificationComposer,
        file_name: &str,
        processed_at: DateTime<Utc>,
    ) -> NotificationMessage {
        match self {
            Verdict::Validated(outcome) => composer.compose(outcome, file_name, processed_at),
            Verdict::Malformed(err) => composer.compose_malformed(err, file_name, processed_at),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to list intake directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("file {file} cannot move from {from} to {to}")]
    InvalidTransition {
        file: String,
        from: FileState,
        to: FileState,
    },
}

/// Per-file result of a run, in processing order.
#[derive(Debug)]
pub struct FileReport {
    pub file_name: String,
    pub state: FileState,
    pub verdict: Option<Verdict>,
    pub destination: Option<PathBuf>,
    pub error: Option<PipelineError>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn accepted(&self) -> usize {
        self.count_archived(true)
    }

    pub fn rejected(&self) -> usize {
        self.count_archived(false)
    }

    /// Files that hit an I/O failure and were left for manual intervention.
    pub fn failed(&self) -> usize {
        self.files.iter().filter(|file| file.error.is_some()).count()
    }

    fn count_archived(&self, accepted: bool) -> usize {
        self.files
            .iter()
            .filter(|file| file.state == FileState::Archived)
            .filter(|file| {
                file.verdict
                    .as_ref()
                    .is_some_and(|verdict| verdict.is_accepted() == accepted)
            })
            .count()
    }
}

/// Drives intake files through validation, notification, audit, and routing.
///
/// Files are handled one at a time in lexicographic order; a failure on one
/// file is recorded in its [`FileReport`] and the run moves on.
pub struct PipelineOrchestrator<A, N> {
    layout: DirectoryLayout,
    file_extension: Option<String>,
    engine: ValidationEngine,
    composer: NotificationComposer,
    audit: Arc<A>,
    notifier: Arc<N>,
}

impl<A, N> PipelineOrchestrator<A, N>
where
    A: AuditSink + 'static,
    N: Notifier + 'static,
{
    pub fn new(layout: DirectoryLayout, audit: Arc<A>, notifier: Arc<N>) -> Self {
        Self {
            layout,
            file_extension: Some("csv".to_string()),
            engine: ValidationEngine::new(),
            composer: NotificationComposer,
            audit,
            notifier,
        }
    }

    pub fn from_config(config: &PipelineConfig, audit: Arc<A>, notifier: Arc<N>) -> Self {
        Self::new(DirectoryLayout::from(config), audit, notifier)
            .with_file_extension(config.file_extension.clone())
    }

    pub fn with_file_extension(mut self, extension: Option<String>) -> Self {
        self.file_extension = extension;
        self
    }

    pub fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    pub fn run(&self) -> Result<RunReport, PipelineError> {
        let intake = &self.layout.intake;
        let discovered = storage::list_intake(intake, self.file_extension.as_deref()).map_err(
            |source| PipelineError::Discovery {
                path: intake.clone(),
                source,
            },
        )?;

        info!(count = discovered.len(), intake = %intake.display(), "intake scan complete");

        let files = discovered
            .into_iter()
            .map(|(name, path)| self.process(SourceFile::discovered(name, path)))
            .collect();

        Ok(RunReport { files })
    }

    fn process(&self, mut file: SourceFile) -> FileReport {
        let mut report = FileReport {
            file_name: file.name().to_string(),
            state: file.state(),
            verdict: None,
            destination: None,
            error: None,
        };

        info!(file = %file.name(), "processing intake file");
        if let Err(err) = self.advance_file(&mut file, &mut report) {
            error!(file = %file.name(), state = file.state().label(), error = %err, "file left for manual intervention");
            report.error = Some(err);
        }

        report.state = file.state();
        report
    }

    fn advance_file(&self, file: &mut SourceFile, report: &mut FileReport) -> Result<(), PipelineError> {
        let processing_path = self.layout.processing.join(file.name());
        relocate(file.intake_path(), &processing_path)?;
        file.advance(FileState::Processing)?;

        let bytes = fs::read(&processing_path).map_err(|source| PipelineError::Read {
            path: processing_path.clone(),
            source,
        })?;
        let processed_at = Utc::now();
        let verdict = Verdict::evaluate(&self.engine, &bytes);

        let (next_state, destination_dir) = if verdict.is_accepted() {
            info!(file = %file.name(), "validation passed");
            (FileState::Accepted, &self.layout.accepted)
        } else {
            warn!(file = %file.name(), reason = %verdict.message(), "validation failed");
            (FileState::Rejected, &self.layout.rejected)
        };
        file.advance(next_state)?;

        let message = verdict.notification(&self.composer, file.name(), processed_at);
        if let Err(err) = self.notifier.deliver(&message) {
            warn!(file = %file.name(), error = %err, "notification delivery failed");
        }

        let record = AuditRecord {
            timestamp: processed_at,
            file: file.name().to_string(),
            validation_result: verdict.kind(),
            message: verdict.message(),
        };
        report.verdict = Some(verdict);
        self.audit.append(&record)?;

        let destination = destination_dir.join(file.name());
        relocate(&processing_path, &destination)?;
        file.advance(FileState::Archived)?;

        info!(file = %file.name(), destination = %destination.display(), "file archived");
        report.destination = Some(destination);
        Ok(())
    }
}

fn relocate(from: &Path, to: &Path) -> Result<(), PipelineError> {
    storage::move_file(from, to).map_err(|source| PipelineError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
