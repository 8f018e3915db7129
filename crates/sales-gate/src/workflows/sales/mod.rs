//! Sales file intake gate: parse, validate, notify, audit, and route each file.

pub mod audit;
pub mod notification;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod validation;

pub use audit::{AuditError, AuditLog, AuditRecord, AuditSink, MemoryAuditSink};
pub use notification::{
    MemoryNotifier, NotificationComposer, NotificationMessage, Notifier, NotifyError,
    RecipientClass, TracingNotifier,
};
pub use parser::{ParseError, TabularFile, TabularRecord};
pub use pipeline::{
    FileReport, FileState, PipelineError, PipelineOrchestrator, RunReport, SourceFile, Verdict,
};
pub use storage::DirectoryLayout;
pub use validation::{
    FailureReason, OutcomeKind, SummaryView, ValidationEngine, ValidationOutcome,
    ValidationResponse, ValidationSummary, REQUIRED_COLUMNS,
};
