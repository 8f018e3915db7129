use sales_gate::workflows::sales::{
    AuditError, AuditLog, AuditRecord, AuditSink, DirectoryLayout, FileState, MemoryAuditSink,
    MemoryNotifier, OutcomeKind, PipelineError, PipelineOrchestrator, RecipientClass, Verdict,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const VALID: &str = "TransactionID,ProductName,Quantity,Amount,SaleDate
1001,Laptop,2,1500.00,2025-03-12
1002,Mobile Phone,5,3000.00,2025-03-12
1003,Headphones,3,0,2025-03-12
1004,Monitor,1,250.50,2025-03-12
1005,Keyboard,10,45.99,2025-03-12";

const NEGATIVE: &str = "TransactionID,ProductName,Quantity,Amount,SaleDate
2001,Tablet,1,500.00,2025-03-12
2002,Camera,2,-100.00,2025-03-12
2003,Speaker,3,75.00,2025-03-12";

const MISSING_AMOUNT: &str = "TransactionID,ProductName,Quantity,SaleDate
3001,Charger,5,2025-03-12
3002,Cable,10,2025-03-12";

struct Workspace {
    _root: TempDir,
    layout: DirectoryLayout,
    audit_path: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let layout = DirectoryLayout {
            intake: root.path().join("sales-files"),
            processing: root.path().join("processing"),
            accepted: root.path().join("success"),
            rejected: root.path().join("failed"),
        };
        for dir in [
            &layout.intake,
            &layout.processing,
            &layout.accepted,
            &layout.rejected,
        ] {
            fs::create_dir_all(dir).expect("create directory");
        }
        let audit_path = root.path().join("audit.ndjson");

        Self {
            _root: root,
            layout,
            audit_path,
        }
    }

    fn drop_file(&self, name: &str, contents: &str) {
        fs::write(self.layout.intake.join(name), contents).expect("write intake file");
    }

    fn orchestrator(&self) -> PipelineOrchestrator<AuditLog, MemoryNotifier> {
        self.orchestrator_with(Arc::new(MemoryNotifier::default()))
    }

    fn orchestrator_with(
        &self,
        notifier: Arc<MemoryNotifier>,
    ) -> PipelineOrchestrator<AuditLog, MemoryNotifier> {
        PipelineOrchestrator::new(
            self.layout.clone(),
            Arc::new(AuditLog::new(&self.audit_path)),
            notifier,
        )
    }
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

#[test]
fn run_routes_each_file_by_outcome() {
    let workspace = Workspace::new();
    workspace.drop_file("valid_data.csv", VALID);
    workspace.drop_file("invalid_data.csv", NEGATIVE);
    workspace.drop_file("missing_field_data.csv", MISSING_AMOUNT);

    let report = workspace.orchestrator().run().expect("run completes");

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.accepted(), 1);
    assert_eq!(report.rejected(), 2);
    assert_eq!(report.failed(), 0);
    assert!(report
        .files
        .iter()
        .all(|file| file.state == FileState::Archived));

    assert!(names_in(&workspace.layout.intake).is_empty());
    assert!(names_in(&workspace.layout.processing).is_empty());
    assert_eq!(names_in(&workspace.layout.accepted), ["valid_data.csv"]);
    assert_eq!(
        names_in(&workspace.layout.rejected),
        ["invalid_data.csv", "missing_field_data.csv"]
    );
    assert_eq!(
        fs::read_to_string(workspace.layout.accepted.join("valid_data.csv")).expect("read"),
        VALID
    );
}

#[test]
fn files_are_processed_and_audited_in_name_order() {
    let workspace = Workspace::new();
    workspace.drop_file("valid_data.csv", VALID);
    workspace.drop_file("invalid_data.csv", NEGATIVE);
    workspace.drop_file("missing_field_data.csv", MISSING_AMOUNT);

    let report = workspace.orchestrator().run().expect("run completes");
    let processed: Vec<&str> = report
        .files
        .iter()
        .map(|file| file.file_name.as_str())
        .collect();
    assert_eq!(
        processed,
        ["invalid_data.csv", "missing_field_data.csv", "valid_data.csv"]
    );

    let records = AuditLog::new(&workspace.audit_path)
        .read_all()
        .expect("audit log readable");
    let audited: Vec<(&str, OutcomeKind, &str)> = records
        .iter()
        .map(|record| {
            (
                record.file.as_str(),
                record.validation_result,
                record.message.as_str(),
            )
        })
        .collect();
    assert_eq!(
        audited,
        [
            (
                "invalid_data.csv",
                OutcomeKind::Invalid,
                "Found 1 rows with negative amounts"
            ),
            (
                "missing_field_data.csv",
                OutcomeKind::Invalid,
                "Missing required fields: Amount"
            ),
            (
                "valid_data.csv",
                OutcomeKind::Passed,
                "Validated 5 records successfully"
            ),
        ]
    );
}

#[test]
fn second_run_does_not_reprocess_archived_files() {
    let workspace = Workspace::new();
    workspace.drop_file("valid_data.csv", VALID);
    workspace.drop_file("invalid_data.csv", NEGATIVE);

    workspace.orchestrator().run().expect("first run");
    let second = workspace.orchestrator().run().expect("second run");
    assert!(second.files.is_empty());

    workspace.drop_file("late.csv", VALID);
    let third = workspace.orchestrator().run().expect("third run");
    assert_eq!(third.files.len(), 1);

    let records = AuditLog::new(&workspace.audit_path)
        .read_all()
        .expect("audit log readable");
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].file, "late.csv");
}

#[test]
fn notifications_follow_outcome() {
    let workspace = Workspace::new();
    workspace.drop_file("a_valid.csv", VALID);
    workspace.drop_file("b_invalid.csv", NEGATIVE);
    let notifier = Arc::new(MemoryNotifier::default());

    workspace
        .orchestrator_with(Arc::clone(&notifier))
        .run()
        .expect("run completes");

    let messages = notifier.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].recipient, RecipientClass::Operations);
    assert!(messages[0].body.contains("File: a_valid.csv"));
    assert_eq!(messages[1].recipient, RecipientClass::ManualReview);
    assert!(messages[1].body.contains("Manual review required"));
}

#[test]
fn malformed_file_is_rejected_and_audited() {
    let workspace = Workspace::new();
    workspace.drop_file("ragged.csv", "TransactionID,ProductName,Amount\n1,Laptop\n");
    workspace.drop_file("empty.csv", "");

    let report = workspace.orchestrator().run().expect("run completes");

    assert_eq!(report.rejected(), 2);
    for file in &report.files {
        assert!(matches!(file.verdict, Some(Verdict::Malformed(_))));
    }
    assert_eq!(
        names_in(&workspace.layout.rejected),
        ["empty.csv", "ragged.csv"]
    );

    let records = AuditLog::new(&workspace.audit_path)
        .read_all()
        .expect("audit log readable");
    assert!(records
        .iter()
        .all(|record| record.message.starts_with("Error processing file:")));
}

#[test]
fn header_only_and_non_numeric_files() {
    let workspace = Workspace::new();
    workspace.drop_file("a_header_only.csv", "TransactionID,ProductName,Amount\n");
    workspace.drop_file(
        "b_text_amount.csv",
        "TransactionID,ProductName,Amount\n1,Laptop,abc\n",
    );

    let report = workspace.orchestrator().run().expect("run completes");

    assert_eq!(names_in(&workspace.layout.accepted), ["a_header_only.csv"]);
    assert_eq!(names_in(&workspace.layout.rejected), ["b_text_amount.csv"]);
    let response = report.files[1]
        .verdict
        .as_ref()
        .expect("verdict recorded")
        .response();
    assert_eq!(response.message, "Amount contains non-numeric values");
    assert_eq!(response.invalid_transactions, Some(vec!["1".to_string()]));
}

#[test]
fn overflowing_total_is_rejected_and_later_files_still_run() {
    let workspace = Workspace::new();
    workspace.drop_file(
        "a_overflow.csv",
        "TransactionID,ProductName,Amount\n1,A,79228162514264337593543950335\n2,B,1\n",
    );
    workspace.drop_file("b_valid.csv", VALID);

    let report = workspace.orchestrator().run().expect("run completes");

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.failed(), 0);
    assert!(names_in(&workspace.layout.processing).is_empty());
    assert_eq!(names_in(&workspace.layout.rejected), ["a_overflow.csv"]);
    assert_eq!(names_in(&workspace.layout.accepted), ["b_valid.csv"]);

    let records = AuditLog::new(&workspace.audit_path)
        .read_all()
        .expect("audit readable");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].validation_result, OutcomeKind::Invalid);
    assert_eq!(
        records[0].message,
        "Amount exceeds the supported range or precision"
    );
}

#[test]
fn files_with_other_extensions_stay_in_intake() {
    let workspace = Workspace::new();
    workspace.drop_file("valid_data.csv", VALID);
    workspace.drop_file("README.txt", "not sales data");

    let report = workspace.orchestrator().run().expect("run completes");

    assert_eq!(report.files.len(), 1);
    assert_eq!(names_in(&workspace.layout.intake), ["README.txt"]);
}

#[test]
fn failed_terminal_move_does_not_stop_the_run() {
    let workspace = Workspace::new();
    workspace.drop_file("a_invalid.csv", NEGATIVE);
    workspace.drop_file("b_valid.csv", VALID);
    fs::remove_dir(&workspace.layout.rejected).expect("remove rejected dir");

    let report = workspace.orchestrator().run().expect("run completes");

    let broken = &report.files[0];
    assert_eq!(broken.state, FileState::Rejected);
    assert!(matches!(broken.error, Some(PipelineError::Move { .. })));
    assert_eq!(names_in(&workspace.layout.processing), ["a_invalid.csv"]);

    let healthy = &report.files[1];
    assert_eq!(healthy.state, FileState::Archived);
    assert!(healthy.error.is_none());
    assert_eq!(report.failed(), 1);
    assert_eq!(report.accepted(), 1);

    let records = AuditLog::new(&workspace.audit_path)
        .read_all()
        .expect("audit log readable");
    assert_eq!(records.len(), 2);
}

#[test]
fn failed_move_into_processing_leaves_file_in_intake() {
    let workspace = Workspace::new();
    workspace.drop_file("valid_data.csv", VALID);
    fs::remove_dir(&workspace.layout.processing).expect("remove processing dir");

    let report = workspace.orchestrator().run().expect("run completes");

    let file = &report.files[0];
    assert_eq!(file.state, FileState::Discovered);
    assert!(file.verdict.is_none());
    assert!(matches!(file.error, Some(PipelineError::Move { .. })));
    assert_eq!(names_in(&workspace.layout.intake), ["valid_data.csv"]);
    assert!(AuditLog::new(&workspace.audit_path)
        .read_all()
        .expect("audit log readable")
        .is_empty());
}

struct FailingAudit;

impl AuditSink for FailingAudit {
    fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Io {
            path: PathBuf::from("/unavailable/audit.ndjson"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn audit_failure_keeps_file_in_processing() {
    let workspace = Workspace::new();
    workspace.drop_file("valid_data.csv", VALID);

    let orchestrator = PipelineOrchestrator::new(
        workspace.layout.clone(),
        Arc::new(FailingAudit),
        Arc::new(MemoryNotifier::default()),
    );
    let report = orchestrator.run().expect("run completes");

    let file = &report.files[0];
    assert_eq!(file.state, FileState::Accepted);
    assert!(matches!(file.error, Some(PipelineError::Audit(_))));
    assert_eq!(names_in(&workspace.layout.processing), ["valid_data.csv"]);
    assert!(names_in(&workspace.layout.accepted).is_empty());
}

#[test]
fn memory_sink_captures_records_in_order() {
    let workspace = Workspace::new();
    workspace.drop_file("b.csv", NEGATIVE);
    workspace.drop_file("a.csv", VALID);
    let sink = Arc::new(MemoryAuditSink::default());

    PipelineOrchestrator::new(
        workspace.layout.clone(),
        Arc::clone(&sink),
        Arc::new(MemoryNotifier::default()),
    )
    .run()
    .expect("run completes");

    let files: Vec<String> = sink.records().into_iter().map(|record| record.file).collect();
    assert_eq!(files, ["a.csv", "b.csv"]);
}

#[test]
fn missing_intake_directory_fails_the_run() {
    let workspace = Workspace::new();
    fs::remove_dir(&workspace.layout.intake).expect("remove intake dir");

    let error = workspace
        .orchestrator()
        .run()
        .expect_err("intake must exist");
    assert!(matches!(error, PipelineError::Discovery { .. }));
}
