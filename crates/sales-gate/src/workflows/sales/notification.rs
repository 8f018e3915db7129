use super::parser::ParseError;
use super::validation::ValidationOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Audience a message is addressed to; the delivery adapter maps it to addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientClass {
    Operations,
    ManualReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub recipient: RecipientClass,
}

/// Builds outcome messages. Holds no state and performs no delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationComposer;

impl NotificationComposer {
    pub fn compose(
        &self,
        outcome: &ValidationOutcome,
        file_name: &str,
        processed_at: DateTime<Utc>,
    ) -> NotificationMessage {
        if outcome.is_passed() {
            success_message(file_name, processed_at, &outcome.message())
        } else {
            failure_message(file_name, processed_at, &outcome.message())
        }
    }

    pub fn compose_malformed(
        &self,
        error: &ParseError,
        file_name: &str,
        processed_at: DateTime<Utc>,
    ) -> NotificationMessage {
        failure_message(
            file_name,
            processed_at,
            &format!("Error processing file: {error}"),
        )
    }
}

fn success_message(file_name: &str, processed_at: DateTime<Utc>, detail: &str) -> NotificationMessage {
    let body = ReportBody {
        success: true,
        file_name,
        processed_at,
        detail,
    };

    NotificationMessage {
        subject: "Daily sales data processed successfully".to_string(),
        body: body.to_string(),
        recipient: RecipientClass::Operations,
    }
}

fn failure_message(file_name: &str, processed_at: DateTime<Utc>, detail: &str) -> NotificationMessage {
    let body = ReportBody {
        success: false,
        file_name,
        processed_at,
        detail,
    };

    NotificationMessage {
        subject: "Error: sales data validation failed".to_string(),
        body: body.to_string(),
        recipient: RecipientClass::ManualReview,
    }
}

/// Plain-text report shared by both outcomes.
struct ReportBody<'a> {
    success: bool,
    file_name: &'a str,
    processed_at: DateTime<Utc>,
    detail: &'a str,
}

impl fmt::Display for ReportBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SUCCESS" } else { "FAILURE" };
        writeln!(f, "Sales data processing report: {status}")?;
        writeln!(f)?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(
            f,
            "Processed at: {}",
            self.processed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;

        if self.success {
            writeln!(f, "Status: all records validated ({})", self.detail)?;
            writeln!(f)?;
            writeln!(f, "The file has been moved to the accepted location.")?;
            writeln!(f, "Next step: the data will be loaded into the warehouse.")?;
        } else {
            writeln!(f, "Status: validation failed ({})", self.detail)?;
            writeln!(f)?;
            writeln!(f, "The file has been moved to the rejected location.")?;
            writeln!(
                f,
                "Manual review required: check the file for data quality issues before resubmitting."
            )?;
        }

        writeln!(f)?;
        writeln!(f, "---")?;
        write!(f, "This is an automated message from the sales validation gate.")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Outbound delivery hook (mail relay, chat webhook, ...).
pub trait Notifier: Send + Sync {
    fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}

/// Emits each message as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        info!(
            recipient = ?message.recipient,
            subject = %message.subject,
            "notification dispatched"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<NotificationMessage>>>,
}

impl MemoryNotifier {
    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
        Ok(())
    }
}
