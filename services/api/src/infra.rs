use metrics_exporter_prometheus::PrometheusHandle;
use sales_gate::config::PipelineConfig;
use sales_gate::workflows::sales::{AuditLog, PipelineOrchestrator, TracingNotifier};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Production wiring: file-backed audit log and log-only notification delivery.
pub(crate) fn file_orchestrator(
    config: &PipelineConfig,
) -> PipelineOrchestrator<AuditLog, TracingNotifier> {
    PipelineOrchestrator::from_config(
        config,
        Arc::new(AuditLog::new(&config.audit_log)),
        Arc::new(TracingNotifier),
    )
}
