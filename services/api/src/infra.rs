use metrics_exporter_prometheus::PrometheusHandle;
use profile_intake::config::{ProcessingConfig, ProcessingOutcome};
use profile_intake::lifecycle::{CompletionOutcome, ProcessingPolicy};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn processing_policy(config: &ProcessingConfig) -> ProcessingPolicy {
    ProcessingPolicy {
        delay: config.delay,
        outcome: match config.outcome {
            ProcessingOutcome::Complete => CompletionOutcome::Complete,
            ProcessingOutcome::Reject => CompletionOutcome::Reject,
        },
    }
}
