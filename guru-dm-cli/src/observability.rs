//! Structured logging for the `guru-dm` command.
//!
//! Logs always go to stderr so that stdout carries nothing but the JSON
//! records of an execution.

use std::io;

use clap::ValueEnum;
use guru_dm_bridge::dispatcher::ExecutionOutcome;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output for interactive use.
    Pretty,
    /// One JSON object per event, for log aggregation.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to [`LogFormat::Pretty`] for
    /// anything other than `json`.
    #[must_use]
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }

    /// Picks the format from the command line, then `LOG_FORMAT`.
    #[must_use]
    pub fn resolve(flag: Option<Self>) -> Self {
        flag.unwrap_or_else(|| {
            Self::parse_lenient(&std::env::var("LOG_FORMAT").unwrap_or_default())
        })
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` controls filtering and defaults to `info`. Span close events
/// carry the elapsed time of each execution and item.
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Counts of successful and failed records in an execution's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records returned by the API or acknowledging a delete.
    pub succeeded: usize,
    /// Records recorded as `{"error": ...}` under continue-on-fail.
    pub failed: usize,
}

impl RunSummary {
    /// Takes the counts reported by the dispatcher.
    #[must_use]
    pub fn from_outcome(outcome: &ExecutionOutcome) -> Self {
        Self { succeeded: outcome.succeeded(), failed: outcome.failed }
    }

    /// Emits the summary as a single tracing event.
    pub fn log(&self) {
        if self.failed > 0 {
            tracing::warn!(
                succeeded = self.succeeded,
                failed = self.failed,
                "execution finished with errors"
            );
        } else {
            tracing::info!(succeeded = self.succeeded, "execution finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_log_format_parse_lenient() {
        assert_eq!(LogFormat::parse_lenient("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse_lenient(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse_lenient("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse_lenient(""), LogFormat::Pretty);
        assert_eq!(LogFormat::parse_lenient("unknown"), LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_flag_wins() {
        assert_eq!(LogFormat::resolve(Some(LogFormat::Json)), LogFormat::Json);
        assert_eq!(LogFormat::resolve(Some(LogFormat::Pretty)), LogFormat::Pretty);
    }

    #[test]
    fn test_run_summary_uses_dispatcher_failure_count() {
        let outcome = ExecutionOutcome {
            records: vec![
                json!({"id": "c-1"}),
                json!({"error": "Invalid parameter: contactId is required"}),
                json!({"success": true, "message": "Contact deleted successfully"}),
            ],
            failed: 1,
        };

        assert_eq!(RunSummary::from_outcome(&outcome), RunSummary { succeeded: 2, failed: 1 });
    }

    #[test]
    fn test_run_summary_error_shaped_api_record_is_not_failure() {
        let outcome = ExecutionOutcome {
            records: vec![json!({"error": "card declined"}), json!({})],
            failed: 0,
        };

        assert_eq!(RunSummary::from_outcome(&outcome), RunSummary { succeeded: 2, failed: 0 });
    }

    #[test]
    fn test_run_summary_empty() {
        let summary = RunSummary::from_outcome(&ExecutionOutcome::default());
        assert_eq!(summary, RunSummary::default());
    }
}
