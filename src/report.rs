/// Error reporting for absorbed failures
///
/// Analysis and lookup failures never reach the user as errors, but every one
/// of them is reported here so it still shows up in logs.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::CapabilityError;
use crate::state::data::Stage;

/// How many reports `ReportLog` keeps around
const MAX_REPORTS: usize = 50;

/// Receives `(stage, error)` pairs. Must return quickly and never fail.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, stage: Stage, error: &CapabilityError);
}

/// One absorbed failure
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub stage: Stage,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Reporter that logs through tracing and remembers recent reports
#[derive(Debug, Default)]
pub struct ReportLog {
    reports: Mutex<VecDeque<Report>>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent report, if any
    pub fn latest(&self) -> Option<Report> {
        self.reports.lock().ok()?.back().cloned()
    }

    /// All kept reports, oldest first
    pub fn snapshot(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|reports| reports.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl ErrorReporter for ReportLog {
    fn report(&self, stage: Stage, error: &CapabilityError) {
        tracing::warn!(%stage, %error, "⚠️  absorbed failure, using fallback data");

        // A poisoned lock only loses the history, never the log line above
        if let Ok(mut reports) = self.reports.lock() {
            if reports.len() == MAX_REPORTS {
                reports.pop_front();
            }
            reports.push_back(Report {
                stage,
                message: error.to_string(),
                at: Utc::now(),
            });
        }
    }
}
