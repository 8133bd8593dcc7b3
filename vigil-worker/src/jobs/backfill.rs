use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::{info, warn};
use vigil_core::{
    database::ports::{AvailabilityRepository, VolunteerRepository},
    domain::inactivity::{InactivityNotifier, InactivityRunReport, TierCounts},
    mail::InactivityMailer,
};

use super::inactivity::log_report;

/// Totals across every day of a backfill that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub days: usize,
    pub skipped: usize,
    pub sent: TierCounts,
}

impl BackfillSummary {
    fn record(&mut self, report: &InactivityRunReport) {
        if matches!(report, InactivityRunReport::Skipped { .. }) {
            self.skipped += 1;
        }
        let sent = report.sent();
        self.sent.thirty_days += sent.thirty_days;
        self.sent.sixty_days += sent.sixty_days;
        self.sent.ninety_days += sent.ninety_days;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDay {
    pub day: NaiveDate,
    pub message: String,
}

impl fmt::Display for FailedDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.day, self.message)
    }
}

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("backfill range ends ({to}) before it starts ({from})")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
    #[error("{} of {} backfill day(s) failed: {}", .failed.len(), .summary.days, join_days(.failed))]
    DaysFailed {
        summary: BackfillSummary,
        failed: Vec<FailedDay>,
    },
}

fn join_days(failed: &[FailedDay]) -> String {
    failed
        .iter()
        .map(|day| day.day.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the notifier once per calendar day from `from` to `to`, both
/// inclusive, in order. A failed day is logged and the next day still runs.
pub async fn backfill_inactivity<V, A, M>(
    notifier: &InactivityNotifier<V, A, M>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BackfillSummary, BackfillError>
where
    V: VolunteerRepository + ?Sized,
    A: AvailabilityRepository + ?Sized,
    M: InactivityMailer + ?Sized,
{
    if to < from {
        return Err(BackfillError::InvertedRange { from, to });
    }

    let mut summary = BackfillSummary::default();
    let mut failed = Vec::new();

    for day in from.iter_days().take_while(|day| *day <= to) {
        summary.days += 1;
        let reference = day.and_time(NaiveTime::MIN).and_utc();
        match notifier.run(reference).await {
            Ok(report) => {
                log_report(&report);
                summary.record(&report);
            }
            Err(err) => {
                warn!(%day, error = %err, "backfill day failed");
                failed.push(FailedDay {
                    day,
                    message: err.to_string(),
                });
            }
        }
    }

    info!(
        days = summary.days,
        skipped = summary.skipped,
        failed = failed.len(),
        sent = summary.sent.total(),
        "backfill finished"
    );

    if failed.is_empty() {
        Ok(summary)
    } else {
        Err(BackfillError::DaysFailed { summary, failed })
    }
}
