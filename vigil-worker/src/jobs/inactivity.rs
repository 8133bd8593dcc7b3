use chrono::Utc;
use tracing::info;
use vigil_core::{
    database::ports::{AvailabilityRepository, VolunteerRepository},
    domain::inactivity::{
        InactivityNotifier, InactivityRunError, InactivityRunReport,
        InactivityTier,
    },
    mail::InactivityMailer,
};

use super::JobName;

/// Run the inactivity job once. Without a start date the current instant is
/// the reference.
pub async fn run_inactivity_job<V, A, M>(
    notifier: &InactivityNotifier<V, A, M>,
    start_date: Option<&str>,
) -> Result<InactivityRunReport, InactivityRunError>
where
    V: VolunteerRepository + ?Sized,
    A: AvailabilityRepository + ?Sized,
    M: InactivityMailer + ?Sized,
{
    let report = match start_date {
        Some(start_date) => notifier.run_from_start_date(start_date).await?,
        None => notifier.run(Utc::now()).await?,
    };
    log_report(&report);
    Ok(report)
}

pub(crate) fn log_report(report: &InactivityRunReport) {
    let job = JobName::EmailVolunteerInactive;
    let reference = report.reference().date_naive();
    match report {
        InactivityRunReport::Skipped { .. } => {
            info!(%job, %reference, "run skipped for blackout period");
        }
        InactivityRunReport::NoWork { .. } => {
            info!(%job, %reference, "no inactive volunteers");
        }
        InactivityRunReport::Completed { sent, .. } => {
            for tier in InactivityTier::ALL {
                info!(
                    job = %JobName::for_tier(tier),
                    %reference,
                    sent = sent.get(tier),
                    "tier finished"
                );
            }
            info!(%job, %reference, sent = sent.total(), "run completed");
        }
    }
}
