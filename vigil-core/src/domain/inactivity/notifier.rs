use std::{any::type_name_of_val, fmt, sync::Arc};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info, warn};

use super::{
    blackout::BlackoutPeriod,
    reference::parse_reference_date,
    report::{
        FailedStep, InactivityRunError, InactivityRunReport, RunFailure,
        TierCounts, TierFailure, VolunteerFailure,
    },
    tier::{FollowUpStep, InactivityTier},
    volunteer::{VolunteerContact, VolunteerId},
    window::InactivityWindows,
};
use crate::{
    database::ports::{AvailabilityRepository, VolunteerRepository},
    error::VigilError,
    mail::InactivityMailer,
};

/// Name of the scheduled job that drives [`InactivityNotifier::run`].
pub const INACTIVITY_JOB_NAME: &str = "EmailVolunteerInactive";

/// Sends 30/60/90 day inactivity notices and records that they went out.
///
/// Tiers run strictly in order and volunteers one at a time. A failure for
/// one volunteer never stops the rest of the list, and a failing tier never
/// stops the tiers after it; everything is reported together at the end.
pub struct InactivityNotifier<V, A, M>
where
    V: VolunteerRepository + ?Sized,
    A: AvailabilityRepository + ?Sized,
    M: InactivityMailer + ?Sized,
{
    volunteers: Arc<V>,
    availability: Arc<A>,
    mailer: Arc<M>,
    blackout: BlackoutPeriod,
}

impl<V, A, M> Clone for InactivityNotifier<V, A, M>
where
    V: VolunteerRepository + ?Sized,
    A: AvailabilityRepository + ?Sized,
    M: InactivityMailer + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            volunteers: Arc::clone(&self.volunteers),
            availability: Arc::clone(&self.availability),
            mailer: Arc::clone(&self.mailer),
            blackout: self.blackout,
        }
    }
}

impl<V, A, M> fmt::Debug for InactivityNotifier<V, A, M>
where
    V: VolunteerRepository + ?Sized,
    A: AvailabilityRepository + ?Sized,
    M: InactivityMailer + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InactivityNotifier")
            .field("volunteers", &type_name_of_val(self.volunteers.as_ref()))
            .field(
                "availability",
                &type_name_of_val(self.availability.as_ref()),
            )
            .field("mailer", &type_name_of_val(self.mailer.as_ref()))
            .field("blackout", &self.blackout)
            .finish()
    }
}

impl<V, A, M> InactivityNotifier<V, A, M>
where
    V: VolunteerRepository + ?Sized,
    A: AvailabilityRepository + ?Sized,
    M: InactivityMailer + ?Sized,
{
    pub fn new(volunteers: Arc<V>, availability: Arc<A>, mailer: Arc<M>) -> Self {
        Self {
            volunteers,
            availability,
            mailer,
            blackout: BlackoutPeriod::default(),
        }
    }

    /// Override the built-in blackout period.
    pub fn with_blackout_period(mut self, blackout: BlackoutPeriod) -> Self {
        self.blackout = blackout;
        self
    }

    pub fn blackout_period(&self) -> &BlackoutPeriod {
        &self.blackout
    }

    /// Parse a job's `startDate` and run against it.
    pub async fn run_from_start_date(
        &self,
        start_date: &str,
    ) -> Result<InactivityRunReport, InactivityRunError> {
        let reference = parse_reference_date(start_date).ok_or_else(|| {
            InactivityRunError::InvalidReferenceDate {
                input: start_date.to_string(),
            }
        })?;
        self.run(reference).await
    }

    pub async fn run(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<InactivityRunReport, InactivityRunError> {
        if self.blackout.contains(reference) {
            info!(
                "Skipping {} because today's date, {}, is within the blackout period: {} - {}",
                INACTIVITY_JOB_NAME,
                iso(reference),
                iso(self.blackout.start),
                iso(self.blackout.end)
            );
            return Ok(InactivityRunReport::Skipped {
                reference,
                blackout: self.blackout,
            });
        }

        let windows =
            InactivityWindows::for_reference(reference).ok_or_else(|| {
                InactivityRunError::InvalidReferenceDate {
                    input: iso(reference),
                }
            })?;

        let Some(volunteers) = self
            .volunteers
            .fetch_inactive_volunteers(&windows)
            .await
            .map_err(InactivityRunError::Fetch)?
            .filter(|volunteers| !volunteers.is_empty())
        else {
            info!(reference = %iso(reference), "no inactive volunteers to notify");
            return Ok(InactivityRunReport::NoWork { reference });
        };

        info!(
            reference = %iso(reference),
            thirty_days = volunteers.thirty_days.len(),
            sixty_days = volunteers.sixty_days.len(),
            ninety_days = volunteers.ninety_days.len(),
            "loaded inactive volunteers"
        );

        let mut sent = TierCounts::default();
        let mut failed_tiers = Vec::new();
        for tier in InactivityTier::ALL {
            match self.process_tier(tier, volunteers.for_tier(tier)).await {
                Ok(count) => sent.set(tier, count),
                Err(failure) => {
                    error!(
                        job = tier.job_name(),
                        failed = failure.failures.len(),
                        sent = failure.sent,
                        "inactivity tier finished with failures"
                    );
                    sent.set(tier, failure.sent);
                    failed_tiers.push(failure);
                }
            }
        }

        if !failed_tiers.is_empty() {
            return Err(RunFailure {
                reference,
                sent,
                tiers: failed_tiers,
            }
            .into());
        }

        info!(
            reference = %iso(reference),
            sent = sent.total(),
            "inactivity notices complete"
        );
        Ok(InactivityRunReport::Completed { reference, sent })
    }

    /// Notify every volunteer in `volunteers` for `tier`, in list order.
    ///
    /// Returns how many volunteers were fully processed, or a [`TierFailure`]
    /// listing each volunteer whose sequence stopped early.
    pub async fn process_tier(
        &self,
        tier: InactivityTier,
        volunteers: &[VolunteerContact],
    ) -> Result<usize, TierFailure> {
        let mut sent = 0;
        let mut failures = Vec::new();

        for volunteer in volunteers {
            match self.notify_volunteer(tier, volunteer).await {
                Ok(()) => {
                    sent += 1;
                    info!(
                        job = tier.job_name(),
                        volunteer_id = %volunteer.id,
                        "Sent {} to volunteer {}",
                        tier.job_name(),
                        volunteer.id
                    );
                }
                Err((step, err)) => {
                    warn!(
                        job = tier.job_name(),
                        volunteer_id = %volunteer.id,
                        step = %step,
                        error = %err,
                        "inactivity notice failed"
                    );
                    failures.push(VolunteerFailure::new(
                        tier,
                        volunteer.id,
                        step,
                        &err,
                    ));
                }
            }
        }

        if failures.is_empty() {
            Ok(sent)
        } else {
            Err(TierFailure {
                tier,
                sent,
                failures,
            })
        }
    }

    /// Send, then run the tier's follow-up steps. Stops at the first failing
    /// step; earlier steps are not undone.
    async fn notify_volunteer(
        &self,
        tier: InactivityTier,
        volunteer: &VolunteerContact,
    ) -> Result<(), (FailedStep, VigilError)> {
        let contact = volunteer.to_inactivity_contact();
        self.mailer
            .send_inactivity_email(tier, &contact)
            .await
            .map_err(|err| (FailedStep::SendEmail, err))?;

        for &step in tier.follow_up_steps() {
            self.run_follow_up(step, tier, volunteer.id)
                .await
                .map_err(|err| (FailedStep::FollowUp(step), err))?;
        }
        Ok(())
    }

    async fn run_follow_up(
        &self,
        step: FollowUpStep,
        tier: InactivityTier,
        id: VolunteerId,
    ) -> crate::error::Result<()> {
        match step {
            FollowUpStep::MarkSent => {
                self.volunteers.mark_inactivity_email_sent(id, tier).await
            }
            FollowUpStep::ArchiveAvailability => {
                self.availability.save_current_as_history(id).await
            }
            FollowUpStep::ClearAvailability => {
                self.availability.clear_availability(id).await
            }
        }
    }
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::availability::MockAvailabilityRepository;
    use crate::database::ports::volunteers::MockVolunteerRepository;
    use crate::domain::inactivity::InactiveVolunteers;
    use crate::mail::MockInactivityMailer;
    use chrono::TimeZone;
    use mockall::{Sequence, predicate::eq};

    type MockNotifier = InactivityNotifier<
        MockVolunteerRepository,
        MockAvailabilityRepository,
        MockInactivityMailer,
    >;

    fn notifier(
        volunteers: MockVolunteerRepository,
        availability: MockAvailabilityRepository,
        mailer: MockInactivityMailer,
    ) -> MockNotifier {
        InactivityNotifier::new(
            Arc::new(volunteers),
            Arc::new(availability),
            Arc::new(mailer),
        )
    }

    fn march_15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn blackout_skips_fetch_entirely() {
        let mut volunteers = MockVolunteerRepository::new();
        volunteers.expect_fetch_inactive_volunteers().times(0);
        let mut mailer = MockInactivityMailer::new();
        mailer.expect_send_inactivity_email().times(0);

        let blackout = BlackoutPeriod::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        );
        let service =
            notifier(volunteers, MockAvailabilityRepository::new(), mailer)
                .with_blackout_period(blackout);

        let report = service.run(march_15()).await.expect("skip is success");
        assert_eq!(
            report,
            InactivityRunReport::Skipped {
                reference: march_15(),
                blackout,
            }
        );
    }

    #[tokio::test]
    async fn fetch_receives_the_three_day_windows() {
        let mut volunteers = MockVolunteerRepository::new();
        volunteers
            .expect_fetch_inactive_volunteers()
            .withf(|windows| {
                windows.thirty_days.start
                    == Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap()
                    && windows.sixty_days.start
                        == Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
                    && windows.ninety_days.start
                        == Utc.with_ymd_and_hms(2023, 12, 16, 0, 0, 0).unwrap()
            })
            .times(1)
            .returning(|_| Ok(None));

        let service = notifier(
            volunteers,
            MockAvailabilityRepository::new(),
            MockInactivityMailer::new(),
        );

        let report = service.run(march_15()).await.expect("run");
        assert_eq!(
            report,
            InactivityRunReport::NoWork {
                reference: march_15()
            }
        );
    }

    #[tokio::test]
    async fn empty_lists_are_reported_as_no_work() {
        let mut volunteers = MockVolunteerRepository::new();
        volunteers
            .expect_fetch_inactive_volunteers()
            .times(1)
            .returning(|_| Ok(Some(InactiveVolunteers::default())));
        let mut mailer = MockInactivityMailer::new();
        mailer.expect_send_inactivity_email().times(0);

        let service =
            notifier(volunteers, MockAvailabilityRepository::new(), mailer);

        let report = service.run(march_15()).await.expect("run");
        assert_eq!(
            report,
            InactivityRunReport::NoWork {
                reference: march_15()
            }
        );
    }

    #[tokio::test]
    async fn ninety_day_tier_marks_archives_then_clears() {
        let mut seq = Sequence::new();
        let mut volunteers = MockVolunteerRepository::new();
        let mut availability = MockAvailabilityRepository::new();
        let mut mailer = MockInactivityMailer::new();

        volunteers.expect_fetch_inactive_volunteers().returning(|_| {
            Ok(Some(InactiveVolunteers {
                ninety_days: vec![VolunteerContact::new(5, "v@x.com", "V")],
                ..Default::default()
            }))
        });
        mailer
            .expect_send_inactivity_email()
            .withf(|tier, contact| {
                *tier == InactivityTier::NinetyDays && contact.email == "v@x.com"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        volunteers
            .expect_mark_inactivity_email_sent()
            .with(eq(VolunteerId(5)), eq(InactivityTier::NinetyDays))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        availability
            .expect_save_current_as_history()
            .with(eq(VolunteerId(5)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        availability
            .expect_clear_availability()
            .with(eq(VolunteerId(5)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let service = notifier(volunteers, availability, mailer);
        let report = service.run(march_15()).await.expect("run");
        assert_eq!(report.sent().ninety_days, 1);
    }

    #[tokio::test]
    async fn failed_send_skips_mark_and_continues_with_next_volunteer() {
        let mut volunteers = MockVolunteerRepository::new();
        let mut mailer = MockInactivityMailer::new();

        volunteers.expect_fetch_inactive_volunteers().returning(|_| {
            Ok(Some(InactiveVolunteers {
                sixty_days: vec![
                    VolunteerContact::new(1, "a@x.com", "A"),
                    VolunteerContact::new(2, "b@x.com", "B"),
                ],
                ..Default::default()
            }))
        });
        mailer
            .expect_send_inactivity_email()
            .withf(|_, contact| contact.email == "a@x.com")
            .times(1)
            .returning(|_, _| Err(VigilError::Mail("bounced".into())));
        mailer
            .expect_send_inactivity_email()
            .withf(|_, contact| contact.email == "b@x.com")
            .times(1)
            .returning(|_, _| Ok(()));
        volunteers
            .expect_mark_inactivity_email_sent()
            .with(eq(VolunteerId(2)), eq(InactivityTier::SixtyDays))
            .times(1)
            .returning(|_, _| Ok(()));

        let service =
            notifier(volunteers, MockAvailabilityRepository::new(), mailer);
        let err = service.run(march_15()).await.expect_err("tier failed");

        let run = match err {
            InactivityRunError::Incomplete(run) => run,
            other => panic!("expected aggregate failure, got {other:?}"),
        };
        assert_eq!(run.sent.sixty_days, 1);
        let failures: Vec<_> = run.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].volunteer_id, VolunteerId(1));
        assert_eq!(failures[0].step, FailedStep::SendEmail);
        assert!(run.to_string().contains("to volunteer 1: "));
    }

    #[tokio::test]
    async fn archive_failure_leaves_sent_flag_and_skips_clear() {
        let mut volunteers = MockVolunteerRepository::new();
        let mut availability = MockAvailabilityRepository::new();
        let mut mailer = MockInactivityMailer::new();

        volunteers.expect_fetch_inactive_volunteers().returning(|_| {
            Ok(Some(InactiveVolunteers {
                ninety_days: vec![VolunteerContact::new(9, "n@x.com", "N")],
                ..Default::default()
            }))
        });
        mailer
            .expect_send_inactivity_email()
            .returning(|_, _| Ok(()));
        volunteers
            .expect_mark_inactivity_email_sent()
            .times(1)
            .returning(|_, _| Ok(()));
        availability
            .expect_save_current_as_history()
            .times(1)
            .returning(|_| Err(VigilError::Database("disk full".into())));
        availability.expect_clear_availability().times(0);

        let service = notifier(volunteers, availability, mailer);
        let err = service.run(march_15()).await.expect_err("archive failed");

        let run = match err {
            InactivityRunError::Incomplete(run) => run,
            other => panic!("expected aggregate failure, got {other:?}"),
        };
        let failure = run.failures().next().expect("one failure");
        assert_eq!(
            failure.step,
            FailedStep::FollowUp(FollowUpStep::ArchiveAvailability)
        );
        assert_eq!(run.sent.ninety_days, 0);
    }

    #[tokio::test]
    async fn fetch_error_aborts_before_any_email() {
        let mut volunteers = MockVolunteerRepository::new();
        volunteers
            .expect_fetch_inactive_volunteers()
            .returning(|_| Err(VigilError::Database("connection refused".into())));
        let mut mailer = MockInactivityMailer::new();
        mailer.expect_send_inactivity_email().times(0);

        let service =
            notifier(volunteers, MockAvailabilityRepository::new(), mailer);
        let err = service.run(march_15()).await.expect_err("fetch failed");
        assert!(matches!(err, InactivityRunError::Fetch(_)));
    }

    #[tokio::test]
    async fn malformed_start_date_fails_before_fetch() {
        let mut volunteers = MockVolunteerRepository::new();
        volunteers.expect_fetch_inactive_volunteers().times(0);

        let service = notifier(
            volunteers,
            MockAvailabilityRepository::new(),
            MockInactivityMailer::new(),
        );
        let err = service
            .run_from_start_date("fifteenth of march")
            .await
            .expect_err("parse failure");
        assert!(matches!(
            err,
            InactivityRunError::InvalidReferenceDate { ref input } if input == "fifteenth of march"
        ));
    }
}
