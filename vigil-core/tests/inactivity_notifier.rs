mod support;

use chrono::{TimeZone, Utc};
use support::{Call, Harness, contact};
use vigil_core::domain::inactivity::{
    InactiveVolunteers, InactivityRunError, InactivityRunReport,
    InactivityTier, InactivityWindows, VolunteerContact, VolunteerId,
};

fn only_thirty_day_volunteer() -> InactiveVolunteers {
    InactiveVolunteers {
        thirty_days: vec![VolunteerContact::new(1, "a@x.com", "A")],
        ..Default::default()
    }
}

#[tokio::test]
async fn thirty_day_volunteer_is_emailed_and_marked() {
    let (notifier, recorder) =
        Harness::new().with_inactive(only_thirty_day_volunteer()).build();

    let report = notifier
        .run_from_start_date("2024-03-15")
        .await
        .expect("run resolves");

    let reference = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let windows = InactivityWindows::for_reference(reference).unwrap();
    assert_eq!(
        recorder.calls().await,
        vec![
            Call::Fetch(windows),
            Call::Send(InactivityTier::ThirtyDays, contact("a@x.com", "A")),
            Call::MarkSent(VolunteerId(1), InactivityTier::ThirtyDays),
        ]
    );
    match report {
        InactivityRunReport::Completed { sent, .. } => {
            assert_eq!(sent.thirty_days, 1);
            assert_eq!(sent.total(), 1);
        }
        other => panic!("unexpected report: {other:?}"),
    }
}

#[tokio::test]
async fn failed_send_is_reported_without_marking() {
    let (notifier, recorder) = Harness::new()
        .with_inactive(only_thirty_day_volunteer())
        .failing_email("a@x.com")
        .build();

    let err = notifier
        .run_from_start_date("2024-03-15")
        .await
        .expect_err("aggregate failure");

    let calls = recorder.calls().await;
    assert!(
        !calls.iter().any(|call| matches!(call, Call::MarkSent(..))),
        "no flag update after a failed send: {calls:?}"
    );
    let message = err.to_string();
    assert!(message.contains("1"), "{message}");
    assert!(
        message.starts_with("failed to send inactivity emails: "),
        "{message}"
    );
    assert!(
        message.contains("EmailVolunteerInactiveThirtyDays to volunteer 1"),
        "{message}"
    );
}

#[tokio::test]
async fn blackout_date_touches_no_collaborator() {
    let (notifier, recorder) =
        Harness::new().with_inactive(only_thirty_day_volunteer()).build();

    let report = notifier
        .run_from_start_date("2020-12-25")
        .await
        .expect("blackout is not an error");

    assert!(matches!(report, InactivityRunReport::Skipped { .. }));
    assert!(recorder.calls().await.is_empty());
}

#[tokio::test]
async fn blackout_boundaries_are_inclusive() {
    for start_date in ["2020-12-21T00:00:00.000Z", "2021-01-03T23:59:59.999Z"] {
        let (notifier, recorder) = Harness::new().build();
        let report = notifier.run_from_start_date(start_date).await.unwrap();
        assert!(
            matches!(report, InactivityRunReport::Skipped { .. }),
            "{start_date} should be skipped"
        );
        assert!(recorder.calls().await.is_empty());
    }

    let (notifier, recorder) = Harness::new().build();
    let report = notifier
        .run_from_start_date("2021-01-04T00:00:00.000Z")
        .await
        .unwrap();
    assert!(matches!(report, InactivityRunReport::NoWork { .. }));
    assert_eq!(recorder.calls().await.len(), 1);
}

#[tokio::test]
async fn empty_fetch_result_is_no_work() {
    let (notifier, recorder) = Harness::new().build();

    let report = notifier.run_from_start_date("2024-03-15").await.unwrap();

    assert!(matches!(report, InactivityRunReport::NoWork { .. }));
    let calls = recorder.calls().await;
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::Fetch(_)));
}

#[tokio::test]
async fn tiers_run_in_order_and_lists_in_order() {
    let inactive = InactiveVolunteers {
        thirty_days: vec![
            VolunteerContact::new(3, "c@x.com", "C"),
            VolunteerContact::new(1, "a@x.com", "A"),
        ],
        sixty_days: vec![VolunteerContact::new(2, "b@x.com", "B")],
        ninety_days: vec![VolunteerContact::new(4, "d@x.com", "D")],
    };
    let (notifier, recorder) = Harness::new().with_inactive(inactive).build();

    notifier.run_from_start_date("2024-03-15").await.unwrap();

    let calls: Vec<Call> = recorder
        .calls()
        .await
        .into_iter()
        .filter(|call| !matches!(call, Call::Fetch(_)))
        .collect();
    assert_eq!(
        calls,
        vec![
            Call::Send(InactivityTier::ThirtyDays, contact("c@x.com", "C")),
            Call::MarkSent(VolunteerId(3), InactivityTier::ThirtyDays),
            Call::Send(InactivityTier::ThirtyDays, contact("a@x.com", "A")),
            Call::MarkSent(VolunteerId(1), InactivityTier::ThirtyDays),
            Call::Send(InactivityTier::SixtyDays, contact("b@x.com", "B")),
            Call::MarkSent(VolunteerId(2), InactivityTier::SixtyDays),
            Call::Send(InactivityTier::NinetyDays, contact("d@x.com", "D")),
            Call::MarkSent(VolunteerId(4), InactivityTier::NinetyDays),
            Call::Archive(VolunteerId(4)),
            Call::Clear(VolunteerId(4)),
        ]
    );
}

#[tokio::test]
async fn failing_tier_does_not_stop_later_tiers() {
    let inactive = InactiveVolunteers {
        thirty_days: vec![VolunteerContact::new(1, "a@x.com", "A")],
        sixty_days: vec![VolunteerContact::new(2, "b@x.com", "B")],
        ninety_days: vec![
            VolunteerContact::new(3, "c@x.com", "C"),
            VolunteerContact::new(4, "d@x.com", "D"),
        ],
    };
    let (notifier, recorder) = Harness::new()
        .with_inactive(inactive)
        .failing_email("a@x.com")
        .failing_mark(3)
        .build();

    let err = notifier
        .run_from_start_date("2024-03-15")
        .await
        .expect_err("two tiers failed");

    let run = match err {
        InactivityRunError::Incomplete(run) => run,
        other => panic!("unexpected error: {other:?}"),
    };
    let failed: Vec<(InactivityTier, VolunteerId)> = run
        .failures()
        .map(|failure| (failure.tier, failure.volunteer_id))
        .collect();
    assert_eq!(
        failed,
        vec![
            (InactivityTier::ThirtyDays, VolunteerId(1)),
            (InactivityTier::NinetyDays, VolunteerId(3)),
        ]
    );
    assert_eq!(run.sent.sixty_days, 1);
    assert_eq!(run.sent.ninety_days, 1);

    let calls = recorder.calls().await;
    assert!(calls.contains(&Call::MarkSent(
        VolunteerId(2),
        InactivityTier::SixtyDays
    )));
    // Volunteer 3's mark failed, so availability was left alone.
    assert!(!calls.contains(&Call::Archive(VolunteerId(3))));
    assert!(calls.contains(&Call::Clear(VolunteerId(4))));
}

#[tokio::test]
async fn overlapping_tiers_are_not_deduplicated() {
    let volunteer = VolunteerContact::new(7, "g@x.com", "G");
    let inactive = InactiveVolunteers {
        thirty_days: vec![volunteer.clone()],
        ninety_days: vec![volunteer],
        ..Default::default()
    };
    let (notifier, recorder) = Harness::new().with_inactive(inactive).build();

    let report = notifier.run_from_start_date("2024-03-15").await.unwrap();

    let sends = recorder
        .calls()
        .await
        .into_iter()
        .filter(|call| matches!(call, Call::Send(..)))
        .count();
    assert_eq!(sends, 2);
    assert_eq!(report.sent().total(), 2);
}

#[tokio::test]
async fn malformed_start_date_aborts_before_fetch() {
    let (notifier, recorder) =
        Harness::new().with_inactive(only_thirty_day_volunteer()).build();

    let err = notifier
        .run_from_start_date("03/15/2024")
        .await
        .expect_err("not a supported date");

    assert!(matches!(err, InactivityRunError::InvalidReferenceDate { .. }));
    assert!(recorder.calls().await.is_empty());
}
