//! Recording in-memory collaborators for notifier scenarios.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vigil_core::{
    Result, VigilError,
    database::ports::{AvailabilityRepository, VolunteerRepository},
    domain::inactivity::{
        InactiveVolunteers, InactivityContact, InactivityNotifier,
        InactivityTier, InactivityWindows, VolunteerId,
    },
    mail::InactivityMailer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(InactivityWindows),
    Send(InactivityTier, InactivityContact),
    MarkSent(VolunteerId, InactivityTier),
    Archive(VolunteerId),
    Clear(VolunteerId),
}

#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    pub async fn push(&self, call: Call) {
        self.calls.lock().await.push(call);
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }
}

#[derive(Debug)]
pub struct InMemoryVolunteers {
    recorder: Arc<Recorder>,
    inactive: Option<InactiveVolunteers>,
    failing_marks: HashSet<VolunteerId>,
}

#[async_trait]
impl VolunteerRepository for InMemoryVolunteers {
    async fn fetch_inactive_volunteers(
        &self,
        windows: &InactivityWindows,
    ) -> Result<Option<InactiveVolunteers>> {
        self.recorder.push(Call::Fetch(*windows)).await;
        Ok(self.inactive.clone())
    }

    async fn mark_inactivity_email_sent(
        &self,
        id: VolunteerId,
        tier: InactivityTier,
    ) -> Result<()> {
        self.recorder.push(Call::MarkSent(id, tier)).await;
        if self.failing_marks.contains(&id) {
            return Err(VigilError::Database(format!(
                "update failed for volunteer {id}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct InMemoryAvailability {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl AvailabilityRepository for InMemoryAvailability {
    async fn save_current_as_history(&self, id: VolunteerId) -> Result<()> {
        self.recorder.push(Call::Archive(id)).await;
        Ok(())
    }

    async fn clear_availability(&self, id: VolunteerId) -> Result<()> {
        self.recorder.push(Call::Clear(id)).await;
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingMailer {
    recorder: Arc<Recorder>,
    failing_emails: HashSet<String>,
}

#[async_trait]
impl InactivityMailer for RecordingMailer {
    async fn send_inactivity_email(
        &self,
        tier: InactivityTier,
        contact: &InactivityContact,
    ) -> Result<()> {
        self.recorder.push(Call::Send(tier, contact.clone())).await;
        if self.failing_emails.contains(&contact.email) {
            return Err(VigilError::Mail(format!(
                "delivery to {} rejected",
                contact.email
            )));
        }
        Ok(())
    }
}

pub type TestNotifier =
    InactivityNotifier<InMemoryVolunteers, InMemoryAvailability, RecordingMailer>;

/// Builder for a notifier wired to recording fakes.
#[derive(Debug, Default)]
pub struct Harness {
    inactive: Option<InactiveVolunteers>,
    failing_emails: HashSet<String>,
    failing_marks: HashSet<VolunteerId>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inactive(mut self, inactive: InactiveVolunteers) -> Self {
        self.inactive = Some(inactive);
        self
    }

    pub fn failing_email(mut self, email: &str) -> Self {
        self.failing_emails.insert(email.to_string());
        self
    }

    pub fn failing_mark(mut self, id: i64) -> Self {
        self.failing_marks.insert(VolunteerId(id));
        self
    }

    pub fn build(self) -> (TestNotifier, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let notifier = InactivityNotifier::new(
            Arc::new(InMemoryVolunteers {
                recorder: Arc::clone(&recorder),
                inactive: self.inactive,
                failing_marks: self.failing_marks,
            }),
            Arc::new(InMemoryAvailability {
                recorder: Arc::clone(&recorder),
            }),
            Arc::new(RecordingMailer {
                recorder: Arc::clone(&recorder),
                failing_emails: self.failing_emails,
            }),
        );
        (notifier, recorder)
    }
}

pub fn contact(email: &str, first_name: &str) -> InactivityContact {
    InactivityContact {
        email: email.to_string(),
        first_name: first_name.to_string(),
    }
}
