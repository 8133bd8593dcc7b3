use serde::{Deserialize, Serialize};

/// Payload the scheduler hands to the inactivity job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityJobPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

impl InactivityJobPayload {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// The requested reference date. Only an absent `startDate` means "now";
    /// a blank one is passed through and rejected when parsed.
    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }
}
