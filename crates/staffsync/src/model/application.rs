//! Job applications attached to a registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text status value that marks an application as an interview.
///
/// An interview is not a separate entity; it is any application whose
/// status equals this literal, read at query time.
pub const INTERVIEW_STATUS: &str = "Interview";

/// One job application belonging to exactly one registration.
///
/// The whole collection lives at `applications/{clientId}/{registrationId}`
/// as an array and is replaced wholesale on edit or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub company: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Job boards the posting was found on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    /// Free text; `"Interview"` is treated specially at query time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Blob-store references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl JobApplication {
    pub fn new(company: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            title: title.into(),
            job_id: None,
            boards: Vec::new(),
            applied_at: None,
            status: None,
            attachments: Vec::new(),
        }
    }

    /// Whether this application is currently at the interview stage.
    pub fn is_interview(&self) -> bool {
        self.status.as_deref() == Some(INTERVIEW_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_interview_exact_literal() {
        let mut app = JobApplication::new("Acme", "Backend Engineer");
        assert!(!app.is_interview());

        app.status = Some("Interview".to_string());
        assert!(app.is_interview());

        // The match is literal, not case-insensitive.
        app.status = Some("interview".to_string());
        assert!(!app.is_interview());
    }

    #[test]
    fn test_collection_roundtrip() {
        let apps = vec![
            JobApplication::new("Acme", "Backend Engineer"),
            JobApplication {
                status: Some(INTERVIEW_STATUS.to_string()),
                ..JobApplication::new("Globex", "Data Analyst")
            },
        ];
        let value = serde_json::to_value(&apps).unwrap();
        let parsed: Vec<JobApplication> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, apps);
        assert_eq!(parsed.iter().filter(|a| a.is_interview()).count(), 1);
    }
}
