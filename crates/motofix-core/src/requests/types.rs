//! Request records and the create payload

use crate::error::{MotofixError, MotofixResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a breakdown request, owned by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Waiting for a mechanic",
            Self::Accepted => "Mechanic assigned",
            Self::InProgress => "Help on the way",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// No further changes expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = MotofixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                MotofixError::invalid_field("status", format!("Unknown request status '{}'", s))
            })
    }
}

/// A breakdown request as stored by the requests service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(deserialize_with = "crate::utils::string_or_number")]
    pub id: String,
    #[serde(alias = "requester_name", alias = "name")]
    pub requester_name: String,
    pub phone: String,
    #[serde(alias = "location_text", alias = "location")]
    pub location_text: String,
    #[serde(alias = "issue_text", alias = "issue", alias = "description")]
    pub issue_text: String,
    pub status: RequestStatus,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "media")]
    pub attachments: Vec<String>,
}

/// Payload for creating a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub requester_name: String,
    pub phone: String,
    pub location_text: String,
    pub issue_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl NewRequest {
    pub fn new(
        requester_name: impl Into<String>,
        phone: impl Into<String>,
        location_text: impl Into<String>,
        issue_text: impl Into<String>,
    ) -> Self {
        Self {
            requester_name: requester_name.into(),
            phone: phone.into(),
            location_text: location_text.into(),
            issue_text: issue_text.into(),
            latitude: None,
            longitude: None,
        }
    }

    /// Attach the GPS position the location text was derived from
    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Check the form locally before anything is sent
    pub fn validate(&self) -> MotofixResult<()> {
        let fields = [
            ("requesterName", &self.requester_name, "Please enter your name"),
            ("phone", &self.phone, "Please enter a phone number"),
            ("locationText", &self.location_text, "Please describe where you are"),
            ("issueText", &self.issue_text, "Please describe the problem"),
        ];
        for (field, value, message) in fields {
            if value.trim().is_empty() {
                return Err(MotofixError::invalid_field(field, message));
            }
        }

        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(MotofixError::invalid_field(
                "latitude",
                "Latitude and longitude must be given together",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("in-progress".parse::<RequestStatus>().unwrap(), RequestStatus::InProgress);
        assert_eq!("Cancelled".parse::<RequestStatus>().unwrap(), RequestStatus::Cancelled);
        assert!("towed".parse::<RequestStatus>().is_err());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(!RequestStatus::Accepted.is_terminal());
    }

    #[test]
    fn test_request_from_snake_case_server() {
        let record: ServiceRequest = serde_json::from_str(
            r#"{
                "id": 17,
                "requester_name": "Okello",
                "phone": "+256700000000",
                "location": "Jinja Road",
                "issue": "Flat tyre",
                "status": "in_progress",
                "created_at": "2024-03-01T10:15:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.location_text, "Jinja Road");
        assert_eq!(record.status, RequestStatus::InProgress);
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn test_new_request_validation() {
        let ok = NewRequest::new("Okello", "+256700000000", "Jinja Road", "Flat tyre");
        assert!(ok.validate().is_ok());

        let missing = NewRequest::new("Okello", "+256700000000", "   ", "Flat tyre");
        assert!(matches!(
            missing.validate(),
            Err(MotofixError::Validation { ref field, .. }) if field.as_deref() == Some("locationText")
        ));

        let mut half = ok.clone();
        half.latitude = Some(0.3);
        assert!(half.validate().is_err());
    }

    #[test]
    fn test_new_request_serializes_camel_case() {
        let payload = NewRequest::new("A", "+256700000000", "B", "C").with_position(0.3, 32.5);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["requesterName"], "A");
        assert_eq!(value["latitude"], 0.3);

        let bare = serde_json::to_value(NewRequest::new("A", "B", "C", "D")).unwrap();
        assert!(bare.get("latitude").is_none());
    }
}
