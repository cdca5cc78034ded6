use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_schema::{ChatMessageView, IncidentView, Sentiment, Urgency};

/// A stored incident: the original request plus the model's classification.
/// Created once by the analysis flow, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub request_text: String,
    pub created_at: DateTime<Utc>,
    pub suggested_response: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

impl From<Incident> for IncidentView {
    fn from(incident: Incident) -> Self {
        IncidentView {
            id: incident.id,
            request_text: incident.request_text,
            created_at: incident.created_at,
            suggested_response: incident.suggested_response,
            sentiment: incident.sentiment,
            urgency: incident.urgency,
            tags: incident.tags,
        }
    }
}

/// Fields for an incident insert; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub request_text: String,
    pub suggested_response: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub incident_id: i64,
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageView {
    fn from(msg: ChatMessage) -> Self {
        ChatMessageView {
            role: msg.role,
            content: msg.content,
            timestamp: msg.timestamp.to_rfc3339(),
        }
    }
}
