use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed string enumeration: a fixed set of labels, anything else is
/// non-conforming. Implementors expose the label set so callers can embed it
/// verbatim into prompts.
pub trait ClosedEnum: Sized + Copy {
    const LABELS: &'static [&'static str];

    fn parse_label(label: &str) -> Option<Self>;

    fn label(&self) -> &'static str;
}

/// Parse an untrusted label into a closed enumeration, falling back to
/// `default` when the value is missing or outside the set. Used for
/// model-originated fields, where a bad value degrades the field rather than
/// failing the request.
pub fn coerce_or<T: ClosedEnum>(label: Option<&str>, default: T) -> T {
    label.and_then(T::parse_label).unwrap_or(default)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl ClosedEnum for Sentiment {
    const LABELS: &'static [&'static str] = &["positive", "negative", "neutral"];

    fn parse_label(label: &str) -> Option<Self> {
        match label {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl ClosedEnum for Urgency {
    const LABELS: &'static [&'static str] = &["low", "medium", "high"];

    fn parse_label(label: &str) -> Option<Self> {
        match label {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

// ============================================================
// Request / response bodies
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub request_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeResponse {
    pub suggested_response: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

/// One prior turn of an incident conversation, as supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    pub user_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

// ============================================================
// API views of stored records
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentView {
    pub id: i64,
    pub request_text: String,
    pub created_at: DateTime<Utc>,
    pub suggested_response: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

/// Persisted chat turn as returned by the listing endpoint, timestamp
/// rendered as RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageView {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_value(Sentiment::Negative).unwrap();
        assert_eq!(json, "negative");
        let parsed: Sentiment = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, Sentiment::Negative);
    }

    #[test]
    fn sentiment_rejects_out_of_set_value() {
        let err = serde_json::from_str::<Sentiment>(r#""angry""#);
        assert!(err.is_err());
    }

    #[test]
    fn urgency_labels_match_serde_names() {
        for label in Urgency::LABELS {
            let parsed = Urgency::parse_label(label).unwrap();
            assert_eq!(parsed.label(), *label);
            let via_serde: Urgency = serde_json::from_value(serde_json::json!(label)).unwrap();
            assert_eq!(via_serde, parsed);
        }
    }

    #[test]
    fn coerce_or_keeps_recognized_labels() {
        assert_eq!(
            coerce_or(Some("high"), Urgency::Low),
            Urgency::High
        );
        assert_eq!(
            coerce_or(Some("positive"), Sentiment::Neutral),
            Sentiment::Positive
        );
    }

    #[test]
    fn coerce_or_defaults_on_unknown_or_missing() {
        assert_eq!(coerce_or(Some("angry"), Sentiment::Neutral), Sentiment::Neutral);
        assert_eq!(coerce_or(None, Urgency::Low), Urgency::Low);
        assert_eq!(coerce_or(Some(""), Urgency::Low), Urgency::Low);
    }

    #[test]
    fn chat_request_messages_default_to_empty() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"user_message": "hola"}"#).unwrap();
        assert!(req.messages.is_empty());
        assert_eq!(req.user_message, "hola");
    }

    #[test]
    fn analyze_response_round_trips() {
        let resp = AnalyzeResponse {
            suggested_response: "We are on it.".into(),
            sentiment: Sentiment::Negative,
            urgency: Urgency::High,
            tags: vec!["network".into(), "outage".into()],
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: AnalyzeResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);
    }
}
