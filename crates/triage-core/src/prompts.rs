use triage_schema::{ClosedEnum, Sentiment, Urgency};
use triage_store::Incident;

fn quoted_labels<T: ClosedEnum>() -> String {
    T::LABELS
        .iter()
        .map(|l| format!("'{l}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// System prompt for the classification call. Embeds the exact allowed labels
/// and one worked example so the model has no excuse to improvise.
pub fn analysis_system_prompt() -> String {
    format!(
        r#"You are an expert incident analyst. Analyze the text of a request or incident
report and provide a suggested response, classify its sentiment and urgency, and
generate relevant tags.
The output must be a JSON object with the following keys:
- 'suggested_response': A concise, helpful response to the incident.
- 'sentiment': Classify the sentiment using one of these values: {sentiments}.
- 'urgency': Classify the urgency using one of these values: {urgencies}.
- 'tags': A list of strings with keywords relevant to the incident.

Example of the expected JSON format:
{{
    "suggested_response": "We have received your report about the service interruption. We are investigating the cause.",
    "sentiment": "{negative}",
    "urgency": "{high}",
    "tags": ["service", "interruption", "support", "network"]
}}"#,
        sentiments = quoted_labels::<Sentiment>(),
        urgencies = quoted_labels::<Urgency>(),
        negative = Sentiment::Negative.label(),
        high = Urgency::High.label(),
    )
}

/// System prompt for follow-up chat: restates the stored incident so the
/// model answers about this one, not incidents in general.
pub fn chat_system_prompt(incident: &Incident) -> String {
    format!(
        r#"You are an expert incident assistant. The user is asking about the following incident:
---
Request: {request}
Suggested response: {suggested}
Sentiment: {sentiment}
Urgency: {urgency}
Tags: {tags}
---
Answer the user's questions about this incident clearly and helpfully."#,
        request = incident.request_text,
        suggested = incident.suggested_response,
        sentiment = incident.sentiment.label(),
        urgency = incident.urgency.label(),
        tags = incident.tags.join(", "),
    )
}
