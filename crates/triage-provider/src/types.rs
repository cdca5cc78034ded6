use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMsg {
    pub role: String,
    pub content: String,
}

impl ChatMsg {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMsg>,
    #[serde(default)]
    pub temperature: f64,
    /// When set, the backend is asked for a JSON-object response format, i.e.
    /// the model must emit a single valid JSON object.
    #[serde(default)]
    pub json_mode: bool,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    1024
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: 0.0,
            json_mode: false,
            max_tokens: default_max_tokens(),
        }
    }

    pub fn with_message(mut self, msg: ChatMsg) -> Self {
        self.messages.push(msg);
        self
    }

    pub fn with_messages(mut self, msgs: impl IntoIterator<Item = ChatMsg>) -> Self {
        self.messages.extend(msgs);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn json_object(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_messages_in_order() {
        let req = ChatCompletionRequest::new("gpt-4o-mini")
            .with_message(ChatMsg::system("context"))
            .with_messages(vec![ChatMsg::user("q1"), ChatMsg::assistant("a1")])
            .with_message(ChatMsg::user("q2"));
        let roles: Vec<&str> = req.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(req.temperature, 0.0);
        assert!(!req.json_mode);
    }

    #[test]
    fn json_object_sets_flag() {
        let req = ChatCompletionRequest::new("m").json_object().with_temperature(0.2);
        assert!(req.json_mode);
        assert_eq!(req.temperature, 0.2);
    }

    #[test]
    fn chat_msg_constructors_set_roles() {
        assert_eq!(ChatMsg::system("s").role, "system");
        assert_eq!(ChatMsg::user("u").role, "user");
        assert_eq!(ChatMsg::assistant("a").role, "assistant");
    }
}
