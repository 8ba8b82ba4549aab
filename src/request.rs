//! Chat completion request body
//!
//! Field names follow the Chat Completions wire format. Optional sampling
//! parameters are omitted from the JSON body when unset.

use crate::message::ChatMessage;
use serde::Serialize;

/// Validate ChatCompletionRequest fields
///
/// Shared by the builder and by config validation so both reject the same
/// values.
pub(crate) fn validate_request_fields(
    messages: &[ChatMessage],
    max_tokens: u32,
    temperature: Option<f64>,
    presence_penalty: Option<f64>,
    frequency_penalty: Option<f64>,
) -> Result<(), String> {
    if messages.is_empty() {
        return Err("messages array cannot be empty".to_string());
    }

    if let Some(empty) = messages.iter().find(|m| m.content().trim().is_empty()) {
        return Err(format!("{} message content cannot be empty", empty.role()));
    }

    if max_tokens == 0 {
        return Err("max_tokens must be greater than 0".to_string());
    }

    if let Some(temp) = temperature {
        if !temp.is_finite() {
            return Err("temperature must be a finite number".to_string());
        }
        if !(0.0..=2.0).contains(&temp) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
    }

    for (name, value) in [
        ("presence_penalty", presence_penalty),
        ("frequency_penalty", frequency_penalty),
    ] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(format!("{} must be a finite number", name));
            }
            if !((-2.0)..=2.0).contains(&v) {
                return Err(format!("{} must be between -2.0 and 2.0", name));
            }
        }
    }

    Ok(())
}

/// Chat completion request sent to the remote endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f64>,
}

/// Builder for [`ChatCompletionRequest`]
///
/// # Examples
///
/// ```
/// use azprompt::message::ChatMessage;
/// use azprompt::request::ChatCompletionRequest;
///
/// let request = ChatCompletionRequest::builder()
///     .message(ChatMessage::system("You are a helpful assistant."))
///     .message(ChatMessage::user("Hello!"))
///     .model("gpt-4o")
///     .max_tokens(1000)
///     .build()
///     .expect("valid request");
/// assert_eq!(request.max_tokens(), 1000);
/// ```
#[derive(Debug, Default)]
pub struct ChatCompletionRequestBuilder {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    presence_penalty: Option<f64>,
    frequency_penalty: Option<f64>,
}

impl ChatCompletionRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single message to the request
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace all messages with the provided vector
    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the `model` body field
    ///
    /// Leave unset when the deployment is already addressed by the URL.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn presence_penalty(mut self, presence_penalty: Option<f64>) -> Self {
        self.presence_penalty = presence_penalty;
        self
    }

    pub fn frequency_penalty(mut self, frequency_penalty: Option<f64>) -> Self {
        self.frequency_penalty = frequency_penalty;
        self
    }

    /// Build the request, performing all validation
    ///
    /// # Errors
    /// Returns an error string if any field is out of range or `max_tokens`
    /// was never set.
    pub fn build(self) -> Result<ChatCompletionRequest, String> {
        let max_tokens = self
            .max_tokens
            .ok_or_else(|| "max_tokens must be set".to_string())?;

        validate_request_fields(
            &self.messages,
            max_tokens,
            self.temperature,
            self.presence_penalty,
            self.frequency_penalty,
        )?;

        Ok(ChatCompletionRequest {
            messages: self.messages,
            model: self.model,
            max_tokens,
            temperature: self.temperature,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        })
    }
}

impl ChatCompletionRequest {
    pub fn builder() -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::new()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }
}
