//! Rendering of the completion response to stdout

use crate::client::CompletionResponse;
use crate::config::OutputFormat;
use crate::error::AppResult;
use crate::message::Role;
use std::io::Write;

/// Written by the summary format when the response has no message content
pub const NO_RESPONSE: &str = "No response received.";
const SUMMARY_SEPARATOR: &str = "-------------------------";

/// Write the response in the requested format
///
/// `Raw` writes the body text exactly as received. The JSON formats end
/// with a newline.
pub fn render<W: Write>(
    out: &mut W,
    response: &CompletionResponse,
    format: OutputFormat,
) -> AppResult<()> {
    let body = response.body();
    match format {
        OutputFormat::Raw => out.write_all(response.raw().as_bytes())?,
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut *out, body).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => write_summary(out, body)?,
    }
    out.flush()?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, body: &serde_json::Value) -> std::io::Result<()> {
    let message = &body["choices"][0]["message"];
    let content = message["content"].as_str().filter(|c| !c.is_empty());

    let Some(content) = content else {
        return writeln!(out, "{}", NO_RESPONSE);
    };

    let role = message["role"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| Role::Assistant.to_string());
    writeln!(out, "{}: {}", role, content)?;
    writeln!(out, "{}", SUMMARY_SEPARATOR)?;
    match body.get("usage") {
        Some(usage) => writeln!(out, "{}", usage)?,
        None => writeln!(out, "null")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn from_json(body: serde_json::Value) -> CompletionResponse {
        CompletionResponse::parse(Uuid::new_v4(), body.to_string()).unwrap()
    }

    fn sample() -> CompletionResponse {
        from_json(json!({
            "id": "cmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Space Needle"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        }))
    }

    fn render_to_string(response: &CompletionResponse, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        render(&mut buf, response, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_raw_writes_received_text_unchanged() {
        let received = "{\"object\": \"chat.completion\",\n \"id\": \"x\", \"choices\": []}";
        let response = CompletionResponse::parse(Uuid::new_v4(), received.to_string()).unwrap();
        let out = render_to_string(&response, OutputFormat::Raw);
        assert_eq!(out, received);
    }

    #[test]
    fn test_pretty_round_trips_body() {
        let out = render_to_string(&sample(), OutputFormat::Pretty);
        assert!(out.lines().count() > 1);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(&parsed, sample().body());
    }

    #[test]
    fn test_summary_prints_content_and_usage() {
        let out = render_to_string(&sample(), OutputFormat::Summary);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "assistant: Space Needle");
        assert_eq!(lines[1], SUMMARY_SEPARATOR);
        let usage: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(usage["total_tokens"], 13);
    }

    #[test]
    fn test_summary_defaults_missing_role_to_assistant() {
        let response = from_json(json!({"choices": [{"message": {"content": "hi"}}]}));
        let out = render_to_string(&response, OutputFormat::Summary);
        assert!(out.starts_with("assistant: hi\n"), "got: {}", out);
    }

    #[test]
    fn test_summary_without_choices() {
        let response = from_json(json!({"choices": []}));
        let out = render_to_string(&response, OutputFormat::Summary);
        assert_eq!(out, "No response received.\n");
    }
}
