use std::time::Duration;

use anyhow::{Error, Result, bail};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;

/// Completion request parameters fixed for every turn.
const MAX_COMPLETION_TOKENS: u32 = 1024;
const TEMPERATURE: f64 = 0.5;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Delta {
    Content { content: String },

    Stop {},
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    #[allow(dead_code)]
    index: usize,
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[allow(dead_code)]
    id: String,
    #[allow(dead_code)]
    created: usize,
    #[allow(dead_code)]
    model: String,
    choices: Vec<CompletionChunkChoice>,
}

/// Streams the next chat completion for `messages`. Each content delta
/// is forwarded through `tx` in arrival order as it comes off the wire
/// and the concatenated answer is returned once the stream ends. Any
/// transport error, non-success status, or malformed chunk mid-stream
/// fails the whole call; partial text already sent through `tx` is not
/// retracted.
pub async fn completion_stream(
    tx: mpsc::UnboundedSender<String>,
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<String, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "max_tokens": MAX_COMPLETION_TOKENS,
        "temperature": TEMPERATURE,
        "stream": true,
    });
    // Groq exposes the OpenAI-compatible API under /openai
    let url = format!(
        "{}/openai/v1/chat/completions",
        api_hostname.trim_end_matches("/")
    );
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 5))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?;

    let mut stream = response.bytes_stream();

    let mut answer = String::new();
    let mut buffer = String::new();

    'outer: while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk_str = std::str::from_utf8(&chunk)?;

        // Append new data to buffer. This is necessary to handle SSE
        // fragmentation over HTTP/2 frames.
        buffer.push_str(chunk_str);

        // Process all complete SSE events from the buffer
        while let Some(event_end) = buffer.find("\n\n") {
            let event_data = buffer[..event_end].to_string();
            buffer = buffer[event_end + 2..].to_string();

            let event_data = event_data.trim();
            if event_data.is_empty() {
                continue;
            }

            // Parse SSE events
            if !event_data.starts_with("data: ") {
                continue;
            }

            // Extract the JSON payload (after "data: ")
            let data = event_data[6..].trim();
            if data.is_empty() {
                continue;
            }

            // Handle the end of the stream
            if data == "[DONE]" {
                break 'outer;
            }

            let chunk = serde_json::from_str::<CompletionChunk>(data).inspect_err(|e| {
                tracing::error!("Parsing completion chunk failed for {}\nError:{}", data, e)
            })?;
            let Some(choice) = chunk.choices.first() else {
                bail!("Completion chunk missing choices: {}", data);
            };

            match &choice.delta {
                Delta::Content { content } => {
                    if !content.is_empty() {
                        answer += content;
                        // The result is ignored here because a dropped
                        // receiver should not fail the completion
                        let _ = tx.send(content.clone());
                    }
                    if choice.finish_reason.is_some() {
                        break 'outer;
                    }
                }
                Delta::Stop {} => {
                    if choice.finish_reason.is_some() {
                        break 'outer;
                    }
                }
            }
        }
    }

    Ok(answer)
}
