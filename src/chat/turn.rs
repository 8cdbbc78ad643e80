use std::io::Write;

use anyhow::Error;
use tokio::sync::mpsc;

use crate::chat::context::{current_time_context, needs_time_context};
use crate::chat::history::{HistoryStore, append_and_truncate};
use crate::core::config::AppConfig;
use crate::groq::{Message, Role, completion_stream};

/// Reply shown (and spoken) when the completion request fails. Not
/// added to the persisted history.
pub const FALLBACK_REPLY: &str = "An error occurred while processing your request.";

/// How a turn failed. Completion failures are recoverable within the
/// session; persistence failures are not.
#[derive(Debug)]
pub enum TurnError {
    /// The remote completion call failed. Nothing from this turn was
    /// persisted and the session can continue.
    Completion(Error),
    /// The answer arrived but the history file could not be written.
    Persist(Error),
}

/// Builds the per-turn request envelope: the fixed system prompt, then
/// conditionally the time-context message, then the truncated history
/// (which already ends with the user's query).
pub fn build_envelope(system_prompt: &str, query: &str, history: &[Message]) -> Vec<Message> {
    let mut envelope = vec![Message::new(Role::System, system_prompt)];
    if needs_time_context(query) {
        envelope.push(Message::new(Role::System, &current_time_context()));
    }
    envelope.extend(history.iter().cloned());
    envelope
}

/// Runs one turn: appends the query to the history, streams the
/// completion while printing each fragment as it arrives, then persists
/// the capped transcript ending with the assistant's answer.
pub async fn process_turn(
    config: &AppConfig,
    store: &HistoryStore,
    query: &str,
) -> Result<String, TurnError> {
    let history = append_and_truncate(store.load(), Message::new(Role::User, query));
    let envelope = build_envelope(&config.system_prompt(), query, &history);

    // Progressive display: fragments are printed in arrival order while
    // the stream is still being consumed.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(fragment) = rx.recv().await {
            let _ = write!(stdout, "{}", fragment);
            let _ = stdout.flush();
        }
    });

    let result = completion_stream(
        tx,
        &envelope,
        &config.api_hostname,
        &config.groq_api_key,
        &config.model,
    )
    .await;

    // The sender is dropped by now, so this drains the remaining
    // fragments and ends once the channel closes.
    let _ = printer.await;

    let answer = result.map_err(TurnError::Completion)?;

    let updated = append_and_truncate(history, Message::new(Role::Assistant, &answer));
    store.save(&updated).map_err(TurnError::Persist)?;

    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            username: "Alex".into(),
            assistant_name: "Jarvis".into(),
            groq_api_key: "gsk-test".into(),
            model: "llama3-8b-8192".into(),
            api_hostname: "http://127.0.0.1:1".into(),
            history_path: "ChatLog.json".into(),
            speech_api_url: "http://127.0.0.1:1".into(),
            voice: "en-US-GuyNeural".into(),
            audio_path: "voice.mp3".into(),
        }
    }

    #[test]
    fn it_builds_a_minimal_envelope_for_a_plain_query() {
        let config = test_config();
        let history = vec![Message::new(Role::User, "hello")];

        let envelope = build_envelope(&config.system_prompt(), "hello", &history);

        assert_eq!(envelope.len(), 2);
        assert_eq!(envelope[0].role, Role::System);
        assert_eq!(envelope[0].content, config.system_prompt());
        assert_eq!(envelope[1], Message::new(Role::User, "hello"));
    }

    #[test]
    fn it_injects_time_context_for_time_queries() {
        let config = test_config();
        let history = vec![Message::new(Role::User, "What's the Date today?")];

        let envelope = build_envelope(&config.system_prompt(), "What's the Date today?", &history);

        assert_eq!(envelope.len(), 3);
        assert_eq!(envelope[1].role, Role::System);
        assert!(envelope[1].content.starts_with("Day: "));
        assert!(envelope[1].content.contains("Time: "));
    }

    #[test]
    fn it_places_history_after_the_system_messages() {
        let config = test_config();
        let history = vec![
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "Hello."),
            Message::new(Role::User, "tell me a joke"),
        ];

        let envelope = build_envelope(&config.system_prompt(), "tell me a joke", &history);

        assert_eq!(envelope.len(), 4);
        assert_eq!(envelope[1..], history[..]);
    }
}
