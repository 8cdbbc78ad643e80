use std::env;

use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "llama3-8b-8192";
const DEFAULT_API_HOSTNAME: &str = "https://api.groq.com";
const DEFAULT_SPEECH_API_URL: &str = "http://127.0.0.1:5002/api/tts";
const DEFAULT_VOICE: &str = "en-US-GuyNeural";
const DEFAULT_HISTORY_PATH: &str = "ChatLog.json";
const DEFAULT_AUDIO_PATH: &str = "voice.mp3";

/// Process-wide configuration, built once at startup and passed by
/// reference to every component. Never mutated after construction.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub username: String,
    pub assistant_name: String,
    pub groq_api_key: String,
    pub model: String,
    pub api_hostname: String,
    pub history_path: String,
    pub speech_api_url: String,
    pub voice: String,
    pub audio_path: String,
}

impl AppConfig {
    /// Reads configuration from the process environment. A missing
    /// required key aborts startup with an error naming the key.
    pub fn from_env() -> Result<Self> {
        let username = env::var("Username").context("Missing required env var Username")?;
        let assistant_name =
            env::var("Assistantname").context("Missing required env var Assistantname")?;
        let groq_api_key =
            env::var("GroqAPIKey").context("Missing required env var GroqAPIKey")?;
        let model = env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        // Overridable so a local OpenAI-compatible server can stand in
        // for the hosted API.
        let api_hostname =
            env::var("GROQ_API_HOSTNAME").unwrap_or_else(|_| DEFAULT_API_HOSTNAME.to_string());
        let speech_api_url =
            env::var("SPEECH_API_URL").unwrap_or_else(|_| DEFAULT_SPEECH_API_URL.to_string());
        let voice = env::var("SPEECH_VOICE").unwrap_or_else(|_| DEFAULT_VOICE.to_string());

        Ok(Self {
            username,
            assistant_name,
            groq_api_key,
            model,
            api_hostname,
            history_path: DEFAULT_HISTORY_PATH.to_string(),
            speech_api_url,
            voice,
            audio_path: DEFAULT_AUDIO_PATH.to_string(),
        })
    }

    /// The fixed instruction message prepended to every request.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}, a professional AI assistant speaking to {}.\n\
             \n\
             Guidelines:\n\
             - Maintain a clear, concise, and authoritative tone.\n\
             - Avoid casual fillers.\n\
             - Deliver information with precision.\n\
             - Keep responses structured and professional.\n\
             - Reply only in English.",
            self.assistant_name, self.username
        )
    }
}
