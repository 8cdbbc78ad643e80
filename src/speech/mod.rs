use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::process::Command;

use crate::core::config::AppConfig;

/// Thin wrapper over the external TTS service and the platform media
/// player. Synthesis writes the audio artifact to a fixed path, then
/// playback is launched as a detached child process.
pub struct SpeechNotifier {
    api_url: String,
    voice: String,
    audio_path: PathBuf,
}

impl SpeechNotifier {
    pub fn new(config: &AppConfig) -> Self {
        SpeechNotifier {
            api_url: config.speech_api_url.clone(),
            voice: config.voice.clone(),
            audio_path: PathBuf::from(&config.audio_path),
        }
    }

    /// Speaks `text`. A voice failure must never end the session, so
    /// every error is logged and swallowed here.
    pub async fn notify(&self, text: &str) {
        if let Err(e) = self.synthesize(text).await {
            tracing::error!("Voice synthesis failed: {:#}", e);
            return;
        }
        if let Err(e) = self.play() {
            tracing::error!("Audio playback failed: {:#}", e);
        }
    }

    async fn synthesize(&self, text: &str) -> Result<()> {
        let payload = json!({
            "text": text,
            "voice": self.voice,
        });
        let audio = reqwest::Client::new()
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(60))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        std::fs::write(&self.audio_path, &audio).with_context(|| {
            format!("Failed to write audio to {}", self.audio_path.display())
        })?;
        Ok(())
    }

    /// Launches the platform media player on the audio artifact without
    /// waiting for playback to finish.
    fn play(&self) -> Result<()> {
        let mut command = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]).arg(&self.audio_path);
            c
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(&self.audio_path);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(&self.audio_path);
            c
        };

        command
            .spawn()
            .context("Failed to launch the media player")?;
        Ok(())
    }
}
