//! **Speech output** — the text-to-speech side of the voice channel.
//!
//! `speak` resolves once the utterance has finished playing. `stop_speak` is fire-and-forget:
//! some engines cannot interrupt, so callers must not assume the stop took effect.

use crate::error::VoiceResult;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Text-to-speech engine. Implement for the platform synthesizer.
#[async_trait::async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`; resolves when audio finishes (or the utterance was cancelled).
    async fn speak(&self, text: &str) -> VoiceResult<()>;

    /// Cancel in-flight speech. Best effort.
    fn stop_speak(&self);
}

/// Headless speech output: records every utterance and finishes after `playback`.
/// Use for demos and tests without an audio device.
#[derive(Debug, Default)]
pub struct PlaceholderSpeech {
    playback: Duration,
    spoken: Mutex<Vec<String>>,
    stops: Mutex<usize>,
}

impl PlaceholderSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate utterances that take `playback` to finish.
    pub fn with_playback(playback: Duration) -> Self {
        Self {
            playback,
            ..Self::default()
        }
    }

    /// Everything spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Spoken utterances that carry content (priming blanks filtered out).
    pub fn spoken_content(&self) -> Vec<String> {
        self.spoken()
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.lock().map(|s| *s).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl SpeechOutput for PlaceholderSpeech {
    async fn speak(&self, text: &str) -> VoiceResult<()> {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
        debug!("[SPEECH] {}", text.trim());
        if !self.playback.is_zero() {
            tokio::time::sleep(self.playback).await;
        }
        Ok(())
    }

    fn stop_speak(&self) {
        if let Ok(mut stops) = self.stops.lock() {
            *stops += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_records_utterances() {
        let speech = PlaceholderSpeech::new();
        speech.speak(" ").await.unwrap();
        speech.speak("버스가 도착했습니다.").await.unwrap();
        speech.stop_speak();
        assert_eq!(speech.spoken().len(), 2);
        assert_eq!(speech.spoken_content(), vec!["버스가 도착했습니다."]);
        assert_eq!(speech.stop_count(), 1);
    }
}
