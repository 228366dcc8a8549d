//! **Speech input** — one recognition session yields text once or stops on silence.

use crate::error::VoiceResult;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Terminal outcome of one recognition session. Exactly one per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// Recognized text.
    Text(String),
    /// The engine stopped on silence / timeout without a result.
    AutoStopped,
}

/// Speech-to-text engine. Implement for the platform recognizer.
#[async_trait::async_trait]
pub trait SpeechInput: Send + Sync {
    /// Listen until a result or an auto-stop.
    async fn recognize(&self) -> VoiceResult<Recognition>;

    /// Cancel the running session. Best effort.
    fn stop_recognition(&self);
}

/// Scripted recognizer: pops queued outcomes after `latency`; an empty queue auto-stops.
#[derive(Debug, Default)]
pub struct PlaceholderRecognizer {
    latency: Duration,
    script: Mutex<VecDeque<Recognition>>,
    started: Mutex<usize>,
    stopped: Mutex<usize>,
}

impl PlaceholderRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Queue a recognized phrase for the next session.
    pub fn push_text(&self, text: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Recognition::Text(text.into()));
        }
    }

    /// Queue a silent session.
    pub fn push_auto_stop(&self) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Recognition::AutoStopped);
        }
    }

    /// Sessions started so far.
    pub fn sessions(&self) -> usize {
        self.started.lock().map(|s| *s).unwrap_or(0)
    }

    pub fn stop_count(&self) -> usize {
        self.stopped.lock().map(|s| *s).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl SpeechInput for PlaceholderRecognizer {
    async fn recognize(&self) -> VoiceResult<Recognition> {
        if let Ok(mut started) = self.started.lock() {
            *started += 1;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        Ok(next.unwrap_or(Recognition::AutoStopped))
    }

    fn stop_recognition(&self) {
        if let Ok(mut stopped) = self.stopped.lock() {
            *stopped += 1;
        }
    }
}
