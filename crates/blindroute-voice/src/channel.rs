//! **Voice channel** — the single recognition session shared by every screen.
//!
//! `Idle → Listening → (Result | AutoStopped) → Idle`. Starting while listening is a
//! no-op, and every session ends in exactly one outcome unless it is cancelled, in which
//! case it ends in none and the recognizer is told to stop.

use crate::input::{Recognition, SpeechInput};
use crate::output::SpeechOutput;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal outcome of one listening session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// Recognized text, already truncated to the session's character limit.
    Result(String),
    AutoStopped,
}

/// Channel state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Listening,
}

/// Process-wide recognition channel.
pub struct VoiceChannel {
    input: Arc<dyn SpeechInput>,
    output: Arc<dyn SpeechOutput>,
    listening: Arc<AtomicBool>,
}

impl VoiceChannel {
    pub fn new(input: Arc<dyn SpeechInput>, output: Arc<dyn SpeechOutput>) -> Self {
        Self {
            input,
            output,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> ChannelState {
        if self.listening.load(Ordering::SeqCst) {
            ChannelState::Listening
        } else {
            ChannelState::Idle
        }
    }

    /// Open a session whose result keeps at most `max_chars` characters.
    ///
    /// Speech output is stopped first so the recognizer does not hear the app.
    /// Returns `None` when a session is already running.
    pub fn listen(&self, max_chars: usize) -> Option<ListenSession> {
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("[VOICE] listen ignored, session already running");
            return None;
        }
        self.output.stop_speak();
        info!("🎤 [VOICE] listening (max {} chars)", max_chars);
        Some(ListenSession {
            input: self.input.clone(),
            listening: self.listening.clone(),
            max_chars,
            finished: false,
        })
    }
}

/// One running recognition session. Dropping it before it finishes cancels recognition.
pub struct ListenSession {
    input: Arc<dyn SpeechInput>,
    listening: Arc<AtomicBool>,
    max_chars: usize,
    finished: bool,
}

impl ListenSession {
    /// Wait for the session's single outcome. Engine errors count as an auto-stop.
    pub async fn outcome(mut self) -> VoiceOutcome {
        let outcome = match self.input.recognize().await {
            Ok(Recognition::Text(text)) => {
                VoiceOutcome::Result(text.chars().take(self.max_chars).collect())
            }
            Ok(Recognition::AutoStopped) => VoiceOutcome::AutoStopped,
            Err(e) => {
                warn!("[VOICE] recognition failed: {}", e);
                VoiceOutcome::AutoStopped
            }
        };
        self.finished = true;
        self.listening.store(false, Ordering::SeqCst);
        debug!("[VOICE] session ended: {:?}", outcome);
        outcome
    }
}

impl Drop for ListenSession {
    fn drop(&mut self) {
        if !self.finished {
            self.input.stop_recognition();
            self.listening.store(false, Ordering::SeqCst);
            debug!("[VOICE] session cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PlaceholderRecognizer;
    use crate::output::PlaceholderSpeech;
    use std::time::Duration;

    fn channel(latency: Duration) -> (VoiceChannel, Arc<PlaceholderRecognizer>, Arc<PlaceholderSpeech>) {
        let input = Arc::new(PlaceholderRecognizer::with_latency(latency));
        let output = Arc::new(PlaceholderSpeech::new());
        (VoiceChannel::new(input.clone(), output.clone()), input, output)
    }

    #[tokio::test(start_paused = true)]
    async fn second_listen_is_a_noop() {
        let (channel, input, output) = channel(Duration::from_secs(3));
        input.push_text("서울역");

        let session = channel.listen(30).expect("first session");
        assert_eq!(channel.state(), ChannelState::Listening);
        assert!(channel.listen(30).is_none());
        assert_eq!(output.stop_count(), 1);

        assert_eq!(session.outcome().await, VoiceOutcome::Result("서울역".into()));
        assert_eq!(channel.state(), ChannelState::Idle);
        assert_eq!(input.sessions(), 1);
    }

    #[tokio::test]
    async fn result_is_truncated_by_chars() {
        let (channel, input, _) = channel(Duration::ZERO);
        input.push_text("가나다라마바사");
        let outcome = channel.listen(3).unwrap().outcome().await;
        assert_eq!(outcome, VoiceOutcome::Result("가나다".into()));
    }

    #[tokio::test]
    async fn silence_auto_stops() {
        let (channel, _, _) = channel(Duration::ZERO);
        let outcome = channel.listen(100).unwrap().outcome().await;
        assert_eq!(outcome, VoiceOutcome::AutoStopped);
        assert!(channel.listen(100).is_some());
    }

    #[tokio::test]
    async fn dropped_session_stops_recognizer() {
        let (channel, input, _) = channel(Duration::ZERO);
        let session = channel.listen(30).unwrap();
        drop(session);
        assert_eq!(input.stop_count(), 1);
        assert_eq!(channel.state(), ChannelState::Idle);
    }
}
