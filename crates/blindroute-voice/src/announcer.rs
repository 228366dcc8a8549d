//! Spoken announcements: one intended utterance at a time.
//!
//! A new announcement replaces the one in flight. The first announcement on a screen is
//! preceded by a priming pause (a blank utterance every 50 ms for 700 ms) that wakes the
//! platform synthesizer before the real guidance is read.

use crate::output::SpeechOutput;
use crate::task::AbortOnDrop;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

pub const PRIMING_WINDOW: Duration = Duration::from_millis(700);
pub const PRIMING_STEP: Duration = Duration::from_millis(50);

/// Speak blanks through the priming window. Returns once the window has elapsed.
pub async fn prime(output: &dyn SpeechOutput) {
    let deadline = tokio::time::Instant::now() + PRIMING_WINDOW;
    let mut ticker = tokio::time::interval(PRIMING_STEP);
    for _ in 0..(PRIMING_WINDOW.as_millis() / PRIMING_STEP.as_millis()) {
        ticker.tick().await;
        let _ = tokio::time::timeout(PRIMING_STEP, output.speak(" ")).await;
    }
    tokio::time::sleep_until(deadline).await;
}

pub struct Announcer {
    output: Arc<dyn SpeechOutput>,
    current: Mutex<Option<AbortOnDrop<()>>>,
}

impl Announcer {
    pub fn new(output: Arc<dyn SpeechOutput>) -> Self {
        Self {
            output,
            current: Mutex::new(None),
        }
    }

    pub fn output(&self) -> Arc<dyn SpeechOutput> {
        self.output.clone()
    }

    /// Speak `text`, replacing whatever is being spoken.
    pub fn announce(&self, text: impl Into<String>) {
        self.announce_inner(text.into(), false, None);
    }

    /// Prime the synthesizer, then speak `text`.
    pub fn announce_primed(&self, text: impl Into<String>) {
        self.announce_inner(text.into(), true, None);
    }

    /// Speak `text` and run `done` once the utterance ends, whether it played out or was
    /// replaced or silenced first. `done` runs exactly once.
    pub fn announce_then<F>(&self, text: impl Into<String>, done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.announce_inner(text.into(), false, Some(Box::new(done)));
    }

    /// Cancel the utterance in flight.
    pub fn silence(&self) {
        if let Some(previous) = self.take_current() {
            if !previous.is_finished() {
                self.output.stop_speak();
            }
        }
    }

    fn take_current(&self) -> Option<AbortOnDrop<()>> {
        self.current.lock().ok().and_then(|mut c| c.take())
    }

    fn announce_inner(&self, text: String, primed: bool, done: Option<Box<dyn FnOnce() + Send>>) {
        self.silence();
        let output = self.output.clone();
        let task = AbortOnDrop::spawn(async move {
            let _follow_up = FollowUp(done);
            if primed {
                prime(output.as_ref()).await;
            }
            debug!("🔊 [ANNOUNCE] {}", text.trim());
            if let Err(e) = output.speak(&text).await {
                warn!("[ANNOUNCE] speech failed: {}", e);
            }
        });
        if let Ok(mut current) = self.current.lock() {
            *current = Some(task);
        }
    }
}

/// Runs the follow-up of an utterance when its task ends or is aborted.
struct FollowUp(Option<Box<dyn FnOnce() + Send>>);

impl Drop for FollowUp {
    fn drop(&mut self) {
        if let Some(done) = self.0.take() {
            done();
        }
    }
}

impl Drop for Announcer {
    fn drop(&mut self) {
        self.silence();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PlaceholderSpeech;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn primed_announcement_waits_for_window() {
        let speech = Arc::new(PlaceholderSpeech::new());
        let announcer = Announcer::new(speech.clone());
        announcer.announce_primed("정류장 검색 페이지입니다.");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(speech.spoken_content().is_empty());
        assert!(!speech.spoken().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(speech.spoken_content(), vec!["정류장 검색 페이지입니다."]);
        assert_eq!(speech.spoken().len(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn replacement_still_runs_the_callback() {
        let speech = Arc::new(PlaceholderSpeech::with_playback(Duration::from_secs(2)));
        let announcer = Announcer::new(speech.clone());
        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        announcer.announce_then("버스 예약을 취소하였습니다.", move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        announcer.announce("다른 안내");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(speech.stop_count(), 1);
        assert_eq!(speech.spoken_content().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_runs_after_playback() {
        let speech = Arc::new(PlaceholderSpeech::with_playback(Duration::from_secs(2)));
        let announcer = Announcer::new(speech.clone());
        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        announcer.announce_then("하차 예약이 완료되었습니다.", move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(speech.stop_count(), 0);
    }
}
