//! The per-process voice coordinator: announcer, recognition channel and vibration motor
//! behind one handle, so a screen can never talk over itself or listen while talking.

use crate::announcer::Announcer;
use crate::channel::{ChannelState, ListenSession, VoiceChannel};
use crate::haptics::{HapticCue, Vibration};
use crate::input::SpeechInput;
use crate::output::SpeechOutput;
use std::sync::Arc;

pub struct VoiceCoordinator {
    announcer: Announcer,
    channel: VoiceChannel,
    vibration: Arc<dyn Vibration>,
}

impl VoiceCoordinator {
    pub fn new(
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
        vibration: Arc<dyn Vibration>,
    ) -> Self {
        Self {
            announcer: Announcer::new(output.clone()),
            channel: VoiceChannel::new(input, output),
            vibration,
        }
    }

    pub fn announce(&self, text: impl Into<String>) {
        self.announcer.announce(text);
    }

    /// First announcement on a screen: primed, then spoken.
    pub fn announce_primed(&self, text: impl Into<String>) {
        self.announcer.announce_primed(text);
    }

    pub fn announce_then<F>(&self, text: impl Into<String>, done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.announcer.announce_then(text, done);
    }

    pub fn silence(&self) {
        self.announcer.silence();
    }

    pub fn cue(&self, cue: HapticCue) {
        cue.fire(self.vibration.as_ref());
    }

    /// Start a recognition session, cutting off any announcement first.
    pub fn listen(&self, max_chars: usize) -> Option<ListenSession> {
        if self.channel.state() == ChannelState::Listening {
            return None;
        }
        self.announcer.silence();
        self.channel.listen(max_chars)
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }
}
