//! Blindroute voice: the gesture/voice coordination layer of the guided screens.
//!
//! ## Architecture
//!
//! - **SpeechOutput / SpeechInput / Vibration**: traits over the platform engines, each
//!   with a placeholder implementation for headless runs.
//! - **Announcer**: one utterance at a time, first-visit priming.
//! - **VoiceChannel**: the single recognition session (`Idle → Listening → outcome → Idle`).
//! - **SwipeDetector**: pointer events to swipes and taps.
//! - **VoiceCoordinator**: all of the above behind one handle per process.

pub mod announcer;
pub mod channel;
pub mod coordinator;
pub mod error;
pub mod gesture;
pub mod haptics;
pub mod input;
pub mod output;
pub mod task;

pub use announcer::{prime, Announcer, PRIMING_STEP, PRIMING_WINDOW};
pub use channel::{ChannelState, ListenSession, VoiceChannel, VoiceOutcome};
pub use coordinator::VoiceCoordinator;
pub use error::{VoiceError, VoiceResult};
pub use gesture::{
    Gesture, PointerEvent, PointerPhase, PointerSource, SwipeDetector, SwipeDirection,
    SwipeIntent, DEFAULT_SWIPE_DELTA,
};
pub use haptics::{HapticCue, PlaceholderVibration, Vibration};
pub use input::{PlaceholderRecognizer, Recognition, SpeechInput};
pub use output::{PlaceholderSpeech, SpeechOutput};
pub use task::AbortOnDrop;
