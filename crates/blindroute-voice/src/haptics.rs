//! Haptic cues. Each event class has its own pulse length so a blind rider can tell
//! them apart by feel alone; lengths strictly increase with the weight of the event.

use std::sync::Mutex;
use std::time::Duration;

/// Vibration motor. Fire-and-forget.
pub trait Vibration: Send + Sync {
    fn vibrate(&self, duration: Duration);
}

/// Feedback events and their pulse lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HapticCue {
    /// Carousel moved to another item.
    SlideChange,
    /// A screen was entered.
    ScreenEntry,
    /// A gesture started an action (search, reserve, listen).
    ActionStart,
    /// The reserved bus arrived.
    Arrival,
}

impl HapticCue {
    pub const ALL: [HapticCue; 4] = [
        HapticCue::SlideChange,
        HapticCue::ScreenEntry,
        HapticCue::ActionStart,
        HapticCue::Arrival,
    ];

    pub fn duration(&self) -> Duration {
        match self {
            HapticCue::SlideChange => Duration::from_millis(200),
            HapticCue::ScreenEntry => Duration::from_millis(500),
            HapticCue::ActionStart => Duration::from_millis(1000),
            HapticCue::Arrival => Duration::from_millis(8000),
        }
    }

    /// Pulse `vibration` with this cue.
    pub fn fire(&self, vibration: &dyn Vibration) {
        vibration.vibrate(self.duration());
    }
}

/// Records pulses instead of driving a motor.
#[derive(Debug, Default)]
pub struct PlaceholderVibration {
    pulses: Mutex<Vec<Duration>>,
}

impl PlaceholderVibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<Duration> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// How many times `cue` was felt.
    pub fn count(&self, cue: HapticCue) -> usize {
        self.pulses()
            .into_iter()
            .filter(|d| *d == cue.duration())
            .count()
    }
}

impl Vibration for PlaceholderVibration {
    fn vibrate(&self, duration: Duration) {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(duration);
        }
    }
}
