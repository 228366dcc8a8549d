//! Swipe detection over raw pointer events, touch and mouse alike.
//!
//! A gesture is classified on release: if the travel on both axes stays under the
//! minimum delta it is a tap, otherwise a swipe along the dominant axis.

use tracing::trace;

/// Minimum travel in pixels before a pointer gesture counts as a swipe.
pub const DEFAULT_SWIPE_DELTA: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Touch,
    Mouse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub source: PointerSource,
}

impl PointerEvent {
    pub fn touch(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            source: PointerSource::Touch,
        }
    }

    pub fn mouse(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            source: PointerSource::Mouse,
        }
    }
}

/// Direction the finger travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// What a gesture means on a guided screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeIntent {
    /// Left swipe: confirm / continue.
    Forward,
    /// Right swipe: go back.
    Backward,
    /// Up swipe: next carousel item.
    NextItem,
    /// Down swipe: previous carousel item.
    PreviousItem,
}

impl SwipeDirection {
    pub fn intent(&self) -> SwipeIntent {
        match self {
            SwipeDirection::Left => SwipeIntent::Forward,
            SwipeDirection::Right => SwipeIntent::Backward,
            SwipeDirection::Up => SwipeIntent::NextItem,
            SwipeDirection::Down => SwipeIntent::PreviousItem,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Swipe(SwipeDirection),
    /// Pointer released within the delta; position is where it went down.
    Tap { x: f32, y: f32 },
}

/// Stateful detector; feed it every pointer event of one surface.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    delta: f32,
    track_mouse: bool,
    origin: Option<(f32, f32)>,
    last: (f32, f32),
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_DELTA, true)
    }
}

impl SwipeDetector {
    pub fn new(delta: f32, track_mouse: bool) -> Self {
        Self {
            delta,
            track_mouse,
            origin: None,
            last: (0.0, 0.0),
        }
    }

    /// Returns a gesture when `event` completes one.
    pub fn feed(&mut self, event: PointerEvent) -> Option<Gesture> {
        if event.source == PointerSource::Mouse && !self.track_mouse {
            return None;
        }
        match event.phase {
            PointerPhase::Down => {
                self.origin = Some((event.x, event.y));
                self.last = (event.x, event.y);
                None
            }
            PointerPhase::Move => {
                if self.origin.is_some() {
                    self.last = (event.x, event.y);
                }
                None
            }
            PointerPhase::Up => {
                let (ox, oy) = self.origin.take()?;
                let (dx, dy) = (event.x - ox, event.y - oy);
                let gesture = self.classify(dx, dy, ox, oy);
                trace!("[GESTURE] dx={} dy={} -> {:?}", dx, dy, gesture);
                Some(gesture)
            }
        }
    }

    /// Drop a gesture in progress (e.g. the pointer left the surface).
    pub fn reset(&mut self) {
        self.origin = None;
    }

    fn classify(&self, dx: f32, dy: f32, ox: f32, oy: f32) -> Gesture {
        let (ax, ay) = (dx.abs(), dy.abs());
        if ax < self.delta && ay < self.delta {
            return Gesture::Tap { x: ox, y: oy };
        }
        let direction = if ax > ay {
            if dx < 0.0 {
                SwipeDirection::Left
            } else {
                SwipeDirection::Right
            }
        } else if dy < 0.0 {
            SwipeDirection::Up
        } else {
            SwipeDirection::Down
        };
        Gesture::Swipe(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PointerPhase::*;

    fn drag(detector: &mut SwipeDetector, from: (f32, f32), to: (f32, f32), mouse: bool) -> Option<Gesture> {
        let make = if mouse { PointerEvent::mouse } else { PointerEvent::touch };
        detector.feed(make(Down, from.0, from.1));
        detector.feed(make(Move, (from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
        detector.feed(make(Up, to.0, to.1))
    }

    #[test]
    fn left_swipe_is_forward() {
        let mut d = SwipeDetector::default();
        let g = drag(&mut d, (200.0, 300.0), (80.0, 310.0), false);
        assert_eq!(g, Some(Gesture::Swipe(SwipeDirection::Left)));
        assert_eq!(SwipeDirection::Left.intent(), SwipeIntent::Forward);
        assert_eq!(SwipeDirection::Right.intent(), SwipeIntent::Backward);
    }

    #[test]
    fn vertical_swipes_move_the_carousel() {
        let mut d = SwipeDetector::default();
        assert_eq!(
            drag(&mut d, (100.0, 400.0), (105.0, 200.0), false),
            Some(Gesture::Swipe(SwipeDirection::Up))
        );
        assert_eq!(
            drag(&mut d, (100.0, 200.0), (95.0, 400.0), false),
            Some(Gesture::Swipe(SwipeDirection::Down))
        );
    }

    #[test]
    fn short_travel_is_a_tap() {
        let mut d = SwipeDetector::default();
        assert_eq!(
            drag(&mut d, (50.0, 50.0), (56.0, 47.0), false),
            Some(Gesture::Tap { x: 50.0, y: 50.0 })
        );
    }

    #[test]
    fn mouse_ignored_unless_tracked() {
        let mut tracked = SwipeDetector::default();
        assert!(drag(&mut tracked, (200.0, 0.0), (0.0, 0.0), true).is_some());

        let mut untracked = SwipeDetector::new(DEFAULT_SWIPE_DELTA, false);
        assert!(drag(&mut untracked, (200.0, 0.0), (0.0, 0.0), true).is_none());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut d = SwipeDetector::default();
        assert!(d.feed(PointerEvent::touch(Up, 0.0, 0.0)).is_none());
    }
}
