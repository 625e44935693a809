//! Temporal smoothing of per-frame readings.
//!
//! Single frames misclassify; the game never acts on one.  Two consumers
//! share the same bounded FIFO:
//!
//! * [`TriggerDetector`] — starts a round only after a full window of
//!   confident rock/paper readings.
//! * [`RevealCollector`] — gathers readings while the paw is revealed and
//!   settles on the plurality, with a guaranteed fallback.

use std::collections::VecDeque;

use crate::gesture::Gesture;

// ════════════════════════════════════════════════════════════════════════════
// SmoothingBuffer
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-capacity FIFO of recent readings (`None` = indeterminate).
/// The oldest reading is evicted once the buffer is full.
#[derive(Clone, Debug)]
pub struct SmoothingBuffer {
    readings: VecDeque<Option<Gesture>>,
    capacity: usize,
}

impl SmoothingBuffer {
    /// `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        SmoothingBuffer { readings: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, reading: Option<Gesture>) {
        if self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn clear(&mut self)          { self.readings.clear(); }
    pub fn len(&self)      -> usize  { self.readings.len() }
    pub fn capacity(&self) -> usize  { self.capacity }
    pub fn is_empty(&self) -> bool   { self.readings.is_empty() }
    pub fn is_full(&self)  -> bool   { self.readings.len() == self.capacity }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Option<Gesture>> {
        self.readings.iter()
    }

    /// Votes for `g` among the buffered readings.
    pub fn count(&self, g: Gesture) -> usize {
        self.readings.iter().filter(|r| **r == Some(g)).count()
    }

    /// Most frequent definite reading; ties go to the gesture seen first.
    /// `None` when nothing definite is buffered.
    pub fn plurality(&self) -> Option<Gesture> {
        let mut best: Option<(Gesture, usize)> = None;
        for g in self.readings.iter().flatten() {
            let n = self.count(*g);
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((*g, n));
            }
        }
        best.map(|(g, _)| g)
    }

    /// Most frequent definite reading, ties broken by position in `order`.
    /// Gestures missing from `order` are not counted.
    pub fn plurality_by(&self, order: &[Gesture]) -> Option<Gesture> {
        let mut best: Option<(Gesture, usize)> = None;
        for &g in order {
            let n = self.count(g);
            if n > 0 && best.map_or(true, |(_, m)| n > m) {
                best = Some((g, n));
            }
        }
        best.map(|(g, _)| g)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TriggerDetector
// ════════════════════════════════════════════════════════════════════════════

/// Gestures that may start a round, in tie-break order.  Scissors is left
/// out so a hand on its way to scissors cannot start a round by accident.
pub const TRIGGER_GESTURES: [Gesture; 2] = [Gesture::Paper, Gesture::Rock];

/// Watches for a stable rock/paper hand to start a round.
#[derive(Clone, Debug)]
pub struct TriggerDetector {
    buffer: SmoothingBuffer,
}

impl TriggerDetector {
    pub fn new(window: usize) -> Self {
        TriggerDetector { buffer: SmoothingBuffer::new(window) }
    }

    /// Feed one reading.  Returns the agreed gesture once the window is
    /// full of rock/paper readings, clearing the window.
    pub fn observe(&mut self, reading: Option<Gesture>) -> Option<Gesture> {
        self.buffer.push(reading);
        if !self.ready() {
            return None;
        }
        let agreed = self.buffer.plurality_by(&TRIGGER_GESTURES);
        self.buffer.clear();
        agreed
    }

    fn ready(&self) -> bool {
        self.buffer.is_full()
            && self.buffer.iter().all(|r| matches!(r, Some(g) if TRIGGER_GESTURES.contains(g)))
    }

    pub fn clear(&mut self) { self.buffer.clear(); }
    pub fn buffer(&self) -> &SmoothingBuffer { &self.buffer }
}

// ════════════════════════════════════════════════════════════════════════════
// RevealCollector
// ════════════════════════════════════════════════════════════════════════════

/// How the collector settled on its answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Plurality of the buffered readings.
    Vote,
    /// Nothing definite buffered; a fresh single-frame reading was used.
    FreshFrame,
    /// Nothing at all; the gesture captured at trigger time was reused.
    TriggerGesture,
}

/// Gathers readings during the reveal and settles on one gesture.
#[derive(Clone, Debug)]
pub struct RevealCollector {
    buffer: SmoothingBuffer,
}

impl RevealCollector {
    pub fn new(window: usize) -> Self {
        RevealCollector { buffer: SmoothingBuffer::new(window) }
    }

    /// Record one reading; indeterminate readings are kept but never vote.
    pub fn collect(&mut self, reading: Option<Gesture>) {
        self.buffer.push(reading);
    }

    /// Settle on the player's gesture and clear the buffer.
    ///
    /// Falls back to `fresh_frame` (a single-frame classification of the
    /// current frame, only invoked when the buffer holds nothing definite)
    /// and then to `trigger_gesture`, so a definite gesture always comes
    /// out.
    pub fn resolve<F>(&mut self, fresh_frame: F, trigger_gesture: Gesture) -> (Gesture, Resolution)
    where
        F: FnOnce() -> Option<Gesture>,
    {
        let settled = match self.buffer.plurality() {
            Some(g) => (g, Resolution::Vote),
            None => match fresh_frame() {
                Some(g) => (g, Resolution::FreshFrame),
                None    => (trigger_gesture, Resolution::TriggerGesture),
            },
        };
        self.buffer.clear();
        settled
    }

    pub fn clear(&mut self) { self.buffer.clear(); }
    pub fn buffer(&self) -> &SmoothingBuffer { &self.buffer }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use Gesture::*;

    #[test]
    fn buffer_evicts_oldest() {
        let mut b = SmoothingBuffer::new(3);
        for r in [Some(Rock), Some(Paper), Some(Scissors), None] {
            b.push(r);
        }
        assert_eq!(b.len(), 3);
        let v: Vec<_> = b.iter().copied().collect();
        assert_eq!(v, vec![Some(Paper), Some(Scissors), None]);
    }

    #[test]
    fn buffer_zero_capacity_clamped() {
        let mut b = SmoothingBuffer::new(0);
        b.push(Some(Rock));
        b.push(Some(Paper));
        assert_eq!(b.capacity(), 1);
        assert_eq!(b.plurality(), Some(Paper));
    }

    #[test]
    fn plurality_ties_go_to_first_seen() {
        let mut b = SmoothingBuffer::new(4);
        for r in [Some(Scissors), Some(Rock), Some(Rock), Some(Scissors)] {
            b.push(r);
        }
        assert_eq!(b.plurality(), Some(Scissors));
    }

    #[test]
    fn plurality_by_prefers_order_on_tie() {
        let mut b = SmoothingBuffer::new(4);
        for r in [Some(Rock), Some(Rock), Some(Paper), Some(Paper)] {
            b.push(r);
        }
        assert_eq!(b.plurality_by(&TRIGGER_GESTURES), Some(Paper));
    }

    // ── trigger ───────────────────────────────────────────────────────────

    #[test]
    fn trigger_needs_full_window() {
        let mut t = TriggerDetector::new(3);
        assert_eq!(t.observe(Some(Paper)), None);
        assert_eq!(t.observe(Some(Paper)), None);
        assert_eq!(t.observe(Some(Paper)), Some(Paper));
    }

    #[test]
    fn trigger_mixed_rock_paper_picks_majority() {
        let mut t = TriggerDetector::new(3);
        t.observe(Some(Paper));
        t.observe(Some(Paper));
        assert_eq!(t.observe(Some(Rock)), Some(Paper));

        t.observe(Some(Rock));
        t.observe(Some(Paper));
        assert_eq!(t.observe(Some(Rock)), Some(Rock));
    }

    #[test]
    fn trigger_clears_after_firing() {
        let mut t = TriggerDetector::new(3);
        for _ in 0..3 { t.observe(Some(Rock)); }
        assert!(t.buffer().is_empty());
        assert_eq!(t.observe(Some(Rock)), None);
    }

    #[test]
    fn trigger_blocked_by_scissors_anywhere() {
        for pos in 0..3 {
            let mut t = TriggerDetector::new(3);
            let mut fired = None;
            for i in 0..3 {
                let r = if i == pos { Some(Scissors) } else { Some(Paper) };
                fired = t.observe(r);
            }
            assert_eq!(fired, None, "scissors at {}", pos);
        }
    }

    #[test]
    fn trigger_blocked_by_indeterminate_anywhere() {
        for pos in 0..3 {
            let mut t = TriggerDetector::new(3);
            let mut fired = None;
            for i in 0..3 {
                let r = if i == pos { None } else { Some(Rock) };
                fired = t.observe(r);
            }
            assert_eq!(fired, None, "indeterminate at {}", pos);
        }
    }

    #[test]
    fn trigger_recovers_once_noise_scrolls_out() {
        let mut t = TriggerDetector::new(3);
        t.observe(None);
        t.observe(Some(Paper));
        assert_eq!(t.observe(Some(Paper)), None);
        assert_eq!(t.observe(Some(Paper)), Some(Paper));
    }

    #[test]
    fn all_scissors_never_triggers() {
        let mut t = TriggerDetector::new(3);
        for _ in 0..10 {
            assert_eq!(t.observe(Some(Scissors)), None);
        }
    }

    // ── reveal ────────────────────────────────────────────────────────────

    #[test]
    fn reveal_majority_ignores_indeterminate() {
        let mut c = RevealCollector::new(5);
        for r in [Some(Rock), Some(Rock), Some(Paper), None, None] {
            c.collect(r);
        }
        let out = c.resolve(|| panic!("fresh frame not needed"), Paper);
        assert_eq!(out, (Rock, Resolution::Vote));
        assert!(c.buffer().is_empty());
    }

    #[test]
    fn reveal_keeps_only_last_five() {
        let mut c = RevealCollector::new(5);
        for r in [Some(Paper), Some(Paper), Some(Paper), Some(Rock), Some(Rock), None, None] {
            c.collect(r);
        }
        // Only [Paper, Rock, Rock, None, None] remain.
        assert_eq!(c.resolve(|| None, Paper).0, Rock);
    }

    #[test]
    fn reveal_uses_fresh_frame_when_empty() {
        let mut c = RevealCollector::new(5);
        c.collect(None);
        assert_eq!(c.resolve(|| Some(Scissors), Paper), (Scissors, Resolution::FreshFrame));
    }

    #[test]
    fn reveal_falls_back_to_trigger_gesture() {
        let mut c = RevealCollector::new(5);
        for _ in 0..5 { c.collect(None); }
        assert_eq!(c.resolve(|| None, Rock), (Rock, Resolution::TriggerGesture));
        assert!(c.buffer().is_empty());
    }

    #[test]
    fn reveal_with_nothing_collected() {
        let mut c = RevealCollector::new(5);
        assert_eq!(c.resolve(|| None, Paper), (Paper, Resolution::TriggerGesture));
    }
}
