//! Ordered event list consumed one processing block at a time.

use crate::event::TimedEvent;
use tracing::{debug, warn};

/// Events in producer order plus a forward-only read cursor.
///
/// Producers append in non-decreasing timestamp order; the sequence never
/// sorts. Each call to [`extract_window`](Self::extract_window) hands out the
/// events that fall inside one block and moves the cursor past them, so no
/// event is delivered twice.
#[derive(Debug, Clone, Default)]
pub struct EventSequence {
    events: Vec<TimedEvent>,
    cursor: usize,
    last_delivered: Option<u64>,
    delivered: usize,
    skipped: usize,
}

impl EventSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Add an event at the tail. `None` is ignored.
    pub fn append(&mut self, event: impl Into<Option<TimedEvent>>) {
        if let Some(event) = event.into() {
            self.events.push(event);
        }
    }

    /// Total events, delivered or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events not yet passed by the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Timestamp of the most recently delivered event.
    #[inline]
    pub fn last_delivered(&self) -> Option<u64> {
        self.last_delivered
    }

    /// Events handed out so far.
    #[inline]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Stale events stepped over so far.
    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Timestamp of the last event, if any.
    pub fn end_timestamp(&self) -> Option<u64> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Move the cursor back to the first event.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.last_delivered = None;
        self.delivered = 0;
        self.skipped = 0;
    }

    /// Push every event in `[start, start + length)` onto `out`.
    ///
    /// Delivered events are copies with `delta_frames` set to their offset
    /// from `start`. An event before `start` found at the cursor was missed
    /// by an earlier window; it is logged, counted in
    /// [`skipped`](Self::skipped) and stepped over.
    ///
    /// Returns `true` while undelivered events remain after this call and
    /// `false` once the cursor has reached the end of the list. A zero-length
    /// window leaves the cursor where it is.
    pub fn extract_window(&mut self, start: u64, length: usize, out: &mut Vec<TimedEvent>) -> bool {
        if length == 0 {
            return !self.is_exhausted();
        }

        let end = start.saturating_add(length as u64);

        while let Some(event) = self.events.get(self.cursor) {
            if event.timestamp >= end {
                break;
            }

            if event.timestamp < start {
                warn!(
                    "Event at frame {} is behind window start {}, skipping",
                    event.timestamp, start
                );
                self.skipped += 1;
                self.cursor += 1;
                continue;
            }

            let mut scheduled = event.clone();
            scheduled.delta_frames = (event.timestamp - start) as usize;
            debug!(
                "Scheduling event 0x{:02x} 0x{:02x} 0x{:02x} at delta {}",
                scheduled.status, scheduled.data1, scheduled.data2, scheduled.delta_frames
            );

            self.last_delivered = Some(event.timestamp);
            self.delivered += 1;
            self.cursor += 1;
            out.push(scheduled);
        }

        !self.is_exhausted()
    }
}

impl FromIterator<TimedEvent> for EventSequence {
    fn from_iter<I: IntoIterator<Item = TimedEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Extend<TimedEvent> for EventSequence {
    fn extend<I: IntoIterator<Item = TimedEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_at(timestamp: u64) -> TimedEvent {
        TimedEvent::note_on(timestamp, 0, 60, 100)
    }

    fn sequence(timestamps: &[u64]) -> EventSequence {
        timestamps.iter().copied().map(note_at).collect()
    }

    #[test]
    fn test_new_sequence_is_empty() {
        let seq = EventSequence::new();
        assert!(seq.is_empty());
        assert!(seq.is_exhausted());
        assert_eq!(seq.end_timestamp(), None);
    }

    #[test]
    fn test_append() {
        let mut seq = EventSequence::new();
        seq.append(note_at(0));
        seq.append(Some(note_at(10)));
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.end_timestamp(), Some(10));
    }

    #[test]
    fn test_append_none_is_noop() {
        let mut seq = sequence(&[5]);
        seq.append(None::<TimedEvent>);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_append_does_not_sort() {
        let mut seq = EventSequence::new();
        seq.append(note_at(50));
        seq.append(note_at(10));
        let timestamps: Vec<u64> = seq.events().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![50, 10]);
    }

    #[test]
    fn test_extract_window_two_blocks() {
        let mut seq = sequence(&[100, 300]);

        let mut out = Vec::new();
        assert!(seq.extract_window(0, 256, &mut out));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, 100);
        assert_eq!(out[0].delta_frames, 100);

        let mut out2 = Vec::new();
        assert!(!seq.extract_window(256, 256, &mut out2));
        assert_eq!(out2.len(), 1);
        assert_eq!(out2[0].timestamp, 300);
        assert_eq!(out2[0].delta_frames, 44);
    }

    #[test]
    fn test_extract_window_exhaustion() {
        let mut seq = sequence(&[100]);

        let mut out = Vec::new();
        seq.extract_window(0, 200, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].delta_frames, 100);

        let mut out2 = Vec::new();
        assert!(!seq.extract_window(200, 256, &mut out2));
        assert!(out2.is_empty());
    }

    #[test]
    fn test_extract_window_future_events_pending() {
        let mut seq = sequence(&[1000]);
        let mut out = Vec::new();
        assert!(seq.extract_window(0, 256, &mut out));
        assert!(out.is_empty());
        assert_eq!(seq.remaining(), 1);
    }

    #[test]
    fn test_extract_window_zero_length() {
        let mut seq = sequence(&[0, 100, 300]);
        let mut out = Vec::new();
        for t in [0, 50, 100, 299, 300, 1000] {
            assert!(seq.extract_window(t, 0, &mut out));
            assert!(out.is_empty());
        }
        assert_eq!(seq.remaining(), 3);
        assert_eq!(seq.skipped(), 0);
    }

    #[test]
    fn test_extract_window_zero_length_past_last_event() {
        let mut seq = sequence(&[0, 100, 300]);
        let mut out = Vec::new();
        assert!(seq.extract_window(1000, 0, &mut out));
        assert!(out.is_empty());
        assert_eq!(seq.remaining(), 3);
        assert_eq!(seq.skipped(), 0);

        // The events are still there for a real window.
        assert!(!seq.extract_window(0, 512, &mut out));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_extract_window_zero_length_when_exhausted() {
        let mut seq = sequence(&[10]);
        let mut out = Vec::new();
        seq.extract_window(0, 64, &mut out);
        assert!(!seq.extract_window(64, 0, &mut out));
    }

    #[test]
    fn test_extract_window_empty_sequence() {
        let mut seq = EventSequence::new();
        let mut out = Vec::new();
        assert!(!seq.extract_window(0, 512, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_extract_window_boundaries() {
        let mut seq = sequence(&[0, 255, 256]);
        let mut out = Vec::new();
        assert!(seq.extract_window(0, 256, &mut out));
        let deltas: Vec<usize> = out.iter().map(|e| e.delta_frames).collect();
        assert_eq!(deltas, vec![0, 255]);

        out.clear();
        assert!(!seq.extract_window(256, 256, &mut out));
        assert_eq!(out[0].delta_frames, 0);
    }

    #[test]
    fn test_events_are_never_redelivered() {
        let mut seq = sequence(&[10, 20]);
        let mut out = Vec::new();
        seq.extract_window(0, 100, &mut out);
        assert_eq!(out.len(), 2);

        out.clear();
        assert!(!seq.extract_window(0, 100, &mut out));
        assert!(out.is_empty());
        assert_eq!(seq.delivered(), 2);
        assert_eq!(seq.last_delivered(), Some(20));
    }

    #[test]
    fn test_stale_event_is_skipped() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut seq = EventSequence::new();
        seq.append(note_at(600));
        seq.append(note_at(100));
        seq.append(note_at(700));

        let mut out = Vec::new();
        assert!(!seq.extract_window(512, 512, &mut out));
        let timestamps: Vec<u64> = out.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![600, 700]);
        assert_eq!(out[0].delta_frames, 88);
        assert_eq!(out[1].delta_frames, 188);
        assert_eq!(seq.skipped(), 1);
        assert_eq!(seq.delivered(), 2);
    }

    #[test]
    fn test_stale_event_does_not_block_later_events() {
        let mut seq = EventSequence::new();
        seq.append(note_at(600));
        seq.append(note_at(100));
        seq.append(note_at(1100));

        let mut out = Vec::new();
        seq.extract_window(512, 512, &mut out);
        out.clear();

        assert!(!seq.extract_window(1024, 512, &mut out));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].delta_frames, 76);
        assert_eq!(seq.skipped(), 1);
    }

    #[test]
    fn test_extract_keeps_payload() {
        let mut seq = EventSequence::new();
        seq.append(TimedEvent::sysex(10, vec![0x43, 0x10, 0xf7]));
        let mut out = Vec::new();
        seq.extract_window(0, 64, &mut out);
        assert_eq!(out[0].payload(), &[0x43, 0x10, 0xf7]);
        assert_eq!(out[0].delta_frames, 10);
    }

    #[test]
    fn test_rewind() {
        let mut seq = sequence(&[10]);
        let mut out = Vec::new();
        seq.extract_window(0, 64, &mut out);
        assert!(seq.is_exhausted());

        seq.rewind();
        assert!(!seq.is_exhausted());
        assert_eq!(seq.delivered(), 0);
        out.clear();
        seq.extract_window(0, 64, &mut out);
        assert_eq!(out.len(), 1);
    }
}
