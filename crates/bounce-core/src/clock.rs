//! Frame-accurate transport position for offline rendering.

/// Tracks the current frame and whether the transport just started or
/// stopped.
///
/// The host advances the clock once per processed block. Processors read
/// [`AudioClock::transport_changed`] to react to start/stop edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioClock {
    current_frame: u64,
    is_playing: bool,
    transport_changed: bool,
}

impl AudioClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by one block.
    pub fn advance(&mut self, frames: usize) {
        if self.is_playing {
            self.transport_changed = false;
        } else {
            self.is_playing = true;
            self.transport_changed = true;
        }
        self.current_frame += frames as u64;
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
        self.transport_changed = true;
    }

    /// Back to frame zero, stopped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[inline]
    pub fn transport_changed(&self) -> bool {
        self.transport_changed
    }
}
