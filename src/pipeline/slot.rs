use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::frame::RawFrame;

/// Where a pipeline pulls its frames from.
pub trait FrameSource: Send + Sync {
    /// Take the newest undelivered frame, or `None` if nothing new arrived.
    fn acquire_latest(&self) -> Option<RawFrame>;

    /// Number of frames discarded unseen since the previous call.
    fn take_dropped(&self) -> u64 {
        0
    }
}

/// Single-frame mailbox between a frame producer and a pipeline worker.
///
/// Pushing while a frame is still waiting replaces it, so the worker always
/// sees the most recent frame and a slow consumer never builds a queue.
pub struct LatestFrameSlot {
    frame: Mutex<Option<RawFrame>>,
    /// Monotonic counter incremented on each push, independent of frame
    /// timestamps.
    sequence: AtomicU64,
    dropped: AtomicU64,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self {
            frame: Mutex::new(None),
            sequence: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Publish a frame, discarding any frame the worker has not taken yet.
    pub fn push(&self, frame: RawFrame) {
        let previous = self.frame.lock().replace(frame);
        if previous.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.sequence.fetch_add(1, Ordering::Relaxed);
    }

    /// Return the monotonic sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// True if a frame is waiting.
    pub fn is_pending(&self) -> bool {
        self.frame.lock().is_some()
    }
}

impl Default for LatestFrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for LatestFrameSlot {
    fn acquire_latest(&self) -> Option<RawFrame> {
        self.frame.lock().take()
    }

    fn take_dropped(&self) -> u64 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Plane;

    fn make_frame(timestamp_us: u64) -> RawFrame {
        RawFrame {
            width: 2,
            height: 2,
            y: Plane::new(vec![16; 4], 2, 1),
            u: Plane::new(vec![128], 1, 1),
            v: Plane::new(vec![128], 1, 1),
            timestamp_us,
        }
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let slot = LatestFrameSlot::new();
        assert!(slot.acquire_latest().is_none());
        assert_eq!(slot.take_dropped(), 0);
    }

    #[test]
    fn newest_frame_wins() {
        let slot = LatestFrameSlot::new();
        slot.push(make_frame(100));
        slot.push(make_frame(200));
        slot.push(make_frame(300));

        assert_eq!(slot.acquire_latest().unwrap().timestamp_us, 300);
        assert!(slot.acquire_latest().is_none());
        assert_eq!(slot.take_dropped(), 2);
        assert_eq!(slot.take_dropped(), 0);
    }

    #[test]
    fn taken_frame_is_not_counted_as_dropped() {
        let slot = LatestFrameSlot::new();
        slot.push(make_frame(1));
        assert!(slot.is_pending());
        slot.acquire_latest();
        slot.push(make_frame(2));
        assert_eq!(slot.take_dropped(), 0);
        assert_eq!(slot.sequence(), 2);
    }

    #[test]
    fn slot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LatestFrameSlot>();
    }
}
