//! Hand-off between the gesture producer and the render tick.
//!
//! The producer thread classifies frames as fast as the tracker delivers
//! them; the tick runs at display rate. Neither may block the other, and only
//! the newest sample matters, so the hand-off is a single slot:
//!
//! - [`LatestCell`] holds the most recent value stamped with a sequence
//!   number. Loads are wait-free via [`arc_swap`].
//! - [`LatestCursor`] remembers the last sequence a consumer processed so each
//!   sample is acted on at most once.
//! - [`SharedLayout`] publishes the layout snapshot as one atomic word so
//!   readers on any thread never see a state from one transition paired with a
//!   focus index from another.
//! - [`GestureFeed`] bundles the sample cell with a capability flag that a
//!   failing source flips to degraded.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{info, warn};

use crate::gesture::GestureSample;
use crate::layout::LayoutSnapshot;

// ============================================================================
// LATEST CELL
// ============================================================================

/// A value with the sequence number it was published under.
#[derive(Clone, Debug, PartialEq)]
pub struct Stamped<T> {
    pub seq: u64,
    pub value: T,
}

/// Single-slot, overwrite-on-publish cell.
#[derive(Debug)]
pub struct LatestCell<T> {
    slot: ArcSwapOption<Stamped<T>>,
    next_seq: AtomicU64,
}

impl<T> LatestCell<T> {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Replace the slot's contents. Returns the new sequence number (from 1).
    pub fn publish(&self, value: T) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.slot.store(Some(Arc::new(Stamped { seq, value })));
        seq
    }

    /// Newest value, if any. Never blocks.
    pub fn load(&self) -> Option<Arc<Stamped<T>>> {
        self.slot.load_full()
    }

    /// Empty the slot. Sequence numbers keep counting.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Number of values published so far.
    pub fn published(&self) -> u64 {
        self.next_seq.load(Ordering::Relaxed)
    }
}

impl<T> Default for LatestCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer-side position in a [`LatestCell`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LatestCursor {
    last_seq: u64,
}

impl LatestCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell's value if it is newer than anything seen through this cursor.
    pub fn fresh<T: Clone>(&mut self, cell: &LatestCell<T>) -> Option<T> {
        let stamped = cell.load()?;
        if stamped.seq <= self.last_seq {
            return None;
        }
        self.last_seq = stamped.seq;
        Some(stamped.value.clone())
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }
}

// ============================================================================
// SHARED LAYOUT
// ============================================================================

/// Layout snapshot readable from any thread without tearing.
#[derive(Debug)]
pub struct SharedLayout {
    word: AtomicU64,
}

impl SharedLayout {
    pub fn new(snapshot: LayoutSnapshot) -> Self {
        Self {
            word: AtomicU64::new(snapshot.pack()),
        }
    }

    /// Publish a new snapshot (release).
    pub fn store(&self, snapshot: LayoutSnapshot) {
        self.word.store(snapshot.pack(), Ordering::Release);
    }

    /// Latest snapshot (acquire). Never torn.
    pub fn load(&self) -> LayoutSnapshot {
        LayoutSnapshot::unpack(self.word.load(Ordering::Acquire))
    }
}

impl Default for SharedLayout {
    fn default() -> Self {
        Self::new(LayoutSnapshot::default())
    }
}

// ============================================================================
// GESTURE FEED
// ============================================================================

/// Whether hand tracking is delivering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Capability {
    /// No source has reported yet.
    Pending = 0,
    Active = 1,
    /// The source failed; only manual toggles drive the layout.
    Degraded = 2,
}

impl Capability {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Capability::Active,
            2 => Capability::Degraded,
            _ => Capability::Pending,
        }
    }
}

#[derive(Debug)]
struct FeedInner {
    samples: LatestCell<GestureSample>,
    capability: AtomicU8,
}

/// Shared channel from a gesture source to the scene. Cheap to clone.
#[derive(Clone, Debug)]
pub struct GestureFeed {
    inner: Arc<FeedInner>,
}

impl GestureFeed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                samples: LatestCell::new(),
                capability: AtomicU8::new(Capability::Pending as u8),
            }),
        }
    }

    /// Hand a new sample to the consumer.
    pub fn publish(&self, sample: GestureSample) -> u64 {
        self.inner.samples.publish(sample)
    }

    /// The hand left the frame.
    pub fn clear(&self) {
        self.inner.samples.clear();
    }

    pub fn samples(&self) -> &LatestCell<GestureSample> {
        &self.inner.samples
    }

    /// Newest sample regardless of whether it was already processed.
    pub fn latest(&self) -> Option<GestureSample> {
        self.inner.samples.load().map(|stamped| stamped.value)
    }

    /// Whether the source is pending, delivering, or gone.
    pub fn capability(&self) -> Capability {
        Capability::from_bits(self.inner.capability.load(Ordering::Acquire))
    }

    pub fn is_degraded(&self) -> bool {
        self.capability() == Capability::Degraded
    }

    /// Record that the source started delivering. Ignored once degraded.
    pub fn mark_active(&self) {
        let swapped = self.inner.capability.compare_exchange(
            Capability::Pending as u8,
            Capability::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if swapped.is_ok() {
            info!("gesture tracking active");
        }
    }

    /// Switch to manual-only mode. Logs the first time only.
    pub fn mark_degraded(&self, reason: &str) {
        let previous = self
            .inner
            .capability
            .swap(Capability::Degraded as u8, Ordering::AcqRel);
        if previous != Capability::Degraded as u8 {
            warn!(reason = %reason, "gesture tracking unavailable, falling back to manual toggle");
        }
    }
}

impl Default for GestureFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutState;
    use std::thread;

    #[test]
    fn test_cell_keeps_only_latest() {
        let cell = LatestCell::new();
        assert!(cell.load().is_none());
        cell.publish(1);
        cell.publish(2);
        let seq = cell.publish(3);
        let stamped = cell.load().unwrap();
        assert_eq!(stamped.value, 3);
        assert_eq!(stamped.seq, seq);
        assert_eq!(cell.published(), 3);
    }

    #[test]
    fn test_cursor_sees_each_value_once() {
        let cell = LatestCell::new();
        let mut cursor = LatestCursor::new();
        assert_eq!(cursor.fresh(&cell), None::<u32>);

        cell.publish(10u32);
        assert_eq!(cursor.fresh(&cell), Some(10));
        assert_eq!(cursor.fresh(&cell), None);

        cell.publish(11);
        cell.publish(12);
        assert_eq!(cursor.fresh(&cell), Some(12));
    }

    #[test]
    fn test_clear_then_republish() {
        let cell = LatestCell::new();
        let mut cursor = LatestCursor::new();
        cell.publish("a");
        cursor.fresh(&cell);
        cell.clear();
        assert!(cell.load().is_none());
        cell.publish("b");
        assert_eq!(cursor.fresh(&cell), Some("b"));
    }

    #[test]
    fn test_concurrent_publish_and_load() {
        let cell = Arc::new(LatestCell::new());
        let producer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..10_000u64 {
                    cell.publish(i);
                }
            })
        };

        let mut cursor = LatestCursor::new();
        let mut last = None;
        for _ in 0..10_000 {
            if let Some(v) = cursor.fresh(&*cell) {
                if let Some(prev) = last {
                    assert!(v > prev);
                }
                last = Some(v);
            }
        }
        producer.join().unwrap();
        assert_eq!(cell.load().unwrap().value, 9_999);
    }

    #[test]
    fn test_shared_layout_round_trip() {
        let shared = SharedLayout::default();
        assert_eq!(shared.load(), LayoutSnapshot::default());
        let snapshot = LayoutSnapshot::new(LayoutState::Focused, Some(4), 9);
        shared.store(snapshot);
        assert_eq!(shared.load(), snapshot);
    }

    #[test]
    fn test_feed_capability_transitions() {
        let feed = GestureFeed::new();
        assert_eq!(feed.capability(), Capability::Pending);
        feed.mark_active();
        assert_eq!(feed.capability(), Capability::Active);
        feed.mark_degraded("camera unplugged");
        feed.mark_degraded("still unplugged");
        assert!(feed.is_degraded());
        feed.mark_active();
        assert!(feed.is_degraded());
    }

    #[test]
    fn test_feed_clones_share_state() {
        let feed = GestureFeed::new();
        let producer = feed.clone();
        producer.publish(GestureSample::OPEN_PALM);
        assert_eq!(feed.latest(), Some(GestureSample::OPEN_PALM));
        producer.clear();
        assert_eq!(feed.latest(), None);
    }
}
