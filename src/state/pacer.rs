use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How the delay between two requests on one domain is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingMode {
    /// The delay runs from the moment the previous page finished
    AfterCompletion,
    /// The delay runs from the previous request's start slot
    BetweenStarts,
}

/// Spaces requests on one domain by a fixed delay
///
/// Each caller reserves the next free slot, at least `delay` after the
/// previous anchor, then sleeps until it arrives. The first request of a
/// crawl goes out immediately.
///
/// With [`PacingMode::AfterCompletion`] the anchor moves to the finish time
/// reported through [`finish`](Self::finish), so a slow page is still
/// followed by the full delay. With [`PacingMode::BetweenStarts`] only start
/// slots count, which paces the domain as a whole when several pages are in
/// flight.
#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    mode: PacingMode,
    last_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(delay: Duration, mode: PacingMode) -> Self {
        Self {
            delay,
            mode,
            last_slot: Mutex::new(None),
        }
    }

    /// Pacer for a crawl with `page_concurrency` pages in flight
    pub fn for_concurrency(delay: Duration, page_concurrency: usize) -> Self {
        let mode = if page_concurrency <= 1 {
            PacingMode::AfterCompletion
        } else {
            PacingMode::BetweenStarts
        };
        Self::new(delay, mode)
    }

    pub fn mode(&self) -> PacingMode {
        self.mode
    }

    /// Waits until the caller may issue its request
    pub async fn wait_turn(&self) {
        let slot = self.reserve(Instant::now());
        tokio::time::sleep_until(slot).await;
    }

    /// Records that a page finished at `now`
    ///
    /// Only moves the anchor in [`PacingMode::AfterCompletion`].
    pub fn finish(&self, now: Instant) {
        if self.mode != PacingMode::AfterCompletion {
            return;
        }

        let mut last = self
            .last_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(last.map_or(now, |previous| previous.max(now)));
    }

    /// Reserves the next request slot at or after `now`
    fn reserve(&self, now: Instant) -> Instant {
        let mut last = self
            .last_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let slot = match *last {
            Some(previous) => (previous + self.delay).max(now),
            None => now,
        };
        *last = Some(slot);
        slot
    }
}
